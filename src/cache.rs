use std::collections::HashMap;
use std::future::Future;
use std::time::Duration;

use tokio::sync::RwLock;
use tokio::time::Instant;

use crate::error::AppError;

struct CachedPage {
    html: String,
    rendered_at: Instant,
}

/// Rendered published pages keyed by request path.
///
/// An entry is served until it is `ttl` old; the next request after that
/// renders the page again and replaces it.
pub struct PageCache {
    ttl: Duration,
    entries: RwLock<HashMap<String, CachedPage>>,
}

impl PageCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// The cached page for `path`, if it is still fresh.
    pub async fn get(&self, path: &str) -> Option<String> {
        let entries = self.entries.read().await;
        entries
            .get(path)
            .filter(|page| page.rendered_at.elapsed() < self.ttl)
            .map(|page| page.html.clone())
    }

    pub async fn insert(&self, path: impl Into<String>, html: String) {
        let page = CachedPage {
            html,
            rendered_at: Instant::now(),
        };
        self.entries.write().await.insert(path.into(), page);
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }

    /// Serve `path` from the cache, rendering and storing it when stale.
    ///
    /// Failed renders are not cached.
    pub async fn get_or_render<F, Fut>(&self, path: &str, render: F) -> Result<String, AppError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<String, AppError>>,
    {
        if let Some(html) = self.get(path).await {
            return Ok(html);
        }

        tracing::debug!(path, "Rendering page");
        let html = render().await?;
        self.insert(path, html.clone()).await;
        Ok(html)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[tokio::test(start_paused = true)]
    async fn test_entry_expires_after_ttl() {
        let cache = PageCache::new(Duration::from_secs(60));
        cache.insert("/", "v1".to_string()).await;
        assert_eq!(cache.get("/").await.as_deref(), Some("v1"));

        tokio::time::advance(Duration::from_secs(59)).await;
        assert_eq!(cache.get("/").await.as_deref(), Some("v1"));

        tokio::time::advance(Duration::from_secs(1)).await;
        assert_eq!(cache.get("/").await, None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_get_or_render_renders_once_while_fresh() {
        let cache = PageCache::new(Duration::from_secs(60));
        let counter = AtomicUsize::new(0);
        let renders = &counter;
        let render = move || async move {
            let n = renders.fetch_add(1, Ordering::SeqCst) + 1;
            Ok::<_, AppError>(format!("render {n}"))
        };

        assert_eq!(cache.get_or_render("/post/a", render).await.unwrap(), "render 1");
        assert_eq!(cache.get_or_render("/post/a", render).await.unwrap(), "render 1");

        tokio::time::advance(Duration::from_secs(61)).await;
        assert_eq!(cache.get_or_render("/post/a", render).await.unwrap(), "render 2");
        assert_eq!(cache.len().await, 1);
    }

    #[tokio::test]
    async fn test_failed_render_is_not_cached() {
        let cache = PageCache::new(Duration::from_secs(60));
        let result = cache
            .get_or_render("/post/x", || async { Err(AppError::NotFound("x".into())) })
            .await;
        assert!(result.is_err());
        assert!(cache.is_empty().await);
    }
}
