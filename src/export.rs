use std::path::{Path, PathBuf};

use crate::api::pages::render_post;
use crate::api::posts::PostsChunk;
use crate::components::home::{render_home_page, render_post_cards};
use crate::content::client::ContentApi;
use crate::error::AppError;
use crate::pages::listing::{first_page, static_chunk_path, ChunkLinks, Listing};
use crate::pages::post::static_paths;
use crate::settings::Settings;

/// What a static export wrote.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct ExportSummary {
    pub pages: usize,
    /// Listing pages after the first, as load-more JSON files.
    pub chunks: usize,
    pub assets: usize,
}

async fn write_file(path: &Path, contents: String) -> Result<(), AppError> {
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    tokio::fs::write(path, contents).await?;
    Ok(())
}

/// `out/post/<uid>/index.html`, for uids that are a single plain path segment.
fn post_file(out: &Path, uid: &str) -> Result<PathBuf, AppError> {
    if uid.is_empty() || uid == "." || uid.contains(['/', '\\', '\0']) || uid.contains("..") {
        return Err(AppError::MalformedDocument(format!(
            "uid '{uid}' cannot be used as a file name"
        )));
    }
    Ok(out.join("post").join(uid).join("index.html"))
}

/// Follow the listing's cursors and write every further page as a JSON
/// chunk the load-more script can fetch from a static host.
async fn write_chunks(
    api: &dyn ContentApi,
    mut listing: Listing,
    out: &Path,
) -> Result<usize, AppError> {
    let mut number = 2;

    while listing.can_load_more() {
        let before = listing.items().len();
        listing.load_more(api).await?;
        let results = listing.items()[before..].to_vec();

        let chunk = PostsChunk {
            html: render_post_cards(results.clone()),
            results,
            next_page: listing.cursor().map(str::to_string),
            next_chunk: listing.cursor().map(|_| static_chunk_path(number + 1)),
        };
        let json = serde_json::to_string(&chunk)
            .map_err(|e| AppError::Internal(format!("Failed to encode listing chunk: {e}")))?;
        let path = static_chunk_path(number);
        write_file(&out.join(path.trim_start_matches('/')), json).await?;
        tracing::info!(%path, "Exported listing chunk");
        number += 1;
    }

    Ok(number - 2)
}

/// Recursively copy `from` into `to`, returning the number of files copied.
async fn copy_dir(from: &Path, to: &Path) -> Result<usize, AppError> {
    let mut copied = 0;
    let mut pending: Vec<(PathBuf, PathBuf)> = vec![(from.to_path_buf(), to.to_path_buf())];

    while let Some((src, dst)) = pending.pop() {
        tokio::fs::create_dir_all(&dst).await?;
        let mut entries = tokio::fs::read_dir(&src).await?;
        while let Some(entry) = entries.next_entry().await? {
            let target = dst.join(entry.file_name());
            if entry.file_type().await?.is_dir() {
                pending.push((entry.path(), target));
            } else {
                tokio::fs::copy(entry.path(), &target).await?;
                copied += 1;
            }
        }
    }

    Ok(copied)
}

/// Render the whole site into `out`.
///
/// The listing goes to `index.html` with its later pages under `posts/`,
/// each post to `post/<uid>/index.html`, and the public directory is copied
/// alongside. Any upstream failure aborts the export.
pub async fn export_site(
    api: &dyn ContentApi,
    settings: &Settings,
    out: &Path,
) -> Result<ExportSummary, AppError> {
    let mut summary = ExportSummary::default();

    let first = first_page(api, &settings.prismic).await?;
    let listing = Listing::new(first.clone());
    let home = render_home_page(&settings.site.title, first, ChunkLinks::Static, false);
    write_file(&out.join("index.html"), home).await?;
    summary.pages += 1;
    summary.chunks = write_chunks(api, listing, out).await?;

    for uid in static_paths(api, &settings.prismic).await? {
        let path = post_file(out, &uid)?;
        let html = render_post(api, settings, &uid, None).await?;
        write_file(&path, html).await?;
        tracing::info!(%uid, "Exported post");
        summary.pages += 1;
    }

    let public_dir = &settings.server.public_dir;
    if tokio::fs::try_exists(public_dir).await? {
        summary.assets = copy_dir(public_dir, out).await?;
    } else {
        tracing::warn!(dir = %public_dir.display(), "Public directory not found, no assets copied");
    }

    Ok(summary)
}
