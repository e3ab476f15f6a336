use std::path::{Path, PathBuf};

use config::{Config, Environment, File};
use serde::Deserialize;

use crate::error::AppError;

/// Default configuration file looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "spacetraveling.toml";

/// Minimum length of the preview cookie signing secret.
pub const MIN_SECRET_LEN: usize = 32;

/// Top-level application settings.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub server: ServerSettings,
    pub prismic: PrismicSettings,
    pub preview: PreviewSettings,
    pub site: SiteSettings,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    /// Socket address the HTTP server binds to.
    pub addr: String,
    /// Directory with static assets (scripts, styles, images).
    pub public_dir: PathBuf,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            addr: "127.0.0.1:3000".to_string(),
            public_dir: PathBuf::from("public"),
        }
    }
}

/// Upstream content API settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PrismicSettings {
    /// API root, e.g. `https://my-repo.cdn.prismic.io/api/v2`.
    pub endpoint: String,
    pub access_token: Option<String>,
    /// Custom type listed on the home page.
    pub document_type: String,
    /// Number of summaries per listing page.
    pub page_size: u32,
}

impl Default for PrismicSettings {
    fn default() -> Self {
        Self {
            endpoint: String::new(),
            access_token: None,
            document_type: "posts".to_string(),
            page_size: 5,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PreviewSettings {
    pub cookie_name: String,
    /// Secret the preview cookie signing key is derived from.
    pub secret: Option<String>,
    /// Mark the preview cookie `Secure`.
    pub secure: bool,
}

impl Default for PreviewSettings {
    fn default() -> Self {
        Self {
            cookie_name: "spacetraveling_preview".to_string(),
            secret: None,
            secure: false,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SiteSettings {
    pub title: String,
    /// Seconds a rendered published page is served before re-rendering.
    pub revalidate_secs: u64,
    /// GitHub `owner/repo` used by the utterances comment widget.
    pub comments_repo: Option<String>,
}

impl Default for SiteSettings {
    fn default() -> Self {
        Self {
            title: "Spacetravelling".to_string(),
            revalidate_secs: 60 * 60 * 24,
            comments_repo: None,
        }
    }
}

impl Settings {
    /// Load settings from defaults, an optional TOML file and the environment.
    ///
    /// When `path` is `None`, `spacetraveling.toml` is read if present.
    /// Environment variables use the `SPACETRAVELING_` prefix and `__` as the
    /// nesting separator (`SPACETRAVELING_PRISMIC__ENDPOINT`). The conventional
    /// `PRISMIC_API_ENDPOINT` and `PRISMIC_ACCESS_TOKEN` variables win over both.
    pub fn load(path: Option<&Path>) -> Result<Self, AppError> {
        let file = match path {
            Some(path) => File::from(path).required(true),
            None => File::with_name(DEFAULT_CONFIG_FILE).required(false),
        };

        let settings: Settings = Config::builder()
            .add_source(file)
            .add_source(
                Environment::with_prefix("SPACETRAVELING")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .set_override_option("prismic.endpoint", std::env::var("PRISMIC_API_ENDPOINT").ok())?
            .set_override_option(
                "prismic.access_token",
                std::env::var("PRISMIC_ACCESS_TOKEN").ok(),
            )?
            .build()?
            .try_deserialize()?;

        settings.validate()?;
        Ok(settings)
    }

    /// Check invariants the rest of the application relies on.
    pub fn validate(&self) -> Result<(), AppError> {
        if self.prismic.endpoint.trim().is_empty() {
            return Err(AppError::Config("prismic.endpoint is not set".into()));
        }
        url::Url::parse(&self.prismic.endpoint).map_err(|e| {
            AppError::Config(format!(
                "prismic.endpoint '{}' is not a valid URL: {e}",
                self.prismic.endpoint
            ))
        })?;
        if self.prismic.page_size == 0 {
            return Err(AppError::Config("prismic.page_size must be at least 1".into()));
        }
        if self.prismic.document_type.is_empty() {
            return Err(AppError::Config("prismic.document_type is empty".into()));
        }
        if self.preview.cookie_name.is_empty() {
            return Err(AppError::Config("preview.cookie_name is empty".into()));
        }
        if let Some(secret) = &self.preview.secret {
            if secret.len() < MIN_SECRET_LEN {
                return Err(AppError::Config(format!(
                    "preview.secret must be at least {MIN_SECRET_LEN} bytes"
                )));
            }
        }
        Ok(())
    }
}
