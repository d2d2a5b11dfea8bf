use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScraperError {
    #[error("Render timed out after {timeout_ms}ms waiting for {url}")]
    RenderTimeout { url: String, timeout_ms: u64 },

    #[error("Navigation to {url} failed: {message}")]
    Navigation { url: String, message: String },

    #[error("Venue resolution failed: {0}")]
    VenueResolution(String),

    #[error("Failed to create performance for \"{title}\": {message}")]
    IntegrationWrite { title: String, message: String },

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON deserialization failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML deserialization failed: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid selector '{0}'")]
    Selector(String),

    #[error("Storage error: {0}")]
    Storage(String),
}

impl ScraperError {
    /// Renderer failures end the run before any catalog access.
    pub fn is_render_failure(&self) -> bool {
        matches!(
            self,
            ScraperError::RenderTimeout { .. } | ScraperError::Navigation { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, ScraperError>;
