use crate::error::{PipelineError, Result};
use futures::future::BoxFuture;
use futures::FutureExt;

/// Get standard user agent string
pub fn get_user_agent() -> &'static str {
    "HexThumbs"
}

/// Build the HTTP client shared by the catalog fetch and every worker.
pub fn build_client() -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .user_agent(get_user_agent())
        .build()
        .map_err(|e| PipelineError::CatalogFetch(format!("Failed to build HTTP client: {}", e)))
}

/// Where workers get raw image bytes from.
pub trait ImageSource: Send + Sync {
    fn fetch<'a>(&'a self, reference: &'a str) -> BoxFuture<'a, Result<Vec<u8>>>;
}

/// Image host reached over HTTP.
#[derive(Debug, Clone)]
pub struct HttpImageSource {
    client: reqwest::Client,
    base_url: String,
}

impl HttpImageSource {
    pub fn new(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }

    /// Absolute references pass through; relative ones are joined onto the base URL.
    pub fn resolve(&self, reference: &str) -> String {
        if reference.starts_with("http://") || reference.starts_with("https://") {
            return reference.to_string();
        }
        let base = self.base_url.trim_end_matches('/');
        if reference.starts_with('/') {
            format!("{}{}", base, reference)
        } else {
            format!("{}/{}", base, reference)
        }
    }

    async fn download(&self, reference: &str) -> Result<Vec<u8>> {
        let url = self.resolve(reference);

        let response = self
            .client
            .get(&url)
            .header("User-Agent", get_user_agent())
            .send()
            .await
            .map_err(|e| PipelineError::image_fetch(&url, format!("HTTP request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(PipelineError::image_fetch(
                &url,
                format!("HTTP {}", response.status()),
            ));
        }

        let bytes = response.bytes().await.map_err(|e| {
            PipelineError::image_fetch(&url, format!("Failed to read response bytes: {}", e))
        })?;

        Ok(bytes.to_vec())
    }
}

impl ImageSource for HttpImageSource {
    fn fetch<'a>(&'a self, reference: &'a str) -> BoxFuture<'a, Result<Vec<u8>>> {
        self.download(reference).boxed()
    }
}
