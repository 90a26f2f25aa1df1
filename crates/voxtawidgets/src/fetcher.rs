use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use voxtacore::{FetchError, ImageRef, ImageSize};

/// Backend answer to a thumbnail check
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThumbnailQueryResult {
    #[serde(default)]
    pub found: bool,
    #[serde(default)]
    pub thumbnail_path: Option<String>,
}

/// Where thumbnails come from
#[async_trait]
pub trait ThumbnailSource: Send + Sync {
    /// Ask whether `base_path` is a character folder with a preview image.
    ///
    /// Every call is an independent request; nothing is de-duplicated or cancelled.
    async fn query(&self, base_path: &str) -> Result<ThumbnailQueryResult, FetchError>;

    /// Start loading the image at `relative_path`; completion is signalled on the returned handle
    fn load_image(&self, relative_path: &str) -> ImageRef;
}

/// The host's image primitive: turns fetched bytes into a drawable size
pub trait ImageDecoder: Send + Sync {
    fn decode(&self, bytes: &[u8]) -> Result<ImageSize, FetchError>;
}

/// Thumbnail client for the `/voxta/*` backend routes
pub struct ThumbnailFetcher {
    client: reqwest::Client,
    base_url: String,
    decoder: Arc<dyn ImageDecoder>,
}

impl ThumbnailFetcher {
    pub fn new(base_url: impl Into<String>, decoder: Arc<dyn ImageDecoder>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            decoder,
        }
    }

    pub fn check_url(&self) -> String {
        format!("{}/voxta/check_thumbnail", self.base_url)
    }

    /// Retrieval endpoint for `relative_path`, URL-encoded
    pub fn thumbnail_url(&self, relative_path: &str) -> String {
        format!(
            "{}/voxta/thumbnail?path={}",
            self.base_url,
            urlencoding::encode(relative_path)
        )
    }

    async fn fetch_image(
        client: reqwest::Client,
        url: String,
        decoder: Arc<dyn ImageDecoder>,
    ) -> Result<ImageSize, FetchError> {
        let response = client
            .get(&url)
            .send()
            .await
            .map_err(|e| FetchError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                status: status.as_u16(),
                url,
            });
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| FetchError::Transport(e.to_string()))?;

        decoder.decode(&bytes)
    }
}

#[async_trait]
impl ThumbnailSource for ThumbnailFetcher {
    async fn query(&self, base_path: &str) -> Result<ThumbnailQueryResult, FetchError> {
        let url = self.check_url();
        tracing::debug!("POST {} path={}", url, base_path);

        let response = self
            .client
            .post(&url)
            .json(&serde_json::json!({ "path": base_path }))
            .send()
            .await
            .map_err(|e| FetchError::Transport(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| FetchError::Transport(e.to_string()))?;

        // The backend answers misses with a JSON body on any status
        match serde_json::from_str::<ThumbnailQueryResult>(&body) {
            Ok(result) => {
                if !status.is_success() {
                    tracing::debug!("{} answered {} with {:?}", url, status, result);
                }
                Ok(result)
            }
            Err(_) if !status.is_success() => Err(FetchError::Status {
                status: status.as_u16(),
                url,
            }),
            Err(e) => Err(FetchError::Decode(format!("{}: {}", e, body))),
        }
    }

    fn load_image(&self, relative_path: &str) -> ImageRef {
        let url = self.thumbnail_url(relative_path);
        let image = ImageRef::new(url.clone());

        let runtime = match tokio::runtime::Handle::try_current() {
            Ok(runtime) => runtime,
            Err(e) => {
                image.fail(format!("no async runtime to load {}: {}", url, e));
                return image;
            }
        };

        let client = self.client.clone();
        let decoder = self.decoder.clone();
        let target = image.clone();
        runtime.spawn(async move {
            match Self::fetch_image(client, url, decoder).await {
                Ok(size) => target.resolve(size),
                Err(e) => target.fail(e.to_string()),
            }
        });

        image
    }
}
