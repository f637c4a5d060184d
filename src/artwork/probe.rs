//! Artwork existence probing

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use std::time::Duration;
use tracing::debug;

use crate::errors::AppResult;
use crate::utils::UrlUtils;

/// Capability: does this URL resolve to content within the timeout?
///
/// Implementations never fail; transport errors and timeouts are `false`.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ArtworkProbe: Send + Sync {
    async fn probe(&self, url: &str, timeout: Duration) -> bool;
}

/// HTTP probe: `HEAD`, then a streamed `GET` whose body is never read
pub struct HttpArtworkProbe {
    client: Client,
}

impl HttpArtworkProbe {
    pub fn new(user_agent: &str) -> AppResult<Self> {
        let client = Client::builder().user_agent(user_agent).build()?;
        Ok(Self { client })
    }

    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ArtworkProbe for HttpArtworkProbe {
    async fn probe(&self, url: &str, timeout: Duration) -> bool {
        let Some(parsed) = UrlUtils::parse_http(url) else {
            debug!("Skipping non-HTTP artwork candidate {}", url);
            return false;
        };

        match self.client.head(parsed.clone()).timeout(timeout).send().await {
            Ok(response) if response.status() == StatusCode::OK => return true,
            Ok(response) => debug!("HEAD {} returned {}", url, response.status()),
            Err(e) => debug!("HEAD {} failed: {}", url, e),
        }

        // Some logo hosts reject HEAD; the response is dropped before the body is read.
        match self.client.get(parsed).timeout(timeout).send().await {
            Ok(response) => response.status() == StatusCode::OK,
            Err(e) => {
                debug!("GET {} failed: {}", url, e);
                false
            }
        }
    }
}
