//! Remote mirror of the owners document.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;

use crate::errors::AppError;
use crate::models::OwnersDocument;

/// A best-effort remote copy of the owners document.
#[async_trait]
pub trait RemoteMirror: Send + Sync {
    /// Fetch the mirrored document.
    async fn fetch(&self) -> Result<OwnersDocument, AppError>;

    /// Replace the mirrored document.
    async fn push(&self, document: &OwnersDocument) -> Result<(), AppError>;
}

/// Mirror served over HTTP by the mirror endpoint.
#[derive(Debug, Clone)]
pub struct HttpMirror {
    client: Client,
    url: String,
}

impl HttpMirror {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, AppError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            url: url.into(),
        })
    }
}

#[async_trait]
impl RemoteMirror for HttpMirror {
    async fn fetch(&self) -> Result<OwnersDocument, AppError> {
        let document = self
            .client
            .get(&self.url)
            .send()
            .await?
            .error_for_status()?
            .json::<OwnersDocument>()
            .await?;
        Ok(document)
    }

    async fn push(&self, document: &OwnersDocument) -> Result<(), AppError> {
        self.client
            .post(&self.url)
            .json(document)
            .send()
            .await?
            .error_for_status()?;
        tracing::debug!("Mirrored {} owners to {}", document.owners.len(), self.url);
        Ok(())
    }
}
