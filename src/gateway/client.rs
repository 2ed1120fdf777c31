use std::sync::Arc;
use std::time::Duration;

use futures::future::BoxFuture;
use reqwest::Client;

use super::SongGenerator;
use super::config::GatewayConfig;
use super::error::{GatewayError, GatewayResult};
use super::models::{GenerateRequestBody, GenerationRequest, SongDescriptor, SongResult};

/// Production [`SongGenerator`] backed by the external song-generation API.
#[derive(Clone)]
pub struct SongApiClient {
    client: Client,
    base_url: Arc<str>,
    request_timeout: Duration,
}

impl SongApiClient {
    /// Build a client from the given configuration.
    pub fn new(config: GatewayConfig) -> GatewayResult<Self> {
        let client = Client::builder()
            .build()
            .map_err(|source| GatewayError::ClientBuilder { source })?;

        Ok(Self {
            client,
            base_url: Arc::<str>::from(config.base_url.trim_end_matches('/')),
            request_timeout: config.request_timeout,
        })
    }

    async fn generate_inner(self, request: GenerationRequest) -> GatewayResult<Vec<SongResult>> {
        let url = format!("{}/api/custom_generate", self.base_url);
        let body = GenerateRequestBody::from_request(&request);

        let response = self
            .client
            .post(&url)
            .timeout(self.request_timeout)
            .json(&body)
            .send()
            .await
            .map_err(|source| {
                if source.is_timeout() {
                    GatewayError::Timeout
                } else {
                    GatewayError::Unreachable { source }
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(GatewayError::BadStatus { status });
        }

        let descriptors = response
            .json::<Vec<SongDescriptor>>()
            .await
            .map_err(|source| {
                if source.is_timeout() {
                    GatewayError::Timeout
                } else {
                    GatewayError::Decode { source }
                }
            })?;

        if descriptors.is_empty() {
            return Err(GatewayError::EmptyResult);
        }

        Ok(descriptors.into_iter().map(Into::into).collect())
    }
}

impl SongGenerator for SongApiClient {
    fn generate(&self, request: GenerationRequest) -> BoxFuture<'static, GatewayResult<Vec<SongResult>>> {
        let client = self.clone();
        Box::pin(async move { client.generate_inner(request).await })
    }
}
