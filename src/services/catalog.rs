use crate::models::{CandidatesRequest, CandidatesResponse, Product, Recommendations, RecommendationsRequest};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use std::time::Duration;
use thiserror::Error;

/// Errors that can occur when calling the catalog service
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Catalog returned status {0}")]
    Status(StatusCode),
}

/// Remote product selection and recommendation service
#[async_trait]
pub trait CatalogService: Send + Sync {
    /// Products to swipe through for the given quiz answers
    async fn fetch_candidates(&self, answers: &[String]) -> Result<Vec<Product>, CatalogError>;

    /// Recommendations derived from the liked products
    async fn fetch_recommendations(
        &self,
        liked: &[Product],
        gender: Option<&str>,
    ) -> Result<Recommendations, CatalogError>;
}

/// HTTP client for the catalog API
pub struct CatalogClient {
    base_url: String,
    client: Client,
}

impl CatalogClient {
    pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

    /// Create a new catalog client
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, CatalogError> {
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            base_url: base_url.into(),
            client,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), path)
    }
}

#[async_trait]
impl CatalogService for CatalogClient {
    async fn fetch_candidates(&self, answers: &[String]) -> Result<Vec<Product>, CatalogError> {
        let url = self.url("products/swipe");
        let body = CandidatesRequest {
            answers: answers.to_vec(),
            excluded_ids: Vec::new(),
        };

        tracing::debug!("Fetching swipe candidates from: {}", url);

        let response = self.client.post(&url).json(&body).send().await?;

        if !response.status().is_success() {
            let status = response.status();
            tracing::error!("Swipe candidates request failed: {}", status);
            return Err(CatalogError::Status(status));
        }

        let payload: CandidatesResponse = response.json().await?;

        tracing::debug!("Received {} swipe candidates", payload.products.len());

        Ok(payload.products)
    }

    async fn fetch_recommendations(
        &self,
        liked: &[Product],
        gender: Option<&str>,
    ) -> Result<Recommendations, CatalogError> {
        let url = self.url("products/recommendations");
        let body = RecommendationsRequest {
            liked_products: liked.to_vec(),
            gender: gender.map(str::to_string),
        };

        tracing::debug!(
            "Fetching recommendations for {} liked products (gender: {:?})",
            liked.len(),
            gender
        );

        let response = self.client.post(&url).json(&body).send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_else(|_| "Unable to read body".to_string());
            tracing::error!("Recommendations request failed: {} - {}", status, text);
            return Err(CatalogError::Status(status));
        }

        Ok(response.json().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_client_creation() {
        let client = CatalogClient::new("https://catalog.test/api/", Duration::from_secs(5)).unwrap();

        assert_eq!(client.base_url(), "https://catalog.test/api/");
        assert_eq!(client.url("products/swipe"), "https://catalog.test/api/products/swipe");
    }
}
