//! HTTP record store client.
//!
//! Talks to the classmark record server, a JSON collection API with
//! `tests` and `testResults` collections. The server assigns record
//! ids on insert.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use tracing::instrument;

use classmark_core::error::StoreError;
use classmark_core::model::Test;
use classmark_core::results::ResultRecord;
use classmark_core::traits::RecordStore;

pub const DEFAULT_BASE_URL: &str = "http://localhost:4000";
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Client for the record server.
pub struct HttpRecordStore {
    base_url: String,
    timeout_secs: u64,
    client: reqwest::Client,
}

impl HttpRecordStore {
    pub fn new(base_url: Option<String>) -> Self {
        Self::with_timeout(base_url, DEFAULT_TIMEOUT_SECS)
    }

    pub fn with_timeout(base_url: Option<String>, timeout_secs: u64) -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(timeout_secs))
            .build()
            .expect("failed to build HTTP client");

        Self {
            base_url: base_url.unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            timeout_secs,
            client,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn transport_error(&self, e: reqwest::Error) -> StoreError {
        if e.is_timeout() {
            StoreError::Timeout(self.timeout_secs * 1000)
        } else {
            StoreError::Network(e.to_string())
        }
    }

    async fn check(
        &self,
        response: reqwest::Response,
        resource: &str,
    ) -> Result<reqwest::Response, StoreError> {
        let status = response.status().as_u16();
        if status == 404 {
            return Err(StoreError::NotFound(resource.to_string()));
        }
        if status == 429 {
            let retry_after = response
                .headers()
                .get("retry-after")
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse::<u64>().ok())
                .unwrap_or(5)
                * 1000;
            return Err(StoreError::RateLimited {
                retry_after_ms: retry_after,
            });
        }
        if status >= 400 {
            let body = response.text().await.unwrap_or_default();
            return Err(StoreError::ApiError {
                status,
                message: body,
            });
        }
        Ok(response)
    }

    async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, StoreError> {
        response
            .json()
            .await
            .map_err(|e| StoreError::Decode(e.to_string()))
    }
}

#[async_trait]
impl RecordStore for HttpRecordStore {
    fn name(&self) -> &str {
        "http"
    }

    async fn list_tests(&self) -> Result<Vec<Test>, StoreError> {
        let response = self
            .client
            .get(format!("{}/tests", self.base_url))
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;
        let response = self.check(response, "tests").await?;
        Self::decode(response).await
    }

    #[instrument(skip(self))]
    async fn fetch_test(&self, test_id: &str) -> Result<Test, StoreError> {
        let response = self
            .client
            .get(format!("{}/tests/{}", self.base_url, test_id))
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;
        let response = self.check(response, &format!("tests/{test_id}")).await?;
        Self::decode(response).await
    }

    async fn publish_test(&self, test: &Test) -> Result<Test, StoreError> {
        let response = self
            .client
            .post(format!("{}/tests", self.base_url))
            .json(test)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;
        let response = self.check(response, "tests").await?;
        Self::decode(response).await
    }

    async fn update_test(&self, test: &Test) -> Result<Test, StoreError> {
        let response = self
            .client
            .patch(format!("{}/tests/{}", self.base_url, test.id))
            .json(test)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;
        let response = self.check(response, &format!("tests/{}", test.id)).await?;
        Self::decode(response).await
    }

    async fn delete_test(&self, test_id: &str) -> Result<(), StoreError> {
        let response = self
            .client
            .delete(format!("{}/tests/{}", self.base_url, test_id))
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;
        self.check(response, &format!("tests/{test_id}")).await?;
        Ok(())
    }

    #[instrument(skip(self, record), fields(test_id = %record.test_id))]
    async fn submit_result(&self, record: &ResultRecord) -> Result<ResultRecord, StoreError> {
        let response = self
            .client
            .post(format!("{}/testResults", self.base_url))
            .json(record)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;
        let response = self.check(response, "testResults").await?;
        Self::decode(response).await
    }

    async fn list_results(&self, test_id: &str) -> Result<Vec<ResultRecord>, StoreError> {
        let response = self
            .client
            .get(format!("{}/testResults", self.base_url))
            .query(&[("testId", test_id)])
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;
        let response = self.check(response, "testResults").await?;
        Self::decode(response).await
    }
}
