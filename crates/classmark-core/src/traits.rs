//! The record store abstraction.
//!
//! Sessions and the CLI talk to the backing store through this trait so
//! the HTTP store can be swapped for an in-memory one in tests.

use async_trait::async_trait;

use crate::error::StoreError;
use crate::model::Test;
use crate::results::ResultRecord;

/// A backend that holds published tests and submitted results.
///
/// `classmark-store` provides the HTTP implementation and an in-memory
/// one for tests.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Short name for logs ("http", "memory").
    fn name(&self) -> &str;

    /// All tests the store knows about, regardless of status.
    async fn list_tests(&self) -> Result<Vec<Test>, StoreError>;

    /// Fetch one test by id.
    async fn fetch_test(&self, test_id: &str) -> Result<Test, StoreError>;

    /// Publish a new test. Returns the stored copy.
    async fn publish_test(&self, test: &Test) -> Result<Test, StoreError>;

    /// Replace an existing test. Returns the stored copy.
    async fn update_test(&self, test: &Test) -> Result<Test, StoreError>;

    /// Delete a test by id.
    async fn delete_test(&self, test_id: &str) -> Result<(), StoreError>;

    /// Publish one attempt's result. Returns the stored record with the
    /// id the store assigned.
    async fn submit_result(&self, record: &ResultRecord) -> Result<ResultRecord, StoreError>;

    /// All results recorded for one test.
    async fn list_results(&self, test_id: &str) -> Result<Vec<ResultRecord>, StoreError>;
}
