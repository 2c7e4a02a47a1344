//! In-memory record store.
//!
//! Backs tests and offline runs. Counts `submit_result` calls so tests
//! can assert that a result is published exactly once.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use classmark_core::error::StoreError;
use classmark_core::model::Test;
use classmark_core::results::ResultRecord;
use classmark_core::traits::RecordStore;

#[derive(Default)]
pub struct InMemoryStore {
    tests: Mutex<HashMap<String, Test>>,
    results: Mutex<Vec<ResultRecord>>,
    submit_calls: AtomicU32,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store pre-loaded with tests.
    pub fn with_tests(tests: Vec<Test>) -> Self {
        let store = Self::default();
        {
            let mut map = store.tests.lock().unwrap();
            for test in tests {
                map.insert(test.id.clone(), test);
            }
        }
        store
    }

    /// Number of calls made to `submit_result`.
    pub fn submit_calls(&self) -> u32 {
        self.submit_calls.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl RecordStore for InMemoryStore {
    fn name(&self) -> &str {
        "memory"
    }

    async fn list_tests(&self) -> Result<Vec<Test>, StoreError> {
        let mut tests: Vec<Test> = self.tests.lock().unwrap().values().cloned().collect();
        tests.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(tests)
    }

    async fn fetch_test(&self, test_id: &str) -> Result<Test, StoreError> {
        self.tests
            .lock()
            .unwrap()
            .get(test_id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(format!("tests/{test_id}")))
    }

    async fn publish_test(&self, test: &Test) -> Result<Test, StoreError> {
        self.tests
            .lock()
            .unwrap()
            .insert(test.id.clone(), test.clone());
        Ok(test.clone())
    }

    async fn update_test(&self, test: &Test) -> Result<Test, StoreError> {
        let mut tests = self.tests.lock().unwrap();
        if !tests.contains_key(&test.id) {
            return Err(StoreError::NotFound(format!("tests/{}", test.id)));
        }
        tests.insert(test.id.clone(), test.clone());
        Ok(test.clone())
    }

    async fn delete_test(&self, test_id: &str) -> Result<(), StoreError> {
        self.tests
            .lock()
            .unwrap()
            .remove(test_id)
            .map(|_| ())
            .ok_or_else(|| StoreError::NotFound(format!("tests/{test_id}")))
    }

    async fn submit_result(&self, record: &ResultRecord) -> Result<ResultRecord, StoreError> {
        let n = self.submit_calls.fetch_add(1, Ordering::Relaxed);
        let mut stored = record.clone();
        stored.id = Some(format!("r{}", n + 1));
        self.results.lock().unwrap().push(stored.clone());
        Ok(stored)
    }

    async fn list_results(&self, test_id: &str) -> Result<Vec<ResultRecord>, StoreError> {
        Ok(self
            .results
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.test_id == test_id)
            .cloned()
            .collect())
    }
}
