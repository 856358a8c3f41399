use super::{ObjectStorage, PutObject, StorageSession};
use crate::{Error, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredObject {
    pub content_type: String,
    pub data: Vec<u8>,
}

/// In-memory storage with call counters and failure injection.
#[derive(Clone, Default)]
pub struct MockStorage {
    objects: Arc<Mutex<HashMap<String, StoredObject>>>,
    opened: Arc<Mutex<usize>>,
    closed: Arc<Mutex<usize>>,
    put_count: Arc<Mutex<usize>>,
    fail_open: Arc<Mutex<Option<String>>>,
    fail_put: Arc<Mutex<Option<String>>>,
}

impl MockStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_open_failure(self, message: impl Into<String>) -> Self {
        *self.fail_open.lock().unwrap() = Some(message.into());
        self
    }

    pub fn with_put_failure(self, message: impl Into<String>) -> Self {
        *self.fail_put.lock().unwrap() = Some(message.into());
        self
    }

    pub fn get_opened_count(&self) -> usize {
        *self.opened.lock().unwrap()
    }

    pub fn get_closed_count(&self) -> usize {
        *self.closed.lock().unwrap()
    }

    pub fn get_put_count(&self) -> usize {
        *self.put_count.lock().unwrap()
    }

    pub fn get_object(&self, key: &str) -> Option<StoredObject> {
        self.objects.lock().unwrap().get(key).cloned()
    }

    pub fn get_keys(&self) -> Vec<String> {
        self.objects.lock().unwrap().keys().cloned().collect()
    }
}

#[async_trait]
impl ObjectStorage for MockStorage {
    async fn open_session(&self) -> Result<Box<dyn StorageSession>> {
        if let Some(message) = self.fail_open.lock().unwrap().clone() {
            return Err(Error::UploadFailed(message));
        }

        *self.opened.lock().unwrap() += 1;
        Ok(Box::new(MockSession {
            storage: self.clone(),
            open: true,
        }))
    }
}

struct MockSession {
    storage: MockStorage,
    open: bool,
}

#[async_trait]
impl StorageSession for MockSession {
    async fn put_object(&mut self, object: PutObject<'_>) -> Result<()> {
        if !self.open {
            return Err(Error::UploadFailed(
                "Storage session already closed".to_string(),
            ));
        }

        *self.storage.put_count.lock().unwrap() += 1;

        if let Some(message) = self.storage.fail_put.lock().unwrap().clone() {
            return Err(Error::UploadFailed(message));
        }

        self.storage.objects.lock().unwrap().insert(
            object.key.to_string(),
            StoredObject {
                content_type: object.content_type.to_string(),
                data: object.body,
            },
        );
        Ok(())
    }

    fn close(&mut self) {
        self.open = false;
        *self.storage.closed.lock().unwrap() += 1;
    }
}
