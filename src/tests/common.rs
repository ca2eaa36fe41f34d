use std::sync::Mutex;

use async_trait::async_trait;
use aws_sdk_s3::primitives::ByteStream;

use crate::config::Environment;
use crate::error::{Error, Result};
use crate::publish::ObjectStore;

/// Records every put in arrival order; optionally fails one chosen key.
pub struct RecordingStore {
    puts: Mutex<Vec<(String, String)>>,
    fail_key: Option<String>,
}

impl RecordingStore {
    pub fn new() -> Self {
        Self {
            puts: Mutex::new(Vec::new()),
            fail_key: None,
        }
    }

    pub fn failing_on(key: &str) -> Self {
        Self {
            puts: Mutex::new(Vec::new()),
            fail_key: Some(key.to_string()),
        }
    }

    /// `(bucket, key)` pairs in the order the puts arrived.
    pub fn puts(&self) -> Vec<(String, String)> {
        self.puts.lock().unwrap().clone()
    }
}

#[async_trait]
impl ObjectStore for RecordingStore {
    async fn put(&self, bucket: &str, key: &str, _body: ByteStream) -> Result<()> {
        self.puts
            .lock()
            .unwrap()
            .push((bucket.to_string(), key.to_string()));

        if self.fail_key.as_deref() == Some(key) {
            return Err(Error::PublishFailed {
                key: key.to_string(),
                message: "injected failure".to_string(),
            });
        }
        Ok(())
    }
}

/// The workflow environment the manifest tests expect.
pub fn github_environment() -> Environment {
    Environment::from_iter([
        ("GITHUB_REPOSITORY", "guardian/my-app"),
        ("GITHUB_RUN_NUMBER", "42"),
        ("GITHUB_REF", "refs/heads/main"),
        ("GITHUB_SHA", "abc123"),
        ("GITHUB_SERVER_URL", "https://github.com"),
    ])
}
