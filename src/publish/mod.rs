//! Upload of the build manifest and artifact files to object storage.
//!
//! The manifest put is confirmed before any artifact put is issued: the
//! manifest is the authoritative record that a build exists, and downstream
//! consumers must never observe artifacts without it. Artifact puts then run
//! as one unordered fan-out, bounded only by the HTTP client's connection
//! pool, and the phase resolves once every member has.

use std::sync::Arc;

use async_trait::async_trait;
use aws_credential_types::provider::ProvideCredentials;
use aws_sdk_s3::config::{BehaviorVersion, Region};
use aws_sdk_s3::error::DisplayErrorContext;
use aws_sdk_s3::primitives::ByteStream;
use tokio::task::JoinSet;

use crate::artifacts::ArtifactFileSet;
use crate::error::{Error, Result};
use crate::manifest::{BuildManifest, MANIFEST_OBJECT_NAME};

/// Put-only view of an object store.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    async fn put(&self, bucket: &str, key: &str, body: ByteStream) -> Result<()>;
}

/// S3-backed store using the role credentials from the web-identity exchange.
pub struct S3Store {
    client: aws_sdk_s3::Client,
}

impl S3Store {
    /// Build the S3 client once; the provider is shared read-only by every
    /// subsequent put.
    pub fn connect(region: &str, credentials: impl ProvideCredentials + 'static) -> Self {
        let config = aws_sdk_s3::Config::builder()
            .behavior_version(BehaviorVersion::latest())
            .region(Region::new(region.to_string()))
            .credentials_provider(credentials)
            .build();

        Self {
            client: aws_sdk_s3::Client::from_conf(config),
        }
    }
}

#[async_trait]
impl ObjectStore for S3Store {
    async fn put(&self, bucket: &str, key: &str, body: ByteStream) -> Result<()> {
        self.client
            .put_object()
            .bucket(bucket)
            .key(key)
            .body(body)
            .send()
            .await
            .map(|_| ())
            .map_err(|e| Error::PublishFailed {
                key: key.to_string(),
                message: DisplayErrorContext(&e).to_string(),
            })
    }
}

/// Publishes one build: manifest first, artifacts after.
pub struct Publisher {
    store: Arc<dyn ObjectStore>,
    build_bucket: String,
    artifact_bucket: String,
    prefix: String,
}

impl Publisher {
    pub fn new(
        store: Arc<dyn ObjectStore>,
        build_bucket: &str,
        artifact_bucket: &str,
        manifest: &BuildManifest,
    ) -> Self {
        Self {
            store,
            build_bucket: build_bucket.to_string(),
            artifact_bucket: artifact_bucket.to_string(),
            prefix: format!("{}/{}", manifest.project_name, manifest.build_number),
        }
    }

    /// Upload the manifest, then every artifact file. The manifest put must
    /// succeed before the artifact fan-out starts.
    pub async fn publish(
        &self,
        manifest: &BuildManifest,
        artifacts: &ArtifactFileSet,
    ) -> Result<()> {
        self.put_manifest(manifest).await?;
        self.put_artifacts(artifacts).await
    }

    async fn put_manifest(&self, manifest: &BuildManifest) -> Result<()> {
        let key = format!("{}/{MANIFEST_OBJECT_NAME}", self.prefix);
        let body = serde_json::to_vec(manifest)?;
        log::debug!("uploading manifest to {}/{key}", self.build_bucket);

        self.store
            .put(&self.build_bucket, &key, ByteStream::from(body))
            .await
    }

    async fn put_artifacts(&self, artifacts: &ArtifactFileSet) -> Result<()> {
        let mut uploads = JoinSet::new();
        for file in artifacts.files() {
            let key = artifacts.upload_key(&self.prefix, file)?;
            let store = Arc::clone(&self.store);
            let bucket = self.artifact_bucket.clone();
            let file = file.clone();

            log::debug!("uploading {} to {bucket}/{key}", file.display());
            uploads.spawn(async move {
                // Stream from disk so memory use stays bounded regardless of
                // artifact size.
                let body =
                    ByteStream::from_path(&file)
                        .await
                        .map_err(|e| Error::PublishFailed {
                            key: key.clone(),
                            message: e.to_string(),
                        })?;
                store.put(&bucket, &key, body).await
            });
        }

        // Drain the whole set: uploads in flight after a failure still run to
        // completion, and only the first observed error is reported.
        let mut first_failure = None;
        while let Some(outcome) = uploads.join_next().await {
            let result = outcome.unwrap_or_else(|e| {
                Err(Error::PublishFailed {
                    key: self.prefix.clone(),
                    message: format!("upload task failed: {e}"),
                })
            });
            if let Err(error) = result {
                first_failure.get_or_insert(error);
            }
        }

        match first_failure {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }
}
