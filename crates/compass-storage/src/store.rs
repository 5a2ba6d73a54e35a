use async_trait::async_trait;
use aws_sdk_s3::Client;

use crate::error::StorageError;
use crate::objects;

/// Key/value object storage. Every record lives behind one of these.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    fn backend_tag(&self) -> &'static str;

    async fn get(&self, key: &str) -> Result<Vec<u8>, StorageError>;

    async fn put(&self, key: &str, body: Vec<u8>, content_type: &str) -> Result<(), StorageError>;

    /// Create-only put. Fails with `PreconditionFailed` if the key exists.
    async fn put_if_absent(
        &self,
        key: &str,
        body: Vec<u8>,
        content_type: &str,
    ) -> Result<(), StorageError>;

    async fn delete(&self, key: &str) -> Result<(), StorageError>;

    /// Keys under `prefix`, in lexicographic order.
    async fn list(&self, prefix: &str) -> Result<Vec<String>, StorageError>;

    /// Delete everything under `prefix`. Returns the number of keys removed.
    async fn delete_prefix(&self, prefix: &str) -> Result<usize, StorageError> {
        let keys = self.list(prefix).await?;
        for key in &keys {
            self.delete(key).await?;
        }
        Ok(keys.len())
    }
}

/// [`ObjectStore`] over a single S3 bucket.
#[derive(Clone)]
pub struct S3Store {
    client: Client,
    bucket: String,
}

impl S3Store {
    pub fn new(client: Client, bucket: impl Into<String>) -> Self {
        Self {
            client,
            bucket: bucket.into(),
        }
    }

    pub fn bucket(&self) -> &str {
        &self.bucket
    }
}

#[async_trait]
impl ObjectStore for S3Store {
    fn backend_tag(&self) -> &'static str {
        "s3"
    }

    async fn get(&self, key: &str) -> Result<Vec<u8>, StorageError> {
        let output = objects::get_object(&self.client, &self.bucket, key).await?;
        Ok(output.body)
    }

    async fn put(&self, key: &str, body: Vec<u8>, content_type: &str) -> Result<(), StorageError> {
        objects::put_object(&self.client, &self.bucket, key, body, Some(content_type)).await?;
        Ok(())
    }

    async fn put_if_absent(
        &self,
        key: &str,
        body: Vec<u8>,
        content_type: &str,
    ) -> Result<(), StorageError> {
        objects::put_object_if_absent(&self.client, &self.bucket, key, body, Some(content_type))
            .await?;
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), StorageError> {
        objects::delete_object(&self.client, &self.bucket, key).await
    }

    async fn list(&self, prefix: &str) -> Result<Vec<String>, StorageError> {
        let mut keys = objects::list_objects(&self.client, &self.bucket, prefix).await?;
        keys.sort();
        Ok(keys)
    }
}
