use std::fmt::{self, Display};
use std::marker::PhantomData;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::warn;

use crate::client::http_client::ApiClient;
use crate::errors::error::ClientError;
use crate::errors::normalizer::NormalizedError;

/// CRUD call-through for one backend collection (`/classes`, `/final-comments`, ...).
///
/// Failures reach the caller already normalized, so views only ever see
/// `{error, details}`.
pub struct ResourceService<T> {
    client: ApiClient,
    collection: String,
    _resource: PhantomData<fn() -> T>,
}

impl<T> Clone for ResourceService<T> {
    fn clone(&self) -> Self {
        Self {
            client: self.client.clone(),
            collection: self.collection.clone(),
            _resource: PhantomData,
        }
    }
}

impl<T> fmt::Debug for ResourceService<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResourceService").field("collection", &self.collection).finish()
    }
}

impl<T> ResourceService<T>
where
    T: Serialize + DeserializeOwned,
{
    pub fn new(client: ApiClient, collection: impl Into<String>) -> Self {
        let collection = collection.into();
        Self {
            client,
            collection: format!("/{}", collection.trim_matches('/')),
            _resource: PhantomData,
        }
    }

    pub fn collection(&self) -> &str {
        &self.collection
    }

    fn item_path(&self, id: impl Display) -> String {
        format!("{}/{}", self.collection, id)
    }

    pub async fn list(&self) -> Result<Vec<T>, NormalizedError> {
        self.client
            .get::<Vec<T>>(&self.collection)
            .await
            .map(|res| res.data)
            .map_err(|err| self.normalize("list", err))
    }

    pub async fn fetch(&self, id: impl Display) -> Result<T, NormalizedError> {
        self.client
            .get::<T>(&self.item_path(id))
            .await
            .map(|res| res.data)
            .map_err(|err| self.normalize("fetch", err))
    }

    pub async fn create(&self, item: &T) -> Result<T, NormalizedError> {
        self.client
            .post::<T, T>(&self.collection, item)
            .await
            .map(|res| res.data)
            .map_err(|err| self.normalize("create", err))
    }

    pub async fn update(&self, id: impl Display, item: &T) -> Result<T, NormalizedError> {
        self.client
            .put::<T, T>(&self.item_path(id), item)
            .await
            .map(|res| res.data)
            .map_err(|err| self.normalize("update", err))
    }

    pub async fn remove(&self, id: impl Display) -> Result<(), NormalizedError> {
        self.client
            .delete::<Value>(&self.item_path(id))
            .await
            .map(|_| ())
            .map_err(|err| self.normalize("remove", err))
    }

    fn normalize(&self, operation: &str, err: ClientError) -> NormalizedError {
        let normalized = err.normalized();
        warn!(
            collection = %self.collection,
            operation,
            kind = err.kind(),
            error = %normalized.error,
            details = %normalized.details,
            "resource call failed"
        );
        normalized
    }
}
