//! IndexedDB-backed cache store for browser embeddings.
//!
//! Entries are kept as `{ key, value }` records in a single object store.
//! IndexedDB has no native expiry, so the retention hint is ignored and stale
//! records are left for [`crate::cache::CollectionCache`] to skip on read.
use std::time::Duration;

use async_trait::async_trait;
use rexie::{ObjectStore, Rexie, TransactionMode};
use serde::{Deserialize, Serialize};
use wasm_bindgen::JsValue;

use crate::cache::CacheStore;
use crate::error::CacheError;

const DB_NAME: &str = "record_shelf_db";
const STORE_NAME: &str = "collection_cache";

#[derive(Clone, Debug, Deserialize, Serialize)]
struct StoredBlob {
    key: String,
    value: String,
}

fn store_err(e: impl ToString) -> CacheError {
    CacheError::Store(e.to_string())
}

pub struct IndexedDbStore {
    db: Rexie,
}

impl IndexedDbStore {
    pub async fn open() -> Result<Self, CacheError> {
        let db = Rexie::builder(DB_NAME)
            .version(1)
            .add_object_store(ObjectStore::new(STORE_NAME).key_path("key"))
            .build()
            .await
            .map_err(store_err)?;
        Ok(Self { db })
    }
}

#[async_trait(?Send)]
impl CacheStore for IndexedDbStore {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        let transaction = self
            .db
            .transaction(&[STORE_NAME], TransactionMode::ReadOnly)
            .map_err(store_err)?;
        let store = transaction.store(STORE_NAME).map_err(store_err)?;

        let found = store.get(JsValue::from_str(key)).await.map_err(store_err)?;
        match found {
            Some(value) if !value.is_undefined() && !value.is_null() => {
                let blob: StoredBlob = serde_wasm_bindgen::from_value(value)
                    .map_err(|e| store_err(format!("Deserialization error: {}", e)))?;
                Ok(Some(blob.value))
            }
            _ => Ok(None),
        }
    }

    async fn put(&self, key: &str, value: String, _ttl: Duration) -> Result<(), CacheError> {
        let transaction = self
            .db
            .transaction(&[STORE_NAME], TransactionMode::ReadWrite)
            .map_err(store_err)?;
        let store = transaction.store(STORE_NAME).map_err(store_err)?;

        let blob = StoredBlob {
            key: key.to_string(),
            value,
        };
        let js_val = serde_wasm_bindgen::to_value(&blob)
            .map_err(|e| store_err(format!("Serialization error: {}", e)))?;
        store.put(&js_val, None).await.map_err(store_err)?;

        transaction.done().await.map_err(store_err)?;
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), CacheError> {
        let transaction = self
            .db
            .transaction(&[STORE_NAME], TransactionMode::ReadWrite)
            .map_err(store_err)?;
        let store = transaction.store(STORE_NAME).map_err(store_err)?;
        store.delete(JsValue::from_str(key)).await.map_err(store_err)?;
        transaction.done().await.map_err(store_err)?;
        Ok(())
    }
}
