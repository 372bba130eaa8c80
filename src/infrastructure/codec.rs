//! JSON encoding at the persistence boundary.
//!
//! Application services never see raw stored strings: they read and write
//! typed records through these helpers.

use crate::domain::ports::KeyValueStore;
use crate::error::Result;
use serde::Serialize;
use serde::de::DeserializeOwned;

pub async fn read_json<T: DeserializeOwned>(store: &dyn KeyValueStore, key: &str) -> Result<Option<T>> {
    match store.get(key).await? {
        Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
        None => Ok(None),
    }
}

pub async fn write_json<T: Serialize + ?Sized>(store: &dyn KeyValueStore, key: &str, value: &T) -> Result<()> {
    let raw = serde_json::to_string(value)?;
    store.set(key, raw).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CheckoutError;
    use crate::infrastructure::in_memory::InMemoryStore;

    #[tokio::test]
    async fn test_json_roundtrip() {
        let store = InMemoryStore::new();
        write_json(&store, "numbers", &vec![1, 2, 3]).await.unwrap();

        let numbers: Option<Vec<u32>> = read_json(&store, "numbers").await.unwrap();
        assert_eq!(numbers, Some(vec![1, 2, 3]));

        let missing: Option<Vec<u32>> = read_json(&store, "other").await.unwrap();
        assert!(missing.is_none());
    }

    #[tokio::test]
    async fn test_corrupt_value_is_serialization_error() {
        let store = InMemoryStore::new();
        store.set("numbers", "not json".to_string()).await.unwrap();

        let result: Result<Option<Vec<u32>>> = read_json(&store, "numbers").await;
        assert!(matches!(result, Err(CheckoutError::Serialization(_))));
    }
}
