//! Storage stand-in for environments without persistent storage

use super::KeyValueStorage;
use crate::error::Result;

/// Storage that is never available
///
/// Reads find nothing and writes are dropped. Stores check
/// [`is_available`](KeyValueStorage::is_available) and skip storage entirely,
/// so in practice none of these methods are called by them.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopStorage;

impl KeyValueStorage for NoopStorage {
    fn is_available(&self) -> bool {
        false
    }

    fn get_item(&self, _key: &str) -> Result<Option<String>> {
        Ok(None)
    }

    fn set_item(&self, _key: &str, _value: &str) -> Result<()> {
        Ok(())
    }

    fn remove_item(&self, _key: &str) -> Result<()> {
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        Ok(())
    }

    fn keys(&self) -> Result<Vec<String>> {
        Ok(Vec::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_noop_storage_forgets_everything() {
        let storage = NoopStorage;
        assert!(!storage.is_available());

        storage.set_item("favorites", "[\"paris\"]").unwrap();
        assert_eq!(storage.get_item("favorites").unwrap(), None);
        assert!(storage.keys().unwrap().is_empty());
    }
}
