use crate::domain::ports::DurableStore;
use crate::utils::error::{Result, SiteError};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

const STORE_FILE: &str = "preferences.json";

/// Durable key/value storage persisted as a JSON object in `base_path`.
#[derive(Debug)]
pub struct FileDurableStore {
    base_path: PathBuf,
    write_lock: Mutex<()>,
}

impl FileDurableStore {
    pub fn new(base_path: impl AsRef<Path>) -> Self {
        Self {
            base_path: base_path.as_ref().to_path_buf(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn file_path(&self) -> PathBuf {
        self.base_path.join(STORE_FILE)
    }

    fn read_all(&self) -> Result<BTreeMap<String, String>> {
        let path = self.file_path();
        if !path.exists() {
            return Ok(BTreeMap::new());
        }

        let data = fs::read(&path)?;
        if data.is_empty() {
            return Ok(BTreeMap::new());
        }
        Ok(serde_json::from_slice(&data)?)
    }

    fn write_all(&self, values: &BTreeMap<String, String>) -> Result<()> {
        fs::create_dir_all(&self.base_path)?;
        let data = serde_json::to_vec_pretty(values)?;
        fs::write(self.file_path(), data)?;
        Ok(())
    }

    fn update(&self, change: impl FnOnce(&mut BTreeMap<String, String>)) -> Result<()> {
        let _guard = self.write_lock.lock().map_err(|_| SiteError::StorageError {
            message: "durable store lock poisoned".to_string(),
        })?;
        let mut values = self.read_all()?;
        change(&mut values);
        self.write_all(&values)
    }
}

impl DurableStore for FileDurableStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.read_all()?.remove(key))
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.update(|values| {
            values.insert(key.to_string(), value.to_string());
        })
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.update(|values| {
            values.remove(key);
        })
    }
}
