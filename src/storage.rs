use std::{collections::BTreeMap, path::Path, path::PathBuf, sync::Arc};
use thiserror::Error;
use tokio::{fs, sync::Mutex};
use tracing::error;

pub const WORKOUT_DATA_KEY: &str = "workoutData";
pub const THEME_KEY: &str = "theme";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to write store file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to serialize store: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Key-value store of raw strings, mirrored to a JSON file on every save.
///
/// Clones share the same entries, so the registry and the theme state can
/// each hold a handle.
#[derive(Debug, Clone)]
pub struct Store {
    path: Option<PathBuf>,
    entries: Arc<Mutex<BTreeMap<String, String>>>,
}

impl Store {
    pub async fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let entries = read_entries(&path).await;
        Self {
            path: Some(path),
            entries: Arc::new(Mutex::new(entries)),
        }
    }

    pub fn in_memory() -> Self {
        Self {
            path: None,
            entries: Arc::default(),
        }
    }

    pub async fn load(&self, key: &str) -> Option<String> {
        self.entries.lock().await.get(key).cloned()
    }

    /// Stores `raw` under `key`. Entries only change once the file write succeeds.
    pub async fn save(&self, key: &str, raw: impl Into<String>) -> Result<(), StoreError> {
        let mut entries = self.entries.lock().await;
        let key = key.to_string();
        let raw = raw.into();

        // Written under the lock so file order matches save order.
        if let Some(path) = &self.path {
            let mut candidate = entries.clone();
            candidate.insert(key.clone(), raw.clone());
            let payload = serde_json::to_vec_pretty(&candidate)?;
            fs::write(path, payload).await?;
        }
        entries.insert(key, raw);
        Ok(())
    }
}

async fn read_entries(path: &Path) -> BTreeMap<String, String> {
    match fs::read(path).await {
        Ok(bytes) => match serde_json::from_slice(&bytes) {
            Ok(entries) => entries,
            Err(err) => {
                error!("failed to parse store file {}: {err}", path.display());
                BTreeMap::new()
            }
        },
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
        Err(err) => {
            error!("failed to read store file {}: {err}", path.display());
            BTreeMap::new()
        }
    }
}
