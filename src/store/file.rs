use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{debug, warn};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{}: file is missing", .path.display())]
    Missing { path: PathBuf },
    #[error("{}: I/O error: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("{}: JSON error: {source}", .path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// What to do when the backing file cannot be read at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadPolicy {
    /// The file must exist and parse.
    Required,
    /// Write an empty collection if the file is absent; parse errors propagate.
    CreateIfMissing,
    /// Any read or parse failure yields an empty collection.
    FailSoft,
}

/// One JSON document held in memory and rewritten in full on every mutation.
#[derive(Debug)]
pub struct JsonFile<T> {
    path: PathBuf,
    data: Mutex<T>,
}

impl<T> JsonFile<T>
where
    T: Serialize + DeserializeOwned + Default + Clone,
{
    pub async fn open(path: impl Into<PathBuf>, policy: LoadPolicy) -> Result<Self, StoreError> {
        let path = path.into();
        let data = match (read_json::<T>(&path).await, policy) {
            (Ok(data), _) => data,
            (Err(StoreError::Missing { .. }), LoadPolicy::CreateIfMissing) => {
                let empty = T::default();
                write_json(&path, &empty).await?;
                debug!(path=%path.display(), "initialized empty store");
                empty
            }
            (Err(err), LoadPolicy::FailSoft) => {
                if !matches!(err, StoreError::Missing { .. }) {
                    warn!(%err, "unreadable store; starting empty");
                }
                T::default()
            }
            (Err(err), _) => return Err(err),
        };
        Ok(Self {
            path,
            data: Mutex::new(data),
        })
    }

    /// Clone of the current contents.
    pub async fn snapshot(&self) -> T {
        self.data.lock().await.clone()
    }

    /// Run a read-only closure against the current contents.
    pub async fn read<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        let guard = self.data.lock().await;
        f(&guard)
    }

    /// Apply `f` to a copy of the contents and flush it. The in-memory value
    /// is replaced only after the file was written; if `f` reports no change
    /// the file is left untouched.
    pub async fn update<R>(&self, f: impl FnOnce(&mut T) -> (R, bool)) -> Result<R, StoreError> {
        let mut guard = self.data.lock().await;
        let mut next = guard.clone();
        let (out, changed) = f(&mut next);
        if changed {
            write_json(&self.path, &next).await?;
            *guard = next;
        }
        Ok(out)
    }
}

async fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, StoreError> {
    let bytes = match tokio::fs::read(path).await {
        Ok(bytes) => bytes,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            return Err(StoreError::Missing {
                path: path.to_path_buf(),
            })
        }
        Err(source) => {
            return Err(StoreError::Io {
                path: path.to_path_buf(),
                source,
            })
        }
    };
    serde_json::from_slice(&bytes).map_err(|source| StoreError::Json {
        path: path.to_path_buf(),
        source,
    })
}

async fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), StoreError> {
    let json = serde_json::to_vec_pretty(value).map_err(|source| StoreError::Json {
        path: path.to_path_buf(),
        source,
    })?;
    let io_err = |source: std::io::Error| StoreError::Io {
        path: path.to_path_buf(),
        source,
    };
    // Write next to the target and rename so readers never see a torn file.
    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);
    tokio::fs::write(&tmp, json).await.map_err(io_err)?;
    tokio::fs::rename(&tmp, path).await.map_err(io_err)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;
    use tempfile::tempdir;

    #[tokio::test]
    async fn required_file_must_exist() {
        let td = tempdir().unwrap();
        let err = JsonFile::<Vec<String>>::open(td.path().join("s.json"), LoadPolicy::Required)
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Missing { .. }));
    }

    #[tokio::test]
    async fn create_if_missing_writes_empty_document() {
        let td = tempdir().unwrap();
        let path = td.path().join("v.json");
        let file = JsonFile::<BTreeMap<String, i32>>::open(&path, LoadPolicy::CreateIfMissing)
            .await
            .unwrap();
        assert!(file.snapshot().await.is_empty());
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "{}");
    }

    #[tokio::test]
    async fn fail_soft_ignores_garbage() {
        let td = tempdir().unwrap();
        let path = td.path().join("u.json");
        std::fs::write(&path, "not json").unwrap();
        let file = JsonFile::<Vec<i64>>::open(&path, LoadPolicy::FailSoft).await.unwrap();
        assert!(file.snapshot().await.is_empty());
    }

    #[tokio::test]
    async fn create_if_missing_still_rejects_garbage() {
        let td = tempdir().unwrap();
        let path = td.path().join("v.json");
        std::fs::write(&path, "[1,").unwrap();
        let err = JsonFile::<BTreeMap<String, i32>>::open(&path, LoadPolicy::CreateIfMissing)
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Json { .. }));
    }

    #[tokio::test]
    async fn update_flushes_only_on_change() {
        let td = tempdir().unwrap();
        let path = td.path().join("u.json");
        let file = JsonFile::<Vec<i64>>::open(&path, LoadPolicy::FailSoft).await.unwrap();

        file.update(|_| ((), false)).await.unwrap();
        assert!(!path.exists());

        file.update(|v| {
            v.push(7);
            ((), true)
        })
        .await
        .unwrap();
        let on_disk: Vec<i64> = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(on_disk, vec![7]);
        assert_eq!(file.snapshot().await, vec![7]);
    }
}
