//! Key/value persistence for the token registry and the transaction log.
//!
//! Values are JSON documents. Several processes may share one data
//! directory (e.g. a running `monitor` and a `transfer` from another shell).
//! The file backed store serializes its writers with an advisory lock per
//! key, and versions every document so that an update which raced with a
//! writer outside the lock (a copied in browser export) is re-applied.

use {
    serde::{Deserialize, Serialize, de::DeserializeOwned},
    serde_json::Value,
    std::{
        collections::HashMap,
        fs::File,
        io::Write,
        path::{Path, PathBuf},
        sync::{Mutex, PoisonError},
    },
    tokio::sync::broadcast,
};

/// Times an update is re-applied after losing a race before giving up.
const MAX_ATTEMPTS: usize = 3;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("invalid store key {0:?}")]
    InvalidKey(String),
    #[error("I/O error on {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to encode value")]
    Json(#[from] serde_json::Error),
    #[error("concurrent writers kept modifying {0:?}")]
    Conflict(String),
}

/// Notification that the value under `key` was written or removed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Change {
    pub key: String,
}

pub type Updater<'a> = dyn FnMut(Option<Value>) -> Result<Value, Error> + 'a;

pub trait Store: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<Value>, Error>;

    fn set(&self, key: &str, value: Value) -> Result<(), Error>;

    /// Replaces the value under `key` with `f(current)`. `f` may run more
    /// than once when another writer modifies the key concurrently.
    fn update(&self, key: &str, f: &mut Updater<'_>) -> Result<Value, Error>;

    fn remove(&self, key: &str) -> Result<(), Error>;

    fn subscribe(&self) -> broadcast::Receiver<Change>;
}

/// The elements of a stored JSON array. Anything that is not an array reads
/// as empty.
fn entries(key: &str, value: Option<Value>) -> Vec<Value> {
    match value {
        None => Vec::new(),
        Some(Value::Array(entries)) => entries,
        Some(other) => {
            tracing::warn!(key, kind = json_kind(&other), "stored value is not a list");
            Vec::new()
        }
    }
}

/// Decodes one list element. `None` for elements in a shape `T` does not
/// describe, e.g. entries written by another client.
pub fn decode_entry<T: DeserializeOwned>(entry: &Value) -> Option<T> {
    T::deserialize(entry).ok()
}

/// Decodes a stored JSON array, skipping entries that do not match `T`.
pub fn decode_list<T: DeserializeOwned>(key: &str, value: Option<Value>) -> Vec<T> {
    entries(key, value)
        .into_iter()
        .filter_map(|entry| match serde_json::from_value(entry) {
            Ok(entry) => Some(entry),
            Err(err) => {
                tracing::debug!(key, ?err, "skipping unreadable entry");
                None
            }
        })
        .collect()
}

/// Read-modify-write of a stored list. `f` works on the raw elements, so
/// elements it does not touch are written back unchanged even when they do
/// not decode.
pub fn update_list(
    store: &dyn Store,
    key: &str,
    mut f: impl FnMut(&mut Vec<Value>),
) -> Result<Vec<Value>, Error> {
    let mut updated = Vec::new();
    store.update(key, &mut |current| {
        let mut list = entries(key, current);
        f(&mut list);
        updated.clone_from(&list);
        Ok(Value::Array(list))
    })?;
    Ok(updated)
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn validate(key: &str) -> Result<(), Error> {
    let valid = !key.is_empty()
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
    if !valid {
        return Err(Error::InvalidKey(key.to_owned()));
    }
    Ok(())
}

#[derive(Debug, Deserialize, Serialize)]
struct Document {
    version: u64,
    value: Value,
}

/// Stores every key as `<dir>/<key>.json`, guarded by `<dir>/<key>.lock`.
pub struct FileStore {
    dir: PathBuf,
    changes: broadcast::Sender<Change>,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self, Error> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir).map_err(|source| Error::Io {
            path: dir.clone(),
            source,
        })?;
        let (changes, _) = broadcast::channel(16);
        Ok(Self { dir, changes })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }

    fn lock_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.lock"))
    }

    /// Opens the lock file of `key`. Hold its write guard for the whole
    /// read-check-write of the key.
    fn lock(&self, key: &str) -> Result<fd_lock::RwLock<File>, Error> {
        let path = self.lock_path(key);
        let file = File::options()
            .create(true)
            .truncate(false)
            .write(true)
            .open(&path)
            .map_err(|source| Error::Io { path, source })?;
        Ok(fd_lock::RwLock::new(file))
    }

    fn locked_error(&self, key: &str, source: std::io::Error) -> Error {
        Error::Io {
            path: self.lock_path(key),
            source,
        }
    }

    /// Reads the document under `key`. Plain values written without the
    /// version envelope are accepted as version 0; unparsable files read as
    /// an empty version 0 document.
    fn read(&self, key: &str) -> Result<Option<Document>, Error> {
        let path = self.path(key);
        let bytes = match std::fs::read(&path) {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(source) => return Err(Error::Io { path, source }),
        };
        let value = match serde_json::from_slice::<Value>(&bytes) {
            Ok(value) => value,
            Err(err) => {
                tracing::warn!(?path, ?err, "ignoring malformed store file");
                Value::Null
            }
        };
        let document = match value {
            Value::Object(ref object)
                if object.len() == 2
                    && object.get("version").is_some_and(Value::is_u64)
                    && object.contains_key("value") =>
            {
                serde_json::from_value(value)?
            }
            value => Document { version: 0, value },
        };
        Ok(Some(document))
    }

    fn write(&self, key: &str, document: &Document) -> Result<(), Error> {
        let path = self.path(key);
        let io = |source| Error::Io {
            path: path.clone(),
            source,
        };
        let mut file = tempfile::NamedTempFile::new_in(&self.dir).map_err(io)?;
        serde_json::to_writer_pretty(&mut file, document)?;
        file.write_all(b"\n").map_err(io)?;
        file.persist(&path).map_err(|err| io(err.error))?;
        Ok(())
    }

    fn notify(&self, key: &str) {
        // Nobody listening is fine.
        let _ = self.changes.send(Change {
            key: key.to_owned(),
        });
    }
}

impl Store for FileStore {
    fn get(&self, key: &str) -> Result<Option<Value>, Error> {
        validate(key)?;
        Ok(self
            .read(key)?
            .map(|document| document.value)
            .filter(|value| !value.is_null()))
    }

    fn set(&self, key: &str, value: Value) -> Result<(), Error> {
        self.update(key, &mut |_| Ok(value.clone())).map(|_| ())
    }

    fn update(&self, key: &str, f: &mut Updater<'_>) -> Result<Value, Error> {
        validate(key)?;
        let mut lock = self.lock(key)?;
        let _held = lock.write().map_err(|err| self.locked_error(key, err))?;
        for attempt in 1..=MAX_ATTEMPTS {
            let (version, current) = match self.read(key)? {
                Some(document) => (document.version, Some(document.value)),
                None => (0, None),
            };
            let value = f(current.filter(|value| !value.is_null()))?;
            let latest = self.read(key)?.map_or(0, |document| document.version);
            if latest != version {
                tracing::debug!(key, attempt, version, latest, "store key modified concurrently");
                continue;
            }
            self.write(
                key,
                &Document {
                    version: version + 1,
                    value: value.clone(),
                },
            )?;
            self.notify(key);
            return Ok(value);
        }
        Err(Error::Conflict(key.to_owned()))
    }

    fn remove(&self, key: &str) -> Result<(), Error> {
        validate(key)?;
        let mut lock = self.lock(key)?;
        let _held = lock.write().map_err(|err| self.locked_error(key, err))?;
        let path = self.path(key);
        match std::fs::remove_file(&path) {
            Ok(()) => (),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(()),
            Err(source) => return Err(Error::Io { path, source }),
        }
        self.notify(key);
        Ok(())
    }

    fn subscribe(&self) -> broadcast::Receiver<Change> {
        self.changes.subscribe()
    }
}

/// In-process store, used in tests.
pub struct MemoryStore {
    values: Mutex<HashMap<String, Value>>,
    changes: broadcast::Sender<Change>,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self {
            values: Default::default(),
            changes: broadcast::channel(16).0,
        }
    }
}

impl MemoryStore {
    fn notify(&self, key: &str) {
        let _ = self.changes.send(Change {
            key: key.to_owned(),
        });
    }
}

impl Store for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<Value>, Error> {
        validate(key)?;
        let values = self.values.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(values.get(key).cloned())
    }

    fn set(&self, key: &str, value: Value) -> Result<(), Error> {
        validate(key)?;
        self.values
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.to_owned(), value);
        self.notify(key);
        Ok(())
    }

    fn update(&self, key: &str, f: &mut Updater<'_>) -> Result<Value, Error> {
        validate(key)?;
        let mut values = self.values.lock().unwrap_or_else(PoisonError::into_inner);
        let value = f(values.get(key).cloned())?;
        values.insert(key.to_owned(), value.clone());
        drop(values);
        self.notify(key);
        Ok(value)
    }

    fn remove(&self, key: &str) -> Result<(), Error> {
        validate(key)?;
        self.values
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(key);
        self.notify(key);
        Ok(())
    }

    fn subscribe(&self) -> broadcast::Receiver<Change> {
        self.changes.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use {super::*, serde_json::json};

    #[test]
    fn file_store_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path()).unwrap();
        assert_eq!(store.get("numbers").unwrap(), None);

        store.set("numbers", json!([1, 2])).unwrap();
        assert_eq!(store.get("numbers").unwrap(), Some(json!([1, 2])));

        let on_disk: Value =
            serde_json::from_slice(&std::fs::read(dir.path().join("numbers.json")).unwrap())
                .unwrap();
        assert_eq!(on_disk, json!({"version": 1, "value": [1, 2]}));

        store.remove("numbers").unwrap();
        assert_eq!(store.get("numbers").unwrap(), None);
        // removing twice is fine
        store.remove("numbers").unwrap();
    }

    #[test]
    fn accepts_plain_documents() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("tokens.json"), r#"[{"a": 1}]"#).unwrap();
        std::fs::write(dir.path().join("broken.json"), "{not json").unwrap();
        let store = FileStore::new(dir.path()).unwrap();

        assert_eq!(store.get("tokens").unwrap(), Some(json!([{"a": 1}])));
        assert_eq!(store.get("broken").unwrap(), None);

        let updated = update_list(&store, "broken", |list| list.push(json!(1))).unwrap();
        assert_eq!(updated, vec![json!(1)]);
    }

    #[test]
    fn rejects_path_like_keys() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path()).unwrap();
        assert!(matches!(
            store.get("../escape"),
            Err(Error::InvalidKey(_))
        ));
        assert!(matches!(store.set("", json!(1)), Err(Error::InvalidKey(_))));
    }

    /// Writes `key` the way a client that ignores the lock file would.
    fn write_unlocked(dir: &Path, key: &str, version: u64, value: Value) {
        let document = json!({"version": version, "value": value});
        std::fs::write(dir.join(format!("{key}.json")), document.to_string()).unwrap();
    }

    #[test]
    fn reapplies_update_after_unlocked_write() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path()).unwrap();
        store.set("log", json!(["first"])).unwrap();

        let mut calls = 0;
        let result = store
            .update("log", &mut |current| {
                calls += 1;
                if calls == 1 {
                    write_unlocked(dir.path(), "log", 2, json!(["other", "first"]));
                }
                let mut list: Vec<String> = decode_list("log", current);
                list.insert(0, "mine".to_owned());
                Ok(serde_json::to_value(list)?)
            })
            .unwrap();

        assert_eq!(calls, 2);
        assert_eq!(result, json!(["mine", "other", "first"]));
        assert_eq!(store.get("log").unwrap(), Some(result));
    }

    #[test]
    fn gives_up_when_writers_keep_racing() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path()).unwrap();

        let mut version = 0;
        let err = store
            .update("log", &mut |_| {
                version += 1;
                write_unlocked(dir.path(), "log", version, json!(["other"]));
                Ok(json!(["mine"]))
            })
            .unwrap_err();
        assert!(matches!(err, Error::Conflict(key) if key == "log"));
        assert_eq!(store.get("log").unwrap(), Some(json!(["other"])));
    }

    #[test]
    fn stores_sharing_a_directory_never_lose_updates() {
        let dir = tempfile::tempdir().unwrap();
        let writers = (0..2)
            .map(|writer| {
                let store = FileStore::new(dir.path()).unwrap();
                std::thread::spawn(move || {
                    for i in 0..25 {
                        update_list(&store, "log", |list| list.push(json!([writer, i]))).unwrap();
                    }
                })
            })
            .collect::<Vec<_>>();
        for writer in writers {
            writer.join().unwrap();
        }

        let store = FileStore::new(dir.path()).unwrap();
        let entries = decode_list::<(u32, u32)>("log", store.get("log").unwrap());
        assert_eq!(entries.len(), 50);
        for writer in 0..2 {
            let mine = entries
                .iter()
                .filter(|(w, _)| *w == writer)
                .map(|(_, i)| *i)
                .collect::<Vec<_>>();
            assert_eq!(mine, (0..25).collect::<Vec<_>>());
        }
    }

    #[test]
    fn updates_keep_entries_they_cannot_decode() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path()).unwrap();
        store.set("list", json!([{"foreign": true}, 1])).unwrap();

        let updated = update_list(&store, "list", |list| {
            list.retain(|entry| decode_entry::<u32>(entry) != Some(1));
            list.insert(0, json!(2));
        })
        .unwrap();
        assert_eq!(updated, vec![json!(2), json!({"foreign": true})]);
        assert_eq!(decode_list::<u32>("list", store.get("list").unwrap()), vec![2]);
    }

    #[test]
    fn non_list_values_decode_as_empty() {
        assert!(decode_list::<u32>("k", Some(json!({"a": 1}))).is_empty());
        assert_eq!(
            decode_list::<u32>("k", Some(json!([1, "x", 3]))),
            vec![1, 3]
        );
    }

    #[tokio::test]
    async fn notifies_subscribers() {
        let store = MemoryStore::default();
        let mut changes = store.subscribe();
        store.set("key", json!(1)).unwrap();
        update_list(&store, "other", |list| list.push(json!(1))).unwrap();
        assert_eq!(changes.recv().await.unwrap().key, "key");
        assert_eq!(changes.recv().await.unwrap().key, "other");
    }
}
