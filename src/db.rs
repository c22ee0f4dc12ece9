use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fmt::Display;
use std::time::Instant;
use tracing::log;
use walkdir::WalkDir;

/// File-backed key-value store: one JSON file per key under
/// `<root>/<name>/<key>`. Root defaults to `./db` and can be pointed
/// elsewhere with the DB_PATH env var (tests use temp dirs).
pub struct Db<K: Display, V: DeserializeOwned + Serialize> {
    pub name: String,
    root: String,
    key_type: std::marker::PhantomData<K>,
    value_type: std::marker::PhantomData<V>,
}

impl<K: Display, V: DeserializeOwned + Serialize> Db<K, V> {
    pub fn new(name: &str) -> Db<K, V> {
        let root = std::env::var("DB_PATH").unwrap_or_else(|_| "./db".to_string());
        Db::new_in(&root, name)
    }

    pub fn new_in(root: &str, name: &str) -> Db<K, V> {
        Db {
            name: name.to_string(),
            root: root.to_string(),
            key_type: std::marker::PhantomData,
            value_type: std::marker::PhantomData,
        }
    }

    pub fn read(&self, key: &K) -> Option<V> {
        let path = self.get_path(&key.to_string());
        Db::<K, V>::read_file(&path)
    }

    pub fn read_all(&self) -> Vec<V> {
        let before = Instant::now();

        let path = format!("{}/{}", self.root, self.name);
        let result: Vec<V> = WalkDir::new(path)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.metadata().ok().map(|e| e.is_file()).unwrap_or(false))
            .filter_map(|entry| entry.path().to_str().and_then(Db::<K, V>::read_file))
            .collect();

        log::debug!("[DB] read all {} {} {:.0?}", self.name, result.len(), before.elapsed());
        result
    }

    pub fn write(&self, key: &K, obj: &V) -> std::io::Result<()> {
        let before = Instant::now();
        let json = serde_json::to_string(&obj)?;
        let path = std::path::PathBuf::from(self.get_path(&key.to_string()));
        std::fs::create_dir_all(path.parent().unwrap())?;
        let result = std::fs::write(path, json);

        match result {
            Ok(e) => {
                log::debug!("[DB] Wrote to file {}/{} {:.2?}", self.name, key, before.elapsed());
                Ok(e)
            }
            Err(e) => {
                log::debug!("[DB] Write failed {}/{} {}", self.name, key, e);
                Ok(())
            }
        }
    }

    pub fn remove(&self, key: &K) {
        let path = self.get_path(&key.to_string());
        if let Err(e) = std::fs::remove_file(&path) {
            log::debug!("[DB] Remove failed {} {}", path, e);
        }
    }

    fn read_file(path: &str) -> Option<V> {
        let before = Instant::now();
        let data = std::fs::read_to_string(path).ok()?;
        let res = match serde_json::from_str(&data) {
            Ok(e) => Some(e),
            Err(e) => {
                log::error!("[DB] Read failed {} {}", path, e);
                None
            }
        };
        log::debug!("[DB] Read from file {path} {:.2?}", before.elapsed());
        res
    }

    fn get_path(&self, key: &str) -> String {
        format!("{}/{}/{}", self.root, self.name, key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempdir::TempDir;

    #[test]
    fn write_read_remove() {
        let dir = TempDir::new("db_test").expect("dir to be created");
        let db: Db<String, Vec<u32>> = Db::new_in(dir.path().to_str().unwrap(), "unit");

        let key = "k1".to_string();
        assert!(db.read(&key).is_none());

        db.write(&key, &vec![1, 2, 3]).unwrap();
        assert_eq!(db.read(&key), Some(vec![1, 2, 3]));
        assert_eq!(db.read_all(), vec![vec![1, 2, 3]]);

        db.remove(&key);
        assert!(db.read(&key).is_none());
        assert!(db.read_all().is_empty());
    }
}
