//! Flat-file record storage.
//!
//! A [`RecordStore`] keeps every row of one CSV file in memory, keyed by a
//! stable id, with a unique secondary index on the row's natural key. Each
//! mutation is followed by a full rewrite of the backing file.

use crate::error::StoreError;
use log::{debug, error, info, warn};
use serde::{de::DeserializeOwned, Serialize};
use std::collections::BTreeMap;
use std::fmt::Debug;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub type RecordId = u64;

pub trait Record: Serialize + DeserializeOwned + Clone {
    type Key: Ord + Clone + Debug;

    /// Header row, in the same order as the struct's fields.
    const HEADER: &'static [&'static str];

    fn key(&self) -> Self::Key;
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum Rejected {
    #[error("no record with id {0}")]
    Missing(RecordId),
    #[error("key is already in use")]
    KeyTaken,
}

pub struct RecordStore<R: Record> {
    path: PathBuf,
    rows: BTreeMap<RecordId, R>,
    index: BTreeMap<R::Key, RecordId>,
    next_id: RecordId,
}

impl<R: Record> RecordStore<R> {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        RecordStore {
            path: path.into(),
            rows: BTreeMap::new(),
            index: BTreeMap::new(),
            next_id: 0,
        }
    }

    /// Creates a store and loads it from `path`. A failed load is logged and
    /// the store keeps whatever rows were read before the failure.
    pub fn open<P: Into<PathBuf>>(path: P) -> Self {
        let mut store = Self::new(path);
        match store.load() {
            Ok(count) => debug!("loaded {} rows from {}", count, store.path.display()),
            Err(err) => error!("failed to load {}: {}", store.path.display(), err),
        }
        store
    }

    /// Reads the backing file, skipping the header row. Rows that do not
    /// parse, have the wrong number of fields, or whose key is already
    /// present, are skipped. Only an I/O error stops the load.
    pub fn load(&mut self) -> Result<usize, StoreError> {
        if !self.path.exists() {
            info!("{} does not exist yet, starting empty", self.path.display());
            return Ok(0);
        }
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_path(&self.path)?;
        let mut count = 0;
        for result in reader.records() {
            let record = match result {
                Ok(record) => record,
                Err(err) if err.is_io_error() => return Err(err.into()),
                Err(err) => {
                    warn!("skipping unreadable row in {}: {}", self.path.display(), err);
                    continue;
                }
            };
            if record.len() != R::HEADER.len() {
                warn!(
                    "skipping row with {} fields in {}, expected {}",
                    record.len(),
                    self.path.display(),
                    R::HEADER.len()
                );
                continue;
            }
            let row: R = match record.deserialize(None) {
                Ok(row) => row,
                Err(err) => {
                    warn!("skipping malformed row in {}: {}", self.path.display(), err);
                    continue;
                }
            };
            let key = row.key();
            if self.insert_row(row).is_none() {
                warn!(
                    "skipping duplicate key {:?} in {}",
                    key,
                    self.path.display()
                );
                continue;
            }
            count += 1;
        }
        Ok(count)
    }

    fn insert_row(&mut self, row: R) -> Option<RecordId> {
        let key = row.key();
        if self.index.contains_key(&key) {
            return None;
        }
        let id = self.next_id;
        self.next_id += 1;
        self.index.insert(key, id);
        self.rows.insert(id, row);
        Some(id)
    }

    /// Adds a row and rewrites the file. Returns `None` if the row's key is
    /// already in use.
    pub fn insert(&mut self, row: R) -> Option<RecordId> {
        let id = self.insert_row(row)?;
        self.sync();
        Some(id)
    }

    pub fn get(&self, id: RecordId) -> Option<&R> {
        self.rows.get(&id)
    }

    pub fn find(&self, key: &R::Key) -> Option<(RecordId, &R)> {
        let id = *self.index.get(key)?;
        self.rows.get(&id).map(|row| (id, row))
    }

    pub fn contains_key(&self, key: &R::Key) -> bool {
        self.index.contains_key(key)
    }

    /// Applies `change` to a copy of the row and stores the result under the
    /// same id, re-indexing if the key changed. Nothing is modified when the
    /// new key collides with another row.
    pub fn update<F>(&mut self, id: RecordId, change: F) -> Result<(), Rejected>
    where
        F: FnOnce(&mut R),
    {
        let old = self.rows.get(&id).ok_or(Rejected::Missing(id))?;
        let old_key = old.key();
        let mut row = old.clone();
        change(&mut row);
        let new_key = row.key();
        if new_key != old_key {
            if self.index.contains_key(&new_key) {
                return Err(Rejected::KeyTaken);
            }
            self.index.remove(&old_key);
            self.index.insert(new_key, id);
        }
        self.rows.insert(id, row);
        self.sync();
        Ok(())
    }

    pub fn remove(&mut self, id: RecordId) -> Option<R> {
        let row = self.rows.remove(&id)?;
        self.index.remove(&row.key());
        self.sync();
        Some(row)
    }

    pub fn iter(&self) -> impl Iterator<Item = (RecordId, &R)> {
        self.rows.iter().map(|(id, row)| (*id, row))
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Rewrites the whole backing file: header first, then rows in id order.
    pub fn persist(&self) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_path(&self.path)?;
        writer.write_record(R::HEADER)?;
        for row in self.rows.values() {
            writer.serialize(row)?;
        }
        writer.flush()?;
        Ok(())
    }

    /// Like [`persist`](Self::persist), but a failure is only logged.
    pub fn sync(&self) {
        if let Err(err) = self.persist() {
            error!("failed to write {}: {}", self.path.display(), err);
        }
    }
}

/// Reads the first column of every row after the header.
pub fn load_column(path: &Path) -> Result<Vec<String>, StoreError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(path)?;
    let mut values = Vec::new();
    for result in reader.records() {
        let record = result?;
        if let Some(value) = record.get(0) {
            if !value.is_empty() {
                values.push(value.to_owned());
            }
        }
    }
    Ok(values)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use tempdir::TempDir;

    #[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
    struct Pet {
        name: String,
        legs: u32,
    }

    impl Record for Pet {
        type Key = String;
        const HEADER: &'static [&'static str] = &["name", "legs"];

        fn key(&self) -> String {
            self.name.clone()
        }
    }

    fn pet(name: &str, legs: u32) -> Pet {
        Pet {
            name: name.to_owned(),
            legs,
        }
    }

    #[test]
    fn writes_header_and_rows() {
        let dir = TempDir::new("rentflix").unwrap();
        let path = dir.path().join("pets.csv");
        let mut store = RecordStore::new(&path);
        store.insert(pet("rex", 4)).unwrap();
        store.insert(pet("tweety", 2)).unwrap();
        let contents = std::fs::read_to_string(&path).unwrap();
        assert_eq!(contents, "name,legs\nrex,4\ntweety,2\n");
    }

    #[test]
    fn reload() {
        let dir = TempDir::new("rentflix").unwrap();
        let path = dir.path().join("pets.csv");
        let mut store = RecordStore::new(&path);
        store.insert(pet("rex", 4)).unwrap();
        store.insert(pet("tweety", 2)).unwrap();

        let reloaded: RecordStore<Pet> = RecordStore::open(&path);
        assert_eq!(reloaded.len(), 2);
        assert_eq!(reloaded.find(&"tweety".to_owned()).unwrap().1, &pet("tweety", 2));
    }

    #[test]
    fn duplicate_key() {
        let dir = TempDir::new("rentflix").unwrap();
        let mut store = RecordStore::new(dir.path().join("pets.csv"));
        store.insert(pet("rex", 4)).unwrap();
        assert_eq!(store.insert(pet("rex", 3)), None);
        assert_eq!(store.find(&"rex".to_owned()).unwrap().1.legs, 4);
    }

    #[test]
    fn update_keeps_id() {
        let dir = TempDir::new("rentflix").unwrap();
        let mut store = RecordStore::new(dir.path().join("pets.csv"));
        let rex = store.insert(pet("rex", 4)).unwrap();
        let tweety = store.insert(pet("tweety", 2)).unwrap();

        store.update(rex, |p| p.name = "max".to_owned()).unwrap();
        assert_eq!(store.find(&"max".to_owned()).unwrap().0, rex);
        assert!(!store.contains_key(&"rex".to_owned()));

        assert_eq!(
            store.update(tweety, |p| p.name = "max".to_owned()),
            Err(Rejected::KeyTaken)
        );
        assert_eq!(store.get(tweety).unwrap().name, "tweety");
        assert_eq!(store.update(42, |p| p.legs = 0), Err(Rejected::Missing(42)));
    }

    #[test]
    fn skips_bad_rows() {
        let dir = TempDir::new("rentflix").unwrap();
        let path = dir.path().join("pets.csv");
        std::fs::write(&path, "name,legs\nrex,4\nbob,many\nrex,3\nsnake,0\n").unwrap();
        let store: RecordStore<Pet> = RecordStore::open(&path);
        assert_eq!(store.len(), 2);
        assert_eq!(store.find(&"rex".to_owned()).unwrap().1.legs, 4);
    }

    #[test]
    fn missing_file_is_empty() {
        let dir = TempDir::new("rentflix").unwrap();
        let store: RecordStore<Pet> = RecordStore::open(dir.path().join("nothing.csv"));
        assert!(store.is_empty());
    }

    #[test]
    fn short_row_does_not_stop_load() {
        let dir = TempDir::new("rentflix").unwrap();
        let path = dir.path().join("pets.csv");
        std::fs::write(&path, "name,legs\nrex,4\nbroken\nsnake,0,extra\ntweety,2\n").unwrap();
        let store: RecordStore<Pet> = RecordStore::open(&path);
        assert_eq!(store.len(), 2);
        assert!(store.find(&"tweety".to_owned()).is_some());
        assert!(!store.contains_key(&"snake".to_owned()));
    }

    #[test]
    fn remove() {
        let dir = TempDir::new("rentflix").unwrap();
        let path = dir.path().join("pets.csv");
        let mut store = RecordStore::new(&path);
        let rex = store.insert(pet("rex", 4)).unwrap();
        assert_eq!(store.remove(rex), Some(pet("rex", 4)));
        assert_eq!(store.remove(rex), None);
        assert!(store.insert(pet("rex", 4)).is_some());
    }
}
