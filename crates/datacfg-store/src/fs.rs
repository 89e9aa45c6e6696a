//! Filesystem medium: one `.json` file per key under a root directory.
//!
//! Medium key `configs/Weapon_Sword` maps to
//! `<root>/configs/Weapon_Sword.json`.

use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use walkdir::WalkDir;

use crate::error::StoreResult;
use crate::key::validate_medium_key;
use crate::traits::ContentStore;

const EXTENSION: &str = "json";

/// A [`ContentStore`] backed by a directory tree.
///
/// Writes go to a temporary file in the destination directory, which is
/// flushed and then renamed over the target.
#[derive(Clone, Debug)]
pub struct FsContentStore {
    root: PathBuf,
}

impl FsContentStore {
    /// Open (creating if needed) a medium rooted at `root`.
    pub fn open(root: impl Into<PathBuf>) -> StoreResult<Self> {
        let root = root.into();
        fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Filesystem path of the document stored at `key`.
    pub fn path_for(&self, key: &str) -> StoreResult<PathBuf> {
        validate_medium_key(key)?;
        let mut path = self.root.clone();
        let name = match key.rsplit_once('/') {
            Some((dirs, name)) => {
                path.extend(dirs.split('/'));
                name
            }
            None => key,
        };
        path.push(format!("{name}.{EXTENSION}"));
        Ok(path)
    }

    /// Inverse of [`path_for`](Self::path_for) for files found by a scan.
    fn key_for(&self, path: &Path) -> Option<String> {
        let relative = path.strip_prefix(&self.root).ok()?;
        let mut segments = Vec::new();
        for component in relative.components() {
            segments.push(component.as_os_str().to_str()?.to_string());
        }
        let last = segments.pop()?;
        segments.push(last.strip_suffix(".json")?.to_string());
        Some(segments.join("/"))
    }
}

impl ContentStore for FsContentStore {
    fn read(&self, key: &str) -> StoreResult<Option<Vec<u8>>> {
        let path = self.path_for(key)?;
        match fs::read(&path) {
            Ok(data) => Ok(Some(data)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn write(&self, key: &str, data: &[u8]) -> StoreResult<()> {
        let path = self.path_for(key)?;
        let parent = path.parent().unwrap_or(&self.root);
        fs::create_dir_all(parent)?;

        let mut tmp = NamedTempFile::new_in(parent)?;
        tmp.write_all(data)?;
        tmp.as_file().sync_all()?;
        tmp.persist(&path).map_err(|e| e.error)?;
        tracing::trace!(key, bytes = data.len(), "wrote document");
        Ok(())
    }

    fn exists(&self, key: &str) -> StoreResult<bool> {
        Ok(self.path_for(key)?.is_file())
    }

    fn delete(&self, key: &str) -> StoreResult<bool> {
        let path = self.path_for(key)?;
        match fs::remove_file(&path) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    fn list(&self, prefix: &str) -> StoreResult<Vec<String>> {
        if !self.root.exists() {
            return Ok(Vec::new());
        }
        let mut keys = Vec::new();
        for entry in WalkDir::new(&self.root).min_depth(1) {
            let entry = entry?;
            if !entry.file_type().is_file() {
                continue;
            }
            if entry.path().extension().and_then(|e| e.to_str()) != Some(EXTENSION) {
                continue;
            }
            match self.key_for(entry.path()) {
                Some(key) if key.starts_with(prefix) => keys.push(key),
                Some(_) => {}
                None => {
                    tracing::warn!("skipping unreadable file name {:?}", entry.path());
                }
            }
        }
        keys.sort();
        Ok(keys)
    }
}
