//! Content-addressed storage of rendered generated sources.
//!
//! Each source is stored at `<cache_dir>/gen/<key>.java`, prefixed by a
//! bincode header carrying magic bytes, a format version, the producing weft
//! version and a payload checksum. A header that does not check out makes the
//! read a miss.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use weft_common::ContentHash;

use crate::error::CacheError;

const ARTIFACT_MAGIC: [u8; 4] = *b"WEFT";

/// Bump on breaking changes to the header or payload layout.
const ARTIFACT_FORMAT_VERSION: u32 = 1;

const SOURCE_SUBDIR: &str = "gen";
const SOURCE_EXT: &str = "java";

/// Header prepended to every stored artifact.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct ArtifactHeader {
    magic: [u8; 4],
    format_version: u32,
    weft_version: String,
    checksum: ContentHash,
}

/// Store for rendered generated sources.
#[derive(Debug, Clone)]
pub struct ArtifactStore {
    dir: PathBuf,
    weft_version: String,
}

impl ArtifactStore {
    /// A store under `cache_dir` tagging artifacts with `weft_version`.
    pub fn new(cache_dir: &Path, weft_version: &str) -> Self {
        Self {
            dir: cache_dir.join(SOURCE_SUBDIR),
            weft_version: weft_version.to_string(),
        }
    }

    /// The file path of the artifact with `key`.
    pub fn artifact_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.{SOURCE_EXT}"))
    }

    /// Writes `source` and returns its key, the hex content hash.
    pub fn write_source(&self, source: &str) -> Result<String, CacheError> {
        std::fs::create_dir_all(&self.dir).map_err(|e| CacheError::Io {
            path: self.dir.clone(),
            source: e,
        })?;
        let data = source.as_bytes();
        let checksum = ContentHash::from_bytes(data);
        let key = checksum.to_string();
        let path = self.artifact_path(&key);

        let header = ArtifactHeader {
            magic: ARTIFACT_MAGIC,
            format_version: ARTIFACT_FORMAT_VERSION,
            weft_version: self.weft_version.clone(),
            checksum,
        };
        let header_bytes = bincode::serde::encode_to_vec(&header, bincode::config::standard())
            .map_err(|e| CacheError::Serialization {
                reason: e.to_string(),
            })?;

        // 4-byte little-endian header length, header, payload.
        let mut output = Vec::with_capacity(4 + header_bytes.len() + data.len());
        output.extend_from_slice(&(header_bytes.len() as u32).to_le_bytes());
        output.extend_from_slice(&header_bytes);
        output.extend_from_slice(data);

        std::fs::write(&path, &output).map_err(|e| CacheError::Io { path, source: e })?;
        Ok(key)
    }

    /// Reads the source stored under `key`, or `None` if it is missing,
    /// corrupt, or written by another format or weft version.
    pub fn read_source(&self, key: &str) -> Option<String> {
        let raw = std::fs::read(self.artifact_path(key)).ok()?;
        let len_bytes: [u8; 4] = raw.get(..4)?.try_into().ok()?;
        let header_len = u32::from_le_bytes(len_bytes) as usize;
        let header_bytes = raw.get(4..4 + header_len)?;
        let (header, _): (ArtifactHeader, usize) =
            bincode::serde::decode_from_slice(header_bytes, bincode::config::standard()).ok()?;

        if header.magic != ARTIFACT_MAGIC
            || header.format_version != ARTIFACT_FORMAT_VERSION
            || header.weft_version != self.weft_version
        {
            return None;
        }
        let payload = &raw[4 + header_len..];
        if ContentHash::from_bytes(payload) != header.checksum {
            return None;
        }
        String::from_utf8(payload.to_vec()).ok()
    }

    /// Removes stored sources whose key is not in `live_keys`. Returns the
    /// number of files removed.
    pub fn gc(&self, live_keys: &HashSet<&str>) -> Result<usize, CacheError> {
        if !self.dir.exists() {
            return Ok(0);
        }
        let io = |path: &Path| {
            let path = path.to_path_buf();
            move |e: std::io::Error| CacheError::Io { path, source: e }
        };
        let mut removed = 0;
        for entry in std::fs::read_dir(&self.dir).map_err(io(&self.dir))? {
            let path = entry.map_err(io(&self.dir))?.path();
            if path.extension().and_then(|e| e.to_str()) != Some(SOURCE_EXT) {
                continue;
            }
            let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            if !live_keys.contains(stem) {
                std::fs::remove_file(&path).map_err(io(&path))?;
                removed += 1;
            }
        }
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SOURCE: &str = "package a;\n\npublic class B_ extends a.B {\n}\n";

    fn store() -> (tempfile::TempDir, ArtifactStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = ArtifactStore::new(dir.path(), "0.1.0");
        (dir, store)
    }

    #[test]
    fn write_and_read_source() {
        let (_dir, store) = store();
        let key = store.write_source(SOURCE).unwrap();
        assert_eq!(key, ContentHash::from_bytes(SOURCE.as_bytes()).to_string());
        assert_eq!(store.read_source(&key).as_deref(), Some(SOURCE));
    }

    #[test]
    fn missing_source_is_miss() {
        let (_dir, store) = store();
        assert!(store.read_source("0123").is_none());
    }

    #[test]
    fn corrupted_payload_is_miss() {
        let (_dir, store) = store();
        let key = store.write_source(SOURCE).unwrap();
        let path = store.artifact_path(&key);
        let mut raw = std::fs::read(&path).unwrap();
        let last = raw.len() - 2;
        raw[last] ^= 0xFF;
        std::fs::write(&path, raw).unwrap();
        assert!(store.read_source(&key).is_none());
    }

    #[test]
    fn truncated_file_is_miss() {
        let (_dir, store) = store();
        let key = store.write_source(SOURCE).unwrap();
        std::fs::write(store.artifact_path(&key), [1u8, 0]).unwrap();
        assert!(store.read_source(&key).is_none());
    }

    #[test]
    fn other_version_is_miss() {
        let (dir, store) = store();
        let key = store.write_source(SOURCE).unwrap();
        let newer = ArtifactStore::new(dir.path(), "0.2.0");
        assert!(newer.read_source(&key).is_none());
    }

    #[test]
    fn gc_removes_unreferenced() {
        let (_dir, store) = store();
        let keep = store.write_source(SOURCE).unwrap();
        let drop = store.write_source("class Other {}").unwrap();
        let live: HashSet<&str> = [keep.as_str()].into();
        assert_eq!(store.gc(&live).unwrap(), 1);
        assert!(store.read_source(&keep).is_some());
        assert!(store.read_source(&drop).is_none());
    }

    #[test]
    fn gc_without_directory_is_noop() {
        let (_dir, store) = store();
        assert_eq!(store.gc(&HashSet::new()).unwrap(), 0);
    }
}
