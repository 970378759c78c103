//! Persistence layer for the debate document index.
//!
//! Snapshots hold every stored document together with its embedding so a
//! restart does not need to re-fetch or re-embed anything.

use crate::error::{AppError, Result};
use crate::ingestion::DebateDocument;
use ndarray::Array2;
use sha2::{Digest, Sha256};
use std::fs::{self, File};
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::path::Path;

/// Snapshot file format version. Increment when format changes.
const SNAPSHOT_VERSION: u32 = 1;

/// Magic bytes to identify valid snapshot files.
const SNAPSHOT_MAGIC: &[u8; 8] = b"GOVDATA\0";

fn store_err(context: &str, e: impl std::fmt::Display) -> AppError {
    AppError::Store(format!("{context}: {e}"))
}

/// Stored documents and their embeddings, row `i` belonging to document `i`.
#[derive(Debug, Clone, PartialEq)]
pub struct StoreSnapshot {
    pub documents: Vec<DebateDocument>,
    pub embeddings: Array2<f32>,
}

impl StoreSnapshot {
    pub fn new(documents: Vec<DebateDocument>, embeddings: Array2<f32>) -> Result<Self> {
        if documents.len() != embeddings.nrows() {
            return Err(AppError::Store(format!(
                "{} documents but {} embedding rows",
                documents.len(),
                embeddings.nrows()
            )));
        }
        Ok(Self {
            documents,
            embeddings,
        })
    }

    pub fn embedding_dim(&self) -> usize {
        self.embeddings.ncols()
    }

    /// SHA-256 over the serialized documents and the raw embedding bytes.
    fn checksum(payload: &[u8], embeddings: &[f32]) -> [u8; 32] {
        let mut hasher = Sha256::new();
        hasher.update(payload);
        for val in embeddings {
            hasher.update(val.to_le_bytes());
        }
        hasher.finalize().into()
    }

    /// Save snapshot to a binary file.
    ///
    /// File format:
    /// - 8 bytes: magic "GOVDATA\0"
    /// - 4 bytes: version (u32 LE)
    /// - 32 bytes: checksum
    /// - 8 bytes: num_documents (u64 LE)
    /// - 8 bytes: embedding_dim (u64 LE)
    /// - 8 bytes: payload length (u64 LE)
    /// - N bytes: documents as JSON
    /// - M bytes: embeddings (f32 LE, row-major)
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| store_err("Failed to create snapshot directory", e))?;
        }

        let payload = serde_json::to_vec(&self.documents)
            .map_err(|e| store_err("Failed to serialize documents", e))?;
        let data = self
            .embeddings
            .as_slice()
            .ok_or_else(|| AppError::Store("Embeddings array not contiguous".to_string()))?;
        let checksum = Self::checksum(&payload, data);

        // Write to a sibling file first so a crash never leaves a torn snapshot.
        let tmp_path = path.with_extension("tmp");
        let file =
            File::create(&tmp_path).map_err(|e| store_err("Failed to create snapshot file", e))?;
        let mut writer = BufWriter::new(file);

        let write = |writer: &mut BufWriter<File>, bytes: &[u8]| {
            writer
                .write_all(bytes)
                .map_err(|e| store_err("Failed to write snapshot", e))
        };

        write(&mut writer, SNAPSHOT_MAGIC)?;
        write(&mut writer, &SNAPSHOT_VERSION.to_le_bytes())?;
        write(&mut writer, &checksum)?;
        write(&mut writer, &(self.documents.len() as u64).to_le_bytes())?;
        write(&mut writer, &(self.embedding_dim() as u64).to_le_bytes())?;
        write(&mut writer, &(payload.len() as u64).to_le_bytes())?;
        write(&mut writer, &payload)?;
        for &val in data {
            write(&mut writer, &val.to_le_bytes())?;
        }

        writer
            .flush()
            .map_err(|e| store_err("Failed to flush snapshot file", e))?;
        drop(writer);
        fs::rename(&tmp_path, path).map_err(|e| store_err("Failed to replace snapshot", e))?;

        tracing::info!(
            path = %path.display(),
            documents = self.documents.len(),
            embedding_dim = self.embedding_dim(),
            "Store snapshot saved"
        );

        Ok(())
    }

    /// Load snapshot from a binary file.
    ///
    /// Returns None if the file doesn't exist, is from another format version,
    /// is truncated, declares sizes that disagree with its length or fails its
    /// checksum.
    pub fn load(path: &Path) -> Result<Option<Self>> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "Snapshot file does not exist");
            return Ok(None);
        }

        let file = File::open(path).map_err(|e| store_err("Failed to open snapshot file", e))?;
        let file_len = file
            .metadata()
            .map_err(|e| store_err("Failed to stat snapshot file", e))?
            .len();
        let mut reader = BufReader::new(file);

        let mut magic = [0u8; 8];
        if reader.read_exact(&mut magic).is_err() || &magic != SNAPSHOT_MAGIC {
            tracing::warn!(path = %path.display(), "Invalid snapshot magic, ignoring");
            return Ok(None);
        }

        let header = match SnapshotHeader::read(&mut reader) {
            Ok(header) => header,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Truncated snapshot header, ignoring");
                return Ok(None);
            }
        };

        if header.version != SNAPSHOT_VERSION {
            tracing::warn!(
                path = %path.display(),
                snapshot_version = header.version,
                expected_version = SNAPSHOT_VERSION,
                "Snapshot version mismatch, ignoring"
            );
            return Ok(None);
        }

        let Some(float_count) = header.float_count() else {
            tracing::warn!(path = %path.display(), "Snapshot sizes overflow, ignoring");
            return Ok(None);
        };
        let expected_len = float_count
            .checked_mul(4)
            .and_then(|bytes| bytes.checked_add(header.payload_len))
            .and_then(|bytes| bytes.checked_add(HEADER_LEN));
        if expected_len != Some(file_len) {
            tracing::warn!(
                path = %path.display(),
                file_len,
                expected_len = ?expected_len,
                "Snapshot length disagrees with header, ignoring"
            );
            return Ok(None);
        }

        // Sizes are bounded by the file length from here on.
        let mut payload = vec![0u8; header.payload_len as usize];
        let mut raw = vec![0u8; float_count as usize * 4];
        if let Err(e) = reader
            .read_exact(&mut payload)
            .and_then(|_| reader.read_exact(&mut raw))
        {
            tracing::warn!(path = %path.display(), error = %e, "Truncated snapshot body, ignoring");
            return Ok(None);
        }
        let data: Vec<f32> = raw
            .chunks_exact(4)
            .map(|chunk| f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
            .collect();

        if Self::checksum(&payload, &data) != header.checksum {
            tracing::warn!(path = %path.display(), "Snapshot checksum mismatch, ignoring");
            return Ok(None);
        }

        let num_documents = header.num_documents as usize;
        let embedding_dim = header.embedding_dim as usize;
        let documents: Vec<DebateDocument> = serde_json::from_slice(&payload)
            .map_err(|e| store_err("Failed to decode snapshot documents", e))?;
        let embeddings = Array2::from_shape_vec((num_documents, embedding_dim), data)
            .map_err(|e| store_err("Failed to reshape embeddings", e))?;

        tracing::info!(
            path = %path.display(),
            documents = num_documents,
            embedding_dim,
            "Store snapshot loaded"
        );

        Self::new(documents, embeddings).map(Some)
    }
}

/// Magic, version, checksum and the three u64 size fields.
const HEADER_LEN: u64 = 8 + 4 + 32 + 8 + 8 + 8;

struct SnapshotHeader {
    version: u32,
    checksum: [u8; 32],
    num_documents: u64,
    embedding_dim: u64,
    payload_len: u64,
}

impl SnapshotHeader {
    /// Everything after the magic bytes, up to the payload.
    fn read(reader: &mut impl Read) -> io::Result<Self> {
        Ok(Self {
            version: u32::from_le_bytes(read_array(reader)?),
            checksum: read_array(reader)?,
            num_documents: u64::from_le_bytes(read_array(reader)?),
            embedding_dim: u64::from_le_bytes(read_array(reader)?),
            payload_len: u64::from_le_bytes(read_array(reader)?),
        })
    }

    fn float_count(&self) -> Option<u64> {
        self.num_documents.checked_mul(self.embedding_dim)
    }
}

fn read_array<const N: usize>(reader: &mut impl Read) -> io::Result<[u8; N]> {
    let mut bytes = [0u8; N];
    reader.read_exact(&mut bytes)?;
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Map};
    use tempfile::tempdir;

    fn make_document(id: &str, text: &str) -> DebateDocument {
        let mut metadata = Map::new();
        metadata.insert("House".into(), json!("Commons"));
        DebateDocument::new(id.to_string(), text.to_string(), metadata)
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("index/store.bin");

        let documents = vec![make_document("1-1", "first"), make_document("1-2", "second")];
        let embeddings =
            Array2::from_shape_vec((2, 4), vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0]).unwrap();

        let snapshot = StoreSnapshot::new(documents.clone(), embeddings.clone()).unwrap();
        snapshot.save(&path).unwrap();

        let loaded = StoreSnapshot::load(&path).unwrap().unwrap();
        assert_eq!(loaded.documents, documents);
        assert_eq!(loaded.embeddings, embeddings);
        assert_eq!(loaded.embedding_dim(), 4);
    }

    #[test]
    fn test_missing_file_is_a_miss() {
        let dir = tempdir().unwrap();
        assert!(StoreSnapshot::load(&dir.path().join("absent.bin"))
            .unwrap()
            .is_none());
    }

    #[test]
    fn test_corrupted_snapshot_is_ignored() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("store.bin");

        let embeddings = Array2::from_shape_vec((1, 2), vec![0.5, 0.5]).unwrap();
        StoreSnapshot::new(vec![make_document("1-1", "text")], embeddings)
            .unwrap()
            .save(&path)
            .unwrap();

        let mut bytes = fs::read(&path).unwrap();
        let last = bytes.len() - 1;
        bytes[last] ^= 0xFF;
        fs::write(&path, &bytes).unwrap();

        assert!(StoreSnapshot::load(&path).unwrap().is_none());

        fs::write(&path, b"NOTASNAPSHOT").unwrap();
        assert!(StoreSnapshot::load(&path).unwrap().is_none());
    }

    fn saved_snapshot(path: &Path) -> Vec<u8> {
        let embeddings = Array2::from_shape_vec((1, 2), vec![0.5, 0.5]).unwrap();
        StoreSnapshot::new(vec![make_document("1-1", "text")], embeddings)
            .unwrap()
            .save(path)
            .unwrap();
        fs::read(path).unwrap()
    }

    #[test]
    fn test_truncated_snapshot_is_ignored() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("store.bin");
        let bytes = saved_snapshot(&path);

        fs::write(&path, &bytes[..bytes.len() - 10]).unwrap();
        assert!(StoreSnapshot::load(&path).unwrap().is_none());

        // Cut inside the header.
        fs::write(&path, &bytes[..20]).unwrap();
        assert!(StoreSnapshot::load(&path).unwrap().is_none());
    }

    #[test]
    fn test_oversized_header_is_ignored_without_allocating() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("store.bin");
        let mut bytes = saved_snapshot(&path);

        // num_documents sits after magic, version and checksum.
        bytes[44..52].copy_from_slice(&u64::MAX.to_le_bytes());
        fs::write(&path, &bytes).unwrap();
        assert!(StoreSnapshot::load(&path).unwrap().is_none());

        let mut bytes = saved_snapshot(&path);
        // payload length
        bytes[60..68].copy_from_slice(&(1u64 << 60).to_le_bytes());
        fs::write(&path, &bytes).unwrap();
        assert!(StoreSnapshot::load(&path).unwrap().is_none());
    }

    #[test]
    fn test_row_count_must_match() {
        let embeddings = Array2::<f32>::zeros((2, 3));
        assert!(StoreSnapshot::new(vec![make_document("1-1", "x")], embeddings).is_err());
    }
}
