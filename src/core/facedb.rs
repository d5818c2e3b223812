//! Known-face database
//!
//! On disk: `{"encodings": [[f32, ...], ...], "names": ["alice", ...]}`,
//! the i-th encoding belongs to the i-th name. A missing file is an empty
//! database. Reload swaps the whole table at once.

use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::core::ports::{FaceEncoder, FaceIdentifier};
use crate::error::{Result, SentryError};
use crate::types::{BBox, Frame};
use crate::UNKNOWN_NAME;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FaceRecords {
    pub encodings: Vec<Vec<f32>>,
    pub names: Vec<String>,
}

impl FaceRecords {
    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

#[derive(Debug)]
pub struct FaceDatabase {
    path: PathBuf,
    records: RwLock<FaceRecords>,
}

impl FaceDatabase {
    /// Open and load `path`
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let records = read_records(&path)?;
        info!(faces = records.len(), path = %path.display(), "👤 face database loaded");
        Ok(Self {
            path,
            records: RwLock::new(records),
        })
    }

    /// In-memory database, never backed by a file
    pub fn from_records(records: FaceRecords) -> Self {
        Self {
            path: PathBuf::new(),
            records: RwLock::new(records),
        }
    }

    /// Re-read the file; on error the current table stays in place.
    /// Returns the number of known faces.
    pub fn reload(&self) -> Result<usize> {
        let fresh = read_records(&self.path)?;
        let count = fresh.len();
        *self
            .records
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = fresh;
        info!(faces = count, "👤 face database reloaded");
        Ok(count)
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    pub fn names(&self) -> Vec<String> {
        self.read().names.clone()
    }

    /// Name of the first known encoding within `tolerance` (Euclidean)
    pub fn match_encoding(&self, encoding: &[f32], tolerance: f32) -> Option<String> {
        let records = self.read();
        records
            .encodings
            .iter()
            .zip(&records.names)
            .find(|(known, _)| {
                known.len() == encoding.len() && euclidean(known, encoding) <= tolerance
            })
            .map(|(_, name)| name.clone())
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, FaceRecords> {
        self.records
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

fn read_records(path: &Path) -> Result<FaceRecords> {
    if path.as_os_str().is_empty() || !path.exists() {
        return Ok(FaceRecords::default());
    }
    let json = std::fs::read_to_string(path)?;
    let records: FaceRecords = serde_json::from_str(&json)?;
    if records.encodings.len() != records.names.len() {
        return Err(SentryError::Config(format!(
            "{}: {} encodings for {} names",
            path.display(),
            records.encodings.len(),
            records.names.len()
        )));
    }
    Ok(records)
}

fn euclidean(a: &[f32], b: &[f32]) -> f32 {
    a.iter()
        .zip(b)
        .map(|(x, y)| (x - y) * (x - y))
        .sum::<f32>()
        .sqrt()
}

/// Face identifier that encodes the crop and looks it up in the database
pub struct DatabaseFaceIdentifier<E> {
    encoder: E,
    database: Arc<FaceDatabase>,
    tolerance: f32,
}

impl<E: FaceEncoder> DatabaseFaceIdentifier<E> {
    pub fn new(encoder: E, database: Arc<FaceDatabase>, tolerance: f32) -> Self {
        Self {
            encoder,
            database,
            tolerance,
        }
    }

    /// `RecognitionNoOp` when there is nothing to recognise
    pub fn try_identify(&self, frame: &Frame, region: &BBox) -> Result<String> {
        if frame.is_empty() || self.database.is_empty() {
            return Err(SentryError::RecognitionNoOp);
        }
        let encoding = self
            .encoder
            .encode(frame, region)
            .ok_or(SentryError::RecognitionNoOp)?;
        Ok(self
            .database
            .match_encoding(&encoding, self.tolerance)
            .unwrap_or_else(|| UNKNOWN_NAME.to_string()))
    }
}

impl<E: FaceEncoder> FaceIdentifier for DatabaseFaceIdentifier<E> {
    fn identify(&self, frame: &Frame, region: &BBox) -> String {
        self.try_identify(frame, region).unwrap_or_else(|e| {
            debug!(error = %e, "face not recognised");
            UNKNOWN_NAME.to_string()
        })
    }
}
