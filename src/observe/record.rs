use serde::{Deserialize, Serialize};
use serde_json::ser::PrettyFormatter;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::error::Result;

/// Name of the record file inside every observation folder
pub const SIMILARITY_FILE: &str = "similarity.json";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Metric {
    pub similarity: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImagePaths {
    pub image1: PathBuf,
    pub image2: PathBuf,
    pub delta: PathBuf,
}

/// Machine-readable summary of one comparison.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonRecord {
    pub metric: Metric,
    pub images: ImagePaths,
}

impl ComparisonRecord {
    /// Build a record, rounding the similarity to 4 decimal digits.
    pub fn new(similarity: f64, image1: PathBuf, image2: PathBuf, delta: PathBuf) -> Self {
        Self {
            metric: Metric {
                similarity: round_similarity(similarity),
            },
            images: ImagePaths {
                image1,
                image2,
                delta,
            },
        }
    }

    /// Write as JSON with 4-space indentation.
    pub fn write(&self, path: &Path) -> Result<()> {
        let mut writer = BufWriter::new(File::create(path)?);
        let formatter = PrettyFormatter::with_indent(b"    ");
        let mut serializer = serde_json::Serializer::with_formatter(&mut writer, formatter);
        self.serialize(&mut serializer)?;
        writer.flush()?;
        Ok(())
    }

    pub fn read(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }
}

/// Round to 4 decimal digits, correctly rounded from the exact binary value.
pub fn round_similarity(similarity: f64) -> f64 {
    format!("{:.4}", similarity).parse().unwrap_or(similarity)
}

/// Read only `metric.similarity` from a record file.
///
/// A missing or non-numeric field, or a file that is not JSON at all, counts
/// as similarity 0. Read failures are still errors.
pub fn read_similarity(path: &Path) -> Result<f64> {
    let content = std::fs::read(path)?;
    let value: serde_json::Value = match serde_json::from_slice(&content) {
        Ok(v) => v,
        Err(e) => {
            tracing::warn!("Unreadable record {:?}, treating as 0: {}", path, e);
            return Ok(0.0);
        }
    };

    let similarity = value
        .get("metric")
        .and_then(|metric| metric.get("similarity"))
        .and_then(serde_json::Value::as_f64);
    if similarity.is_none() {
        tracing::debug!("No metric.similarity in {:?}, treating as 0", path);
    }
    Ok(similarity.unwrap_or(0.0))
}
