// -- submodules
mod dds;
mod record;

pub use dds::{decode_dds, encode_dds};
pub use record::{
    ComparisonRecord, ImagePaths, Metric, SIMILARITY_FILE, read_similarity, round_similarity,
};

// -- external imports
use chrono::Local;
use image::RgbImage;
use serde::Deserialize;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, ErrorKind};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use strum::{Display, EnumString, VariantNames};

use crate::error::{AppError, Result};
use crate::inspect::Inspection;

/// `strftime` pattern appended to the folder prefix
pub const TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

// -- enums

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, EnumString, Display, VariantNames)]
#[strum(ascii_case_insensitive)]
/// Container used for the delta image
pub enum DeltaFormat {
    #[default]
    #[strum(serialize = "dds")]
    Dds,

    #[strum(serialize = "png")]
    Png,
}

impl DeltaFormat {
    pub fn file_name(&self) -> String {
        format!("delta.{}", self)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, EnumString, Display, VariantNames)]
#[strum(ascii_case_insensitive)]
/// What to do when the timestamped folder already exists
pub enum CollisionPolicy {
    /// Append `_1`, `_2`, ... until a fresh folder can be created
    #[default]
    #[strum(serialize = "suffix")]
    Suffix,

    /// Reuse the existing folder, overwriting files of the same name
    #[strum(serialize = "merge")]
    Merge,
}

/// Custom deserializer with helpful error message
pub fn deserialize_variant<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: serde::Deserializer<'de>,
    T: FromStr + VariantNames,
{
    let value = String::deserialize(deserializer)?;
    T::from_str(&value).map_err(|_| {
        serde::de::Error::invalid_value(
            serde::de::Unexpected::Str(&value),
            &format!("one of {}", T::VARIANTS.join(", ")).as_str(),
        )
    })
}

// -- config

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ObserveConfig {
    /// Root directory holding all observation folders
    pub output_folder: PathBuf,

    /// Prefix of each observation folder name
    pub comparison_name: String,

    /// Container used for the delta image
    #[serde(default, deserialize_with = "deserialize_variant")]
    pub delta_format: DeltaFormat,

    /// Behavior when two comparisons land in the same second
    #[serde(default, deserialize_with = "deserialize_variant")]
    pub collision: CollisionPolicy,
}

impl Default for ObserveConfig {
    fn default() -> Self {
        Self {
            output_folder: PathBuf::from("observations"),
            comparison_name: "comparison_".to_string(),
            delta_format: DeltaFormat::default(),
            collision: CollisionPolicy::default(),
        }
    }
}

// -- saver

/// Persists one comparison into its own observation folder.
#[derive(Debug, Clone, Default)]
pub struct ObservationSaver {
    config: ObserveConfig,
}

impl ObservationSaver {
    pub fn new(config: ObserveConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ObserveConfig {
        &self.config
    }

    /// Save both originals, the delta image and the similarity record into a
    /// folder named after the current local time.
    ///
    /// Returns the folder path. A failure part way through leaves whatever was
    /// already written in place.
    pub fn save(
        &self,
        inspection: &Inspection,
        image1_path: &Path,
        image2_path: &Path,
    ) -> Result<PathBuf> {
        let timestamp = Local::now().format(TIMESTAMP_FORMAT).to_string();
        self.save_with_timestamp(inspection, image1_path, image2_path, &timestamp)
    }

    pub fn save_with_timestamp(
        &self,
        inspection: &Inspection,
        image1_path: &Path,
        image2_path: &Path,
        timestamp: &str,
    ) -> Result<PathBuf> {
        let comparison_folder = self.create_comparison_folder(timestamp)?;

        let image1_save_path = comparison_folder.join(base_name(image1_path)?);
        let image2_save_path = comparison_folder.join(base_name(image2_path)?);
        let delta_save_path = comparison_folder.join(self.config.delta_format.file_name());
        let similarity_path = comparison_folder.join(SIMILARITY_FILE);

        inspection
            .image1
            .save(&image1_save_path)
            .map_err(|e| AppError::ImageSave(format!("{:?}: {}", image1_save_path, e)))?;
        inspection
            .image2
            .save(&image2_save_path)
            .map_err(|e| AppError::ImageSave(format!("{:?}: {}", image2_save_path, e)))?;
        self.save_delta(&inspection.delta, &delta_save_path)?;

        let record = ComparisonRecord::new(
            inspection.similarity,
            image1_save_path,
            image2_save_path,
            delta_save_path,
        );
        record.write(&similarity_path)?;

        tracing::info!("Observation saved to {:?}", comparison_folder);
        Ok(comparison_folder)
    }

    fn save_delta(&self, delta: &RgbImage, path: &Path) -> Result<()> {
        match self.config.delta_format {
            DeltaFormat::Dds => encode_dds(delta, BufWriter::new(File::create(path)?)),
            DeltaFormat::Png => delta
                .save(path)
                .map_err(|e| AppError::ImageSave(format!("{:?}: {}", path, e))),
        }
    }

    /// Create `<output_folder>/<comparison_name><timestamp>`, resolving name
    /// clashes according to the collision policy.
    fn create_comparison_folder(&self, timestamp: &str) -> Result<PathBuf> {
        let root = &self.config.output_folder;
        fs::create_dir_all(root)?;

        let base = format!("{}{}", self.config.comparison_name, timestamp);
        if self.config.collision == CollisionPolicy::Merge {
            let folder = root.join(&base);
            fs::create_dir_all(&folder)?;
            return Ok(folder);
        }

        let mut attempt = 0usize;
        loop {
            let name = match attempt {
                0 => base.clone(),
                n => format!("{}_{}", base, n),
            };
            let folder = root.join(name);
            match fs::create_dir(&folder) {
                Ok(()) => return Ok(folder),
                Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                    tracing::warn!("Observation folder {:?} already exists", folder);
                    attempt += 1;
                }
                Err(e) => return Err(e.into()),
            }
        }
    }
}

fn base_name(path: &Path) -> Result<&std::ffi::OsStr> {
    path.file_name()
        .ok_or_else(|| AppError::ImageSave(format!("{:?} has no file name", path)))
}

/// Open a saved delta image, whichever container it was written in.
pub fn load_delta(path: &Path) -> Result<RgbImage> {
    let is_dds = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("dds"));
    if is_dds {
        return decode_dds(BufReader::new(File::open(path)?));
    }
    image::open(path)
        .map(|img| img.to_rgb8())
        .map_err(|e| AppError::ImageLoad(format!("{:?}: {}", path, e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{DynamicImage, Rgb};
    use tempfile::TempDir;

    fn inspection() -> Inspection {
        let image1 = RgbImage::from_pixel(10, 8, Rgb([10, 20, 30]));
        let image2 = RgbImage::from_pixel(9, 8, Rgb([12, 20, 30]));
        Inspection {
            similarity: 0.123_456,
            image1: DynamicImage::ImageRgb8(image1),
            image2: DynamicImage::ImageRgb8(image2),
            delta: RgbImage::from_pixel(9, 8, Rgb([2, 0, 0])),
        }
    }

    fn saver(root: &Path, collision: CollisionPolicy) -> ObservationSaver {
        ObservationSaver::new(ObserveConfig {
            output_folder: root.join("observations"),
            collision,
            ..Default::default()
        })
    }

    #[test]
    fn test_default_config() {
        let config = ObserveConfig::default();
        assert_eq!(config.output_folder, PathBuf::from("observations"));
        assert_eq!(config.comparison_name, "comparison_");
        assert_eq!(config.delta_format, DeltaFormat::Dds);
        assert_eq!(config.delta_format.file_name(), "delta.dds");
        assert_eq!(config.collision, CollisionPolicy::Suffix);
    }

    #[test]
    fn test_save_writes_all_artifacts() {
        let temp_dir = TempDir::new().unwrap();
        let saver = saver(temp_dir.path(), CollisionPolicy::Suffix);

        let folder = saver
            .save_with_timestamp(
                &inspection(),
                Path::new("/somewhere/first.png"),
                Path::new("other/second.bmp"),
                "20240102_030405",
            )
            .unwrap();

        assert_eq!(
            folder,
            temp_dir.path().join("observations/comparison_20240102_030405")
        );
        assert!(folder.join("first.png").is_file());
        assert!(folder.join("second.bmp").is_file());
        assert!(folder.join("delta.dds").is_file());

        let record = ComparisonRecord::read(&folder.join(SIMILARITY_FILE)).unwrap();
        assert_eq!(record.metric.similarity, 0.1235);
        assert_eq!(record.images.image1, folder.join("first.png"));
        assert_eq!(record.images.image2, folder.join("second.bmp"));
        assert_eq!(record.images.delta, folder.join("delta.dds"));

        let delta = load_delta(&record.images.delta).unwrap();
        assert_eq!(delta, inspection().delta);
    }

    #[test]
    fn test_save_uses_timestamped_name() {
        let temp_dir = TempDir::new().unwrap();
        let folder = saver(temp_dir.path(), CollisionPolicy::Suffix)
            .save(&inspection(), Path::new("a.png"), Path::new("b.png"))
            .unwrap();

        let name = folder.file_name().unwrap().to_string_lossy().into_owned();
        let stamp = name.strip_prefix("comparison_").unwrap();
        assert!(chrono::NaiveDateTime::parse_from_str(stamp, TIMESTAMP_FORMAT).is_ok());
    }

    #[test]
    fn test_same_second_gets_suffix() {
        let temp_dir = TempDir::new().unwrap();
        let saver = saver(temp_dir.path(), CollisionPolicy::Suffix);
        let paths = (Path::new("a.png"), Path::new("b.png"));

        let first = saver
            .save_with_timestamp(&inspection(), paths.0, paths.1, "20240101_000000")
            .unwrap();
        let second = saver
            .save_with_timestamp(&inspection(), paths.0, paths.1, "20240101_000000")
            .unwrap();

        assert_ne!(first, second);
        assert!(second.ends_with("comparison_20240101_000000_1"));
        assert!(first.join(SIMILARITY_FILE).is_file());
        assert!(second.join(SIMILARITY_FILE).is_file());
    }

    #[test]
    fn test_merge_policy_reuses_folder() {
        let temp_dir = TempDir::new().unwrap();
        let saver = saver(temp_dir.path(), CollisionPolicy::Merge);

        let first = saver
            .save_with_timestamp(&inspection(), Path::new("a.png"), Path::new("b.png"), "20240101_000000")
            .unwrap();
        let second = saver
            .save_with_timestamp(&inspection(), Path::new("c.png"), Path::new("d.png"), "20240101_000000")
            .unwrap();

        assert_eq!(first, second);
        assert!(first.join("a.png").is_file());
        assert!(first.join("c.png").is_file());
    }

    #[test]
    fn test_png_delta_format() {
        let temp_dir = TempDir::new().unwrap();
        let saver = ObservationSaver::new(ObserveConfig {
            output_folder: temp_dir.path().to_path_buf(),
            delta_format: DeltaFormat::Png,
            ..Default::default()
        });

        let folder = saver
            .save_with_timestamp(&inspection(), Path::new("a.png"), Path::new("b.png"), "x")
            .unwrap();
        let delta = load_delta(&folder.join("delta.png")).unwrap();
        assert_eq!(delta.dimensions(), (9, 8));
    }

    #[test]
    fn test_unsupported_extension_fails() {
        let temp_dir = TempDir::new().unwrap();
        let result = saver(temp_dir.path(), CollisionPolicy::Suffix).save_with_timestamp(
            &inspection(),
            Path::new("a.unknown"),
            Path::new("b.png"),
            "20240101_000000",
        );
        assert!(matches!(result, Err(AppError::ImageSave(_))));
    }

    #[test]
    fn test_variant_parsing() {
        assert_eq!(DeltaFormat::from_str("PNG").unwrap(), DeltaFormat::Png);
        assert_eq!(CollisionPolicy::from_str("merge").unwrap(), CollisionPolicy::Merge);
        assert!(DeltaFormat::from_str("tiff").is_err());
    }
}
