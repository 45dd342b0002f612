mod aggregate;
mod compare;
mod error;
mod inspect;
mod logging;
mod observe;
mod progress_bar;
mod toml_utils;

pub use aggregate::{AggregateSummary, copy_dir_merge, filter_observations};
pub use error::{AppError, Result};
pub use inspect::{
    ImageInspector, Inspection, absolute_difference, common_size, format_images, load_image,
};
pub use logging::init_logger;
pub use observe::{
    CollisionPolicy, ComparisonRecord, DeltaFormat, ImagePaths, Metric, ObservationSaver,
    ObserveConfig, SIMILARITY_FILE, TIMESTAMP_FORMAT, decode_dds, encode_dds, load_delta,
    read_similarity, round_similarity,
};
pub use progress_bar::progress_bar_style;
pub use toml_utils::parse_toml;

// Similarity metric
pub use inspect::structural_similarity;

// Core comparison function
pub use compare::{CompareArgs, ComparisonOutcome, run_comparison};
