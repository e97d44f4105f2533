pub mod config;
pub mod detect;
pub mod merge;
pub mod models;
pub mod normalize;
pub mod progress;
pub mod safety;
pub mod scoring;
pub mod store;
pub mod strategy;
pub mod synthesize;
pub mod tagged;

pub use detect::detect_series;
pub use models::{DetectOptions, SeriesGroup, SeriesMatch, SeriesTrack, TrackRecord};
pub use normalize::normalize;
pub use scoring::similarity;
pub use store::load_snapshot;
pub use tagged::aggregate_tagged;
