//! FlowTrack ingest - wearable CSV ingestion and daily insight reconciliation
//!
//! The import path turns loosely structured wearable exports into one merged
//! snapshot per day: CSV tokenization → column resolution → date/duration
//! normalization → per-source extraction → snapshot merging. The insights
//! path joins stored snapshots with manual physio logs and session ratings,
//! one row per day, manual entries taking precedence.
//!
//! Both paths are pure and synchronous; storage is reached only through the
//! [`store::SnapshotStore`] trait.

pub mod adapters;
pub mod columns;
pub mod error;
pub mod fallback;
pub mod insights;
pub mod merge;
pub mod normalizer;
pub mod pipeline;
pub mod store;
pub mod tokenizer;
pub mod types;

pub use adapters::{inspect_csv, CsvSource, SourceExtractor, SourceReport};
pub use error::IngestError;
pub use insights::{InsightFilter, InsightsReconciler, DEFAULT_WINDOW_DAYS};
pub use merge::SnapshotMerger;
pub use pipeline::{
    build_daily_snapshots, daily_insights, daily_insights_at, daily_insights_from_store,
    import_garmin, ImportFiles, ImportSummary,
};
pub use store::{MemoryStore, SnapshotStore};
pub use types::{DailyInsightRow, DailySnapshot, ExternalSnapshot, PhysioLog, SessionRating};

/// Crate version embedded in CLI output
pub const INGEST_VERSION: &str = env!("CARGO_PKG_VERSION");
