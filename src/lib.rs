// Library interface for the fitness trend engine
// The binary and the integration tests both go through these modules

pub mod athlete;
pub mod config;
pub mod error;
pub mod export;
pub mod forecast;
pub mod format;
pub mod load;
pub mod logging;
pub mod models;
pub mod scoring;
pub mod stress;
pub mod table;
pub mod trend;
pub mod zones;

// Re-export commonly used types for convenience
pub use athlete::{AthleteSnapshotResolver, DatedAthleteSettings, DatedSettings};
pub use config::{AppConfig, TrendConfig};
pub use error::{PreconditionError, Result, TrendError};
pub use forecast::ForecastExtender;
pub use load::{LoadAccumulator, LoadConfig, LoadSeed};
pub use logging::{LogConfig, LogFormat, LogLevel};
pub use models::*;
pub use scoring::{ActivityStressScores, StressScoreCalculator};
pub use stress::{HeartRateImpulseMode, StressConfig, StressScoreAggregator, Vo2maxSamplePolicy};
pub use table::{FitnessTrendColumn, SortDirection};
pub use trend::{FitnessTrend, FitnessTrendAssembler, GraphPoint, TrendSeries};
pub use zones::{TrainingZone, ZoneBaseLine, ZoneBoundaries};
