//! Acceptance criteria combined by `AcceptanceChain`.
mod opponent_trend;
mod relative_best;
mod reservation_floor;
mod time_pressure;
mod utility_threshold;

pub use opponent_trend::OpponentTrend;
pub use relative_best::RelativeBest;
pub use reservation_floor::ReservationFloor;
pub use time_pressure::TimePressure;
pub use utility_threshold::UtilityThreshold;

pub mod config {
    pub use super::opponent_trend::Config as OpponentTrendConfig;
    pub use super::relative_best::Config as RelativeBestConfig;
    pub use super::time_pressure::Config as TimePressureConfig;
    pub use super::utility_threshold::Config as UtilityThresholdConfig;
}
