pub mod forecast;
pub mod routine;
pub mod stats;

pub use forecast::{
    ForecastConfig, ForecastError, ForecastInput, ForecastResult, Forecaster, Outlook,
    OutlookThresholds, RoutineStats, TrajectoryPoint,
};
pub use routine::{FilterBand, RoutineFilter, RoutineFilterConfig, RoutineSet};
