//! Price data contract consumed by the engine.

pub mod series;

pub use series::{PriceSeries, SeriesError};
