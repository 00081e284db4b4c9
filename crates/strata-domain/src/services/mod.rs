pub mod metrics;
pub mod rolling;
pub mod series;
pub mod state;
pub mod strategy;
