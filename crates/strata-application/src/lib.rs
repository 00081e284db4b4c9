pub mod backtesting;
pub mod comparison;
pub mod experiments;
pub mod shared;
