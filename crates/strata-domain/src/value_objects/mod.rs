pub mod bar;
pub mod config;
pub mod snapshot;
pub mod summary;
