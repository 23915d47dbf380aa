pub mod config;
pub mod error;
pub mod exchange;
pub mod model;
pub mod share;
pub mod stats;
pub mod storage;
pub mod store;
pub mod task_api;
