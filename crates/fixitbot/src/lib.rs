pub mod chat;
pub mod config;
pub mod detector;
pub mod error;
pub mod estimator;
pub mod report;
pub mod telemetry;
pub mod upload;
pub mod workshops;
