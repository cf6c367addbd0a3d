pub mod analytics;
pub mod audits;
pub mod config;
pub mod error;
pub mod imports;
pub mod telemetry;
