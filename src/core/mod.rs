// Core modules
pub mod metrics;
