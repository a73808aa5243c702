//! Library crate for port-scan-rs exposing reusable modules.
pub mod config;
pub mod ports;
pub mod probe;
pub mod report;
pub mod resolve;
pub mod scanner;
pub mod services;
pub mod types;
