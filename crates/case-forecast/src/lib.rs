//! Heuristic legal case outcome forecasting.
//!
//! A transparent rule engine scores a case against per-category base rates,
//! every scored case is appended to a durable prediction history, and
//! per-category statistics are derived on demand from that history.

pub mod config;
pub mod error;
pub mod forecast;
pub mod telemetry;
