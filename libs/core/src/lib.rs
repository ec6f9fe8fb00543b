//! Runtime support shared by lodestone crates.

pub mod telemetry;
