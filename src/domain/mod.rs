//! Domain layer: models and ports, free of I/O and framework code.

pub mod models;
pub mod ports;
