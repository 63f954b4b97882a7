//! AquaWatch Core - Leak Detection Engine
//!
//! Library crate shared by the monitoring daemon (`src/main.rs`) and the
//! offline model trainer (`src/bin/train_model.rs`).

pub mod constants;
pub mod logic;
