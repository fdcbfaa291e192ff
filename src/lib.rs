//! # BIOPAC to Lab Streaming Layer bridge
//!
//! Acquires samples from a BIOPAC MP unit through the vendor `mpdev` driver
//! and republishes each one on a Lab Streaming Layer outlet, until the
//! operator presses Q.
//!
//! ## Crate Structure
//!
//! - **`hardware`**: The MP device binding. Loads the driver, runs the fixed
//!   connect/configure/start sequence, polls samples and shuts down. Includes
//!   a mock driver for tests and simulation.
//! - **`sink`**: The `SampleSink` trait, stream metadata and the LSL outlet
//!   (feature `lsl-support`).
//! - **`forwarder`**: The single-threaded poll-and-publish loop.
//! - **`operator`**: Non-blocking keyboard quit handling.
//! - **`config`**: TOML + environment configuration via `figment`.
//! - **`logging`**: `tracing` subscriber setup.
//! - **`error`**: The application-level `BridgeError`.
//! - **`app`**: Wires a full run together.

pub mod app;
pub mod config;
pub mod error;
pub mod forwarder;
pub mod hardware;
pub mod logging;
pub mod operator;
pub mod sample;
pub mod sink;

pub use error::{AppResult, BridgeError};
pub use sample::Sample;
