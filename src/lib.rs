#![cfg_attr(not(test), no_std)]

pub mod config;
pub mod control;
pub mod delivery;
pub mod drivers;
pub mod error;
pub mod heartbeat;
pub mod link;
pub mod logging;
pub mod pipeline;
pub mod signal;
pub mod telemetry;

#[cfg(feature = "firmware")]
pub mod board;
#[cfg(feature = "firmware")]
pub mod ipc;
#[cfg(feature = "firmware")]
pub mod tasks;

#[cfg(test)]
mod testing;

#[cfg(feature = "firmware")]
pub use board::Board;
pub use pipeline::{Pipeline, PipelineStats, StepOutcome};
pub use telemetry::{encode, WireFrame};
