//! Academic progress and weekly scheduling engine.
//!
//! The `academics` modules are pure functions over plain data: callers load
//! evaluations or class blocks from storage, hand them to the engine and
//! render whatever comes back. `config`, `error` and `telemetry` carry the
//! service plumbing shared with the API crate.

pub mod academics;
pub mod config;
pub mod error;
pub mod telemetry;
