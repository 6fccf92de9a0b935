//! Domain types and shared utilities for the framegate screening pipeline.
//!
//! This crate has no internal dependencies. Everything here is either a
//! plain type, a pure function, or a thin wrapper over an external binary
//! (`ffmpeg`/`ffprobe`).

pub mod detection;
pub mod ffmpeg;
pub mod hashing;
pub mod naming;
pub mod report;
pub mod rubric;
pub mod types;
