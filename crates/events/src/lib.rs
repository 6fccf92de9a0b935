//! Wire protocol for incremental job progress.
//!
//! Events travel as newline-delimited JSON: one [`ProgressEvent`] per
//! line, written by [`writer`] on the producing side and reassembled by
//! [`parser`] on the consuming side. The protocol is append-only; a
//! `complete` or `error` event terminates the stream.

pub mod parser;
pub mod protocol;
pub mod writer;

pub use parser::EventParser;
pub use protocol::ProgressEvent;
pub use writer::{ChannelSink, EventSink, StreamWriteError, WriterSink};
