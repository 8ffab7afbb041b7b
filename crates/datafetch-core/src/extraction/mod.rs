//! Streaming archive extraction.

mod common;
mod stream;

pub use stream::ArchiveStreamExtractor;
