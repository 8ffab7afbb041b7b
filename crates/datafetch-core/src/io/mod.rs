//! Reader wrappers used between the network body and the extractor.

pub mod cancel;
pub mod counting;

pub use cancel::CancelToken;
pub use cancel::CancellableReader;
pub use counting::CountingReader;
