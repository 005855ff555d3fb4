//! Model wrappers that bind executors to pre- and post-processing.

pub mod detection;
pub mod recognition;

pub use detection::CtpnDetector;
pub use recognition::CrnnRecognizer;
