//! The core module of the OCR pipeline.
//!
//! This module contains the foundations shared by every stage:
//! - Error handling
//! - Configuration management
//! - The executor traits that abstract the inference backends
//! - Tensor aliases and conversions
//!
//! It also re-exports the commonly used types for convenience.

pub mod config;
pub mod errors;
pub mod executor;
pub mod tensor;

pub use config::{DetectionConfig, PipelineConfig, RecognitionConfig};
pub use errors::{OcrError, ProcessingStage};
pub use executor::{DetectionExecutor, DetectionRawOutput, RecognitionExecutor};
pub use tensor::{Tensor2D, Tensor3D, Tensor4D};
