//! Core error types for the OCR pipeline.
//!
//! Configuration problems are fatal at construction time; executor failures
//! are surfaced per image; degenerate geometry and empty decodes are not
//! errors at all and never appear here (they are `None`/empty-result skips).

use thiserror::Error;

/// Enum identifying which stage of the pipeline an error occurred in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessingStage {
    /// Error occurred while preparing an input tensor.
    TensorPreparation,
    /// Error occurred while post-processing detection outputs.
    DetectionPostprocess,
    /// Error occurred while decoding recognition outputs.
    Decoding,
    /// Error occurred while orchestrating the pipeline.
    Pipeline,
}

impl std::fmt::Display for ProcessingStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProcessingStage::TensorPreparation => write!(f, "tensor preparation"),
            ProcessingStage::DetectionPostprocess => write!(f, "detection post-processing"),
            ProcessingStage::Decoding => write!(f, "sequence decoding"),
            ProcessingStage::Pipeline => write!(f, "pipeline execution"),
        }
    }
}

/// Errors that can occur in the OCR pipeline.
#[derive(Debug, Error)]
pub enum OcrError {
    /// Invalid or inconsistent configuration. Fatal at startup, never
    /// produced mid-run.
    #[error("configuration: {message}")]
    Config {
        /// A message describing the configuration problem.
        message: String,
    },

    /// An executor call failed or returned tensors that do not match the
    /// pipeline's contract.
    #[error("inference failed in model '{model}': {context}")]
    Inference {
        /// Name of the model whose executor failed.
        model: String,
        /// Additional context about the failure.
        context: String,
        /// The underlying error reported by the executor, if any.
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// A processing stage failed on otherwise well-formed input.
    #[error("{stage} failed: {context}")]
    Processing {
        /// The stage in which the error occurred.
        stage: ProcessingStage,
        /// Additional context about the error.
        context: String,
    },

    /// The caller handed the pipeline structurally invalid input.
    #[error("invalid input: {message}")]
    InvalidInput {
        /// A message describing the invalid input.
        message: String,
    },

    /// IO error (alphabet loading).
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
}

impl OcrError {
    /// Creates a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Creates a configuration error for an invalid field value.
    pub fn invalid_field(
        field: impl Into<String>,
        expected: impl Into<String>,
        actual: impl std::fmt::Display,
    ) -> Self {
        Self::Config {
            message: format!(
                "invalid value for field '{}': expected {}, got {}",
                field.into(),
                expected.into(),
                actual
            ),
        }
    }

    /// Wraps an error reported by an executor.
    pub fn inference(
        model: impl Into<String>,
        context: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Inference {
            model: model.into(),
            context: context.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Flags an executor output that violates the pipeline's tensor contract.
    pub fn malformed_output(model: impl Into<String>, context: impl Into<String>) -> Self {
        Self::Inference {
            model: model.into(),
            context: context.into(),
            source: None,
        }
    }

    /// Creates an invalid-input error.
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
        }
    }

    /// Creates a processing error for the given stage.
    pub fn processing(stage: ProcessingStage, context: impl Into<String>) -> Self {
        Self::Processing {
            stage,
            context: context.into(),
        }
    }
}
