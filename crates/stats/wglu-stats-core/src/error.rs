//! Error types for the stats overlay.
//!
//! Only construction can fail. The per-frame path (timing, ring updates,
//! rendering) has no error channel.

/// Failure reported by a [`GraphicsPipeline`](crate::pipeline::GraphicsPipeline)
/// implementation. The overlay never inspects or retries these.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum PipelineError {
    /// A shader stage failed to compile.
    #[error("Shader compile failed ({stage}): {log}")]
    Compile { stage: &'static str, log: String },

    /// The program failed to link.
    #[error("Program link failed: {log}")]
    Link { log: String },

    /// The backend could not allocate a GPU object.
    #[error("Failed to create {object}")]
    Allocation { object: &'static str },
}

impl PipelineError {
    pub fn compile(stage: &'static str, log: impl Into<String>) -> Self {
        Self::Compile {
            stage,
            log: log.into(),
        }
    }

    pub fn link(log: impl Into<String>) -> Self {
        Self::Link { log: log.into() }
    }
}

/// Errors surfaced while building a [`StatsOverlay`](crate::overlay::StatsOverlay).
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum StatsError {
    /// The configuration cannot describe a drawable graph.
    #[error("Invalid stats configuration: {reason}")]
    InvalidConfig { reason: String },

    /// Propagated from the graphics pipeline collaborator.
    #[error(transparent)]
    Pipeline(#[from] PipelineError),
}

impl StatsError {
    pub fn invalid_config(reason: impl Into<String>) -> Self {
        Self::InvalidConfig {
            reason: reason.into(),
        }
    }
}

/// Result alias used across the crate.
pub type Result<T> = core::result::Result<T, StatsError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pipeline_errors_convert_and_display() {
        let err: StatsError = PipelineError::compile("vertex", "0:1: syntax error").into();
        assert_eq!(
            err.to_string(),
            "Shader compile failed (vertex): 0:1: syntax error"
        );

        let err = StatsError::invalid_config("capacity must be at least 1");
        assert_eq!(
            err.to_string(),
            "Invalid stats configuration: capacity must be at least 1"
        );
    }
}
