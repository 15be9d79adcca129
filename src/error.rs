//! Error taxonomy for the generation pipeline.
//!
//! Hand-rolled `Display`/`std::error::Error` impls rather than a `thiserror`
//! derive, matching `multiscale/export.rs::ExportError` and
//! `lore/llm.rs::LlmError` in the teacher: this crate's dependency tree never
//! needed that macro either.

use std::fmt;
use std::path::PathBuf;

/// The five failure kinds from the specification's error taxonomy. Every
/// stage other than config validation, capacity checks, and the road
/// planner is infallible: it clamps or degrades instead of raising.
#[derive(Debug)]
pub enum GenError {
    /// Contradictory, out-of-range, or missing configuration, caught once at
    /// the pipeline boundary before anything is allocated.
    ConfigInvalid { field: String, message: String },
    /// A stage could not produce a valid result (the road planner exhausting
    /// detours, a ramp strip that doesn't fit within map bounds).
    GenerationFailure { stage: &'static str, message: String },
    /// Configured dimensions exceed the implementation's allocation budget.
    CapacityExceeded { requested_cells: u64, max_cells: u64 },
    /// An export write failed. The export stage cleans up any partial files
    /// before this is returned.
    IoFailure { path: PathBuf, source: std::io::Error },
    /// The caller's cancel token was tripped.
    Cancelled,
}

impl fmt::Display for GenError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GenError::ConfigInvalid { field, message } => {
                write!(f, "invalid config field `{}`: {}", field, message)
            }
            GenError::GenerationFailure { stage, message } => {
                write!(f, "generation failed in stage `{}`: {}", stage, message)
            }
            GenError::CapacityExceeded { requested_cells, max_cells } => write!(
                f,
                "requested grid of {} cells exceeds the {} cell allocation budget",
                requested_cells, max_cells
            ),
            GenError::IoFailure { path, source } => {
                write!(f, "failed to write {}: {}", path.display(), source)
            }
            GenError::Cancelled => write!(f, "generation was cancelled"),
        }
    }
}

impl std::error::Error for GenError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            GenError::IoFailure { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl GenError {
    pub fn config(field: impl Into<String>, message: impl Into<String>) -> Self {
        GenError::ConfigInvalid { field: field.into(), message: message.into() }
    }

    pub fn generation(stage: &'static str, message: impl Into<String>) -> Self {
        GenError::GenerationFailure { stage, message: message.into() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_field_path() {
        let e = GenError::config("map.width", "must be a positive multiple of cell_size");
        assert!(e.to_string().contains("map.width"));
    }

    #[test]
    fn io_failure_chains_source() {
        use std::error::Error;
        let io = std::io::Error::new(std::io::ErrorKind::Other, "disk full");
        let e = GenError::IoFailure { path: PathBuf::from("heightmap.png"), source: io };
        assert!(e.source().is_some());
    }
}
