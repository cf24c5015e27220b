use shadowpatch_schema::shadow::SchemaId;
use thiserror::Error as ThisError;

///
/// MergeError
///
/// Structured failures raised while applying a shadow instance. These
/// only occur when the instance does not match its schema; a reader-built
/// instance never triggers them.
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum MergeError {
    #[error("invalid shadow shape: expected {expected}, found {actual}")]
    InvalidShape {
        expected: &'static str,
        actual: &'static str,
    },

    #[error("shadow instance belongs to schema {actual}, expected {expected}")]
    SchemaMismatch { expected: SchemaId, actual: SchemaId },

    #[error("shadow instance has {actual} slots, schema declares {expected}")]
    CardinalityViolation { expected: usize, actual: usize },

    #[error("target is a '{actual}', schema is for '{expected}'")]
    TargetMismatch { expected: String, actual: String },

    #[error("schema {id} is not in the schema set")]
    MissingSchema { id: SchemaId },

    #[error("merge failed at {path}: {source}")]
    Context {
        path: String,
        #[source]
        source: Box<Self>,
    },
}

impl MergeError {
    /// Prepend a field segment to the merge error path.
    #[must_use]
    pub fn with_field(self, field: impl AsRef<str>) -> Self {
        self.with_path_segment(field.as_ref())
    }

    /// Prepend an index segment to the merge error path.
    #[must_use]
    pub fn with_index(self, index: usize) -> Self {
        self.with_path_segment(format!("[{index}]"))
    }

    /// Return the full contextual path, if available.
    #[must_use]
    pub const fn path(&self) -> Option<&str> {
        match self {
            Self::Context { path, .. } => Some(path.as_str()),
            _ => None,
        }
    }

    /// Return the innermost, non-context variant.
    #[must_use]
    pub fn leaf(&self) -> &Self {
        match self {
            Self::Context { source, .. } => source.leaf(),
            _ => self,
        }
    }

    fn with_path_segment(self, segment: impl Into<String>) -> Self {
        let segment = segment.into();
        match self {
            Self::Context { path, source } => Self::Context {
                path: Self::join_segments(&segment, &path),
                source,
            },
            source => Self::Context {
                path: segment,
                source: Box::new(source),
            },
        }
    }

    fn join_segments(prefix: &str, suffix: &str) -> String {
        if suffix.starts_with('[') {
            format!("{prefix}{suffix}")
        } else {
            format!("{prefix}.{suffix}")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn context_path_accumulates_outermost_first() {
        let err = MergeError::InvalidShape {
            expected: "object",
            actual: "value",
        }
        .with_field("num")
        .with_index(1)
        .with_field("kids");

        assert_eq!(err.path(), Some("kids[1].num"));
        assert!(matches!(err.leaf(), MergeError::InvalidShape { .. }));
    }
}
