use derive_more::Display;
use serde::{Deserialize, Serialize};
use shadowpatch_config::ConfigError;
use shadowpatch_core::{patch::MergeError, reader::DocumentError, registry::RegistryError};
use shadowpatch_schema::build::BuildError;
use thiserror::Error as ThisError;

///
/// Error
/// Public error type with a stable kind + origin taxonomy.
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize, ThisError)]
#[error("{message}")]
pub struct Error {
    pub kind: ErrorKind,
    pub origin: ErrorOrigin,
    pub message: String,
}

impl Error {
    pub fn new(kind: ErrorKind, origin: ErrorOrigin, message: impl Into<String>) -> Self {
        Self {
            kind,
            origin,
            message: message.into(),
        }
    }
}

impl From<BuildError> for Error {
    fn from(err: BuildError) -> Self {
        Self::new(ErrorKind::Schema, ErrorOrigin::Build, err.to_string())
    }
}

impl From<ConfigError> for Error {
    fn from(err: ConfigError) -> Self {
        Self::new(ErrorKind::Config, ErrorOrigin::Config, err.to_string())
    }
}

impl From<RegistryError> for Error {
    fn from(err: RegistryError) -> Self {
        let kind = match err {
            RegistryError::DuplicateRegistration { .. } => RegistryErrorKind::Duplicate,
            RegistryError::SchemaNotFound { .. } => RegistryErrorKind::NotFound,
            RegistryError::TypeMismatch { .. } => RegistryErrorKind::TypeMismatch,
        };

        Self::new(
            ErrorKind::Registry(kind),
            ErrorOrigin::Registry,
            err.to_string(),
        )
    }
}

impl From<DocumentError> for Error {
    fn from(err: DocumentError) -> Self {
        Self::new(ErrorKind::Document, ErrorOrigin::Reader, err.to_string())
    }
}

impl From<MergeError> for Error {
    fn from(err: MergeError) -> Self {
        let message = err.to_string();

        Self::new(
            ErrorKind::Patch(err.into()),
            ErrorOrigin::Merge,
            message,
        )
    }
}

///
/// ErrorKind
/// Public error taxonomy for callers.
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum ErrorKind {
    /// Type graph or shadow schema could not be built.
    Schema,

    Config,
    Registry(RegistryErrorKind),

    /// The incoming document is malformed; the caller can fix it.
    Document,

    Patch(PatchError),
}

///
/// RegistryErrorKind
///

#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum RegistryErrorKind {
    Duplicate,
    NotFound,
    TypeMismatch,
}

///
/// PatchError
///

#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum PatchError {
    InvalidShape,
    SchemaMismatch,
    CardinalityViolation,
    TargetMismatch,
    MissingSchema,
}

impl From<MergeError> for PatchError {
    fn from(err: MergeError) -> Self {
        match err {
            MergeError::InvalidShape { .. } => Self::InvalidShape,
            MergeError::SchemaMismatch { .. } => Self::SchemaMismatch,
            MergeError::CardinalityViolation { .. } => Self::CardinalityViolation,
            MergeError::TargetMismatch { .. } => Self::TargetMismatch,
            MergeError::MissingSchema { .. } => Self::MissingSchema,
            MergeError::Context { source, .. } => (*source).into(),
        }
    }
}

///
/// ErrorOrigin
/// Public origin taxonomy for callers.
///

#[derive(Clone, Copy, Debug, Deserialize, Display, Eq, PartialEq, Serialize)]
pub enum ErrorOrigin {
    Build,
    Config,
    Merge,
    Reader,
    Registry,
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;
    use shadowpatch_schema::node::TypeRef;

    #[test]
    fn nested_merge_error_maps_to_leaf_kind() {
        let err = MergeError::InvalidShape {
            expected: "object",
            actual: "value",
        }
        .with_field("child");

        let err = Error::from(err);

        assert_eq!(err.kind, ErrorKind::Patch(PatchError::InvalidShape));
        assert_eq!(err.origin, ErrorOrigin::Merge);
        assert!(err.message.starts_with("merge failed at child"));
    }

    #[test]
    fn registry_miss_maps_to_not_found() {
        let err = Error::from(RegistryError::SchemaNotFound {
            ty: TypeRef::named("app::Person"),
        });

        assert_eq!(err.kind, ErrorKind::Registry(RegistryErrorKind::NotFound));
        assert_eq!(err.origin.to_string(), "Registry");
    }

    #[test]
    fn document_error_is_caller_fixable() {
        let err = Error::from(DocumentError::new("bad"));

        assert_eq!(err.kind, ErrorKind::Document);
        assert_eq!(err.origin, ErrorOrigin::Reader);
        assert_eq!(err.message, DocumentError::new("bad").to_string());
    }
}
