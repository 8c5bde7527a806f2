//! Common types and utilities for the proto service generator
//!
//! This crate contains the descriptor model, error types, run settings and
//! well-known names shared by the parser, generator, and CLI components.

mod descriptor;
mod settings;

pub use descriptor::{AnnotationDescriptor, MethodDescriptor, ServiceDescriptor, TypeDescriptor};
pub use settings::GenerationSettings;

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// File extension of schema files
pub const PROTO_EXTENSION: &str = ".proto";

/// Built-in schema package holding the well-known types
pub const WELL_KNOWN_PROTO_PACKAGE: &str = "google.protobuf";

/// Generated container package the well-known types live in
pub const WELL_KNOWN_TARGET_PACKAGE: &str = "com.google.protobuf";

/// Response-stream observer used as the extra request parameter of async methods
pub const STREAM_OBSERVER_TYPE: &str = "StreamObserver";
pub const STREAM_OBSERVER_PACKAGE: &str = "io.grpc.stub";

/// "No value" marker returned by async methods
pub const NO_VALUE_TYPE: &str = "void";

/// Annotation attached to every synchronous service naming its blocking stub
pub const GRPC_STUB_ANNOTATION: &str = "GrpcStub";
pub const GRPC_STUB_ANNOTATION_PACKAGE: &str =
    "com.exactpro.th2.proto.service.generator.core.antlr.annotation";

/// An import that could not be located while extracting a file
///
/// Recorded during extraction and attached to any later resolution failure
/// for the package the import was expected to provide.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MissingImport {
    /// Import path as written in the schema file
    pub path: String,
    /// Base name of the file holding the import statement
    pub imported_by: String,
    /// Why the import could not be used
    pub reason: String,
}

impl fmt::Display for MissingImport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "import '{}' from '{}' was skipped: {}",
            self.path, self.imported_by, self.reason
        )
    }
}

fn cause_suffix(cause: &Option<MissingImport>) -> String {
    match cause {
        Some(missing) => format!(" ({})", missing),
        None => String::new(),
    }
}

/// Errors that can occur while extracting and resolving service descriptors
#[derive(Error, Debug)]
pub enum GeneratorError {
    #[error("Provided directory with proto files does not exist: {}", .0.display())]
    DirectoryNotFound(PathBuf),

    #[error("You must provide path to directory with proto files, not to a single file: {}", .0.display())]
    NotADirectory(PathBuf),

    #[error("Invalid settings: {0}")]
    InvalidSettings(String),

    #[error("No valid proto file was found in directory: {}", .0.display())]
    NoSchemaFiles(PathBuf),

    #[error("Wrong file name = {0:?}")]
    InvalidFileName(String),

    #[error("Syntax error in {file}: {message}")]
    Syntax { file: String, message: String },

    #[error("Can not find type '{name}' in package '{package}'{}", cause_suffix(.cause))]
    UnresolvableType {
        package: String,
        name: String,
        cause: Option<MissingImport>,
    },

    #[error("Can not find generated class for type = {type_name}{}", cause_suffix(.cause))]
    TypeNotFound {
        type_name: String,
        cause: Option<MissingImport>,
    },

    #[error("Target for proto package '{package}' already added: '{existing}' (requested '{requested}')")]
    ConflictingAlias {
        package: String,
        existing: String,
        requested: String,
    },

    #[error("Emission error: {0}")]
    Emission(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Result type for generator operations
pub type Result<T> = std::result::Result<T, GeneratorError>;
