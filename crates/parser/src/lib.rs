//! Service descriptor extraction from `.proto` schema files
//!
//! This crate pulls gRPC service definitions out of a directory of `.proto`
//! files without running protoc, and resolves every request/response type
//! to the generated class it will end up in.
//!
//! ## Pipeline
//!
//! 1. **Discovery**: every `*.proto` file below the root directory is a
//!    top-level file and is marked as already imported.
//! 2. **Extraction**: each file is parsed into a generic syntax tree and
//!    walked once for package, options, comments, messages and services.
//!    Imports not under the root are pulled in through a [`ResourceLoader`]
//!    and extracted the same way; a missing import is logged, not fatal.
//! 3. **Resolution**: all extractions are merged into a
//!    [`ResolutionContext`], which rewrites type references and returns the
//!    services declared in top-level files.
//!
//! ## Example
//! ```rust,ignore
//! use proto_service_generator_parser::{ProtoServiceParser, SearchPathLoader};
//!
//! let loader = SearchPathLoader::new(["vendor/proto"]);
//! let services = ProtoServiceParser::new("src/main/proto", &loader).parse()?;
//! ```

pub mod ast;
mod context;
mod extractor;
mod loader;
pub mod naming;
pub mod syntax;
mod walker;

pub use context::{ContainerRef, ResolutionContext};
pub use extractor::{
    extract_file, DeclaredType, FileExtraction, JAVA_MULTIPLE_FILES_OPTION,
    JAVA_OUTER_CLASSNAME_OPTION, JAVA_PACKAGE_OPTION,
};
pub use loader::{MemoryLoader, NoopLoader, ResourceLoader, SearchPathLoader};
pub use walker::{discover_proto_files, relative_import_path, ImportWalker};

use proto_service_generator_common::{
    Result, ServiceDescriptor, WELL_KNOWN_PROTO_PACKAGE, WELL_KNOWN_TARGET_PACKAGE,
};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

/// Extracts resolved service descriptors from a directory of schema files
pub struct ProtoServiceParser<'a> {
    /// Root directory holding the top-level schema files
    proto_dir: PathBuf,

    /// Source for imports that are not under `proto_dir`
    loader: &'a dyn ResourceLoader,
}

impl<'a> ProtoServiceParser<'a> {
    pub fn new<P: AsRef<Path>>(proto_dir: P, loader: &'a dyn ResourceLoader) -> Self {
        Self {
            proto_dir: proto_dir.as_ref().to_path_buf(),
            loader,
        }
    }

    /// Run discovery, extraction and resolution
    ///
    /// Returns the synchronous services declared in top-level files, with
    /// every type reference resolved.
    pub fn parse(&self) -> Result<Vec<ServiceDescriptor>> {
        let proto_files = discover_proto_files(&self.proto_dir)?;

        let mut context = ResolutionContext::new();
        context.add_alias(WELL_KNOWN_PROTO_PACKAGE, WELL_KNOWN_TARGET_PACKAGE)?;
        for file in &proto_files {
            context.add_imported_file(&relative_import_path(&self.proto_dir, file));
        }

        let mut file_names = Vec::with_capacity(proto_files.len());
        let mut walker = ImportWalker::new(self.loader, &mut context);
        for file in &proto_files {
            let file_name = file
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_default();
            info!("Parsing '{}' file", file_name);

            let source = fs::read_to_string(file)?;
            walker.walk_file(&source, &file_name, true)?;
            file_names.push(file_name);
        }

        for extraction in walker.finish() {
            context.merge(extraction);
        }

        context.services_for_generation(&file_names)
    }
}

/// Extract resolved services from `proto_dir`, loading other imports with `loader`
pub fn get_service_descriptors(
    proto_dir: &Path,
    loader: &dyn ResourceLoader,
) -> Result<Vec<ServiceDescriptor>> {
    ProtoServiceParser::new(proto_dir, loader).parse()
}
