//! Per-file schema extraction
//!
//! Extraction walks the top-level children of one parsed file exactly once
//! and returns everything found as a [`FileExtraction`]. Nothing here touches
//! state shared between files; merging and type resolution happen later in
//! [`crate::ResolutionContext`].

use crate::ast::{ServiceMember, ServiceNode, Statement};
use crate::naming::outer_class_name;
use crate::syntax::{children, SyntaxTree};
use proto_service_generator_common::{
    GeneratorError, MethodDescriptor, Result, ServiceDescriptor, TypeDescriptor,
};
use std::mem;
use tracing::debug;

pub const JAVA_PACKAGE_OPTION: &str = "java_package";
pub const JAVA_MULTIPLE_FILES_OPTION: &str = "java_multiple_files";
pub const JAVA_OUTER_CLASSNAME_OPTION: &str = "java_outer_classname";

/// A message declared in a schema file
///
/// Carries the container options in effect at the point of declaration,
/// since later options in the same file may change them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeclaredType {
    /// Schema package (`package` directive), absent at root scope
    pub package: Option<String>,
    pub name: String,
    /// Language-package option value
    pub java_package: Option<String>,
    /// Outer container the generated type is nested in, if any
    pub outer_class_name: Option<String>,
}

/// Everything extracted from one schema file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileExtraction {
    /// Base name of the file (e.g., "ping.proto")
    pub file_name: String,
    /// Whether the file was found under the root directory rather than imported
    pub top_level: bool,
    /// Last `package` directive
    pub package: Option<String>,
    pub java_package: Option<String>,
    /// Unset unless the option carries a value
    pub multiple_files: Option<bool>,
    /// Derived from the file name unless overridden by option
    pub outer_class_name: String,
    /// Import paths in document order
    pub imports: Vec<String>,
    pub types: Vec<DeclaredType>,
    pub services: Vec<ServiceDescriptor>,
}

impl FileExtraction {
    /// Path under which other files import this one, e.g. "demo/v1/ping.proto"
    pub fn qualified_path(&self) -> String {
        match &self.package {
            Some(package) => format!("{}/{}", package.replace('.', "/"), self.file_name),
            None => self.file_name.clone(),
        }
    }
}

/// Running option state; later directives override earlier ones
struct FileOptions {
    package: Option<String>,
    java_package: Option<String>,
    multiple_files: Option<bool>,
    outer_class_name: String,
    outer_class_overridden: bool,
}

impl FileOptions {
    /// Outer container for a message declared now
    ///
    /// Messages are nested in the outer container only when the file opts
    /// into language-specific naming and does not ask for one file per type.
    fn nesting_container(&self) -> Option<String> {
        let opted_in = self.java_package.is_some() || self.outer_class_overridden;
        if opted_in && !self.multiple_files.unwrap_or(false) {
            Some(self.outer_class_name.clone())
        } else {
            None
        }
    }

    fn apply_option(&mut self, name: &str, value: &str) {
        match name {
            JAVA_PACKAGE_OPTION => {
                self.java_package = Some(crate::ast::unquote(value));
            }
            JAVA_MULTIPLE_FILES_OPTION => {
                if !value.is_empty() {
                    self.multiple_files = Some(value.eq_ignore_ascii_case("true"));
                }
            }
            JAVA_OUTER_CLASSNAME_OPTION => {
                self.outer_class_name = strip_quotes(value).to_string();
                self.outer_class_overridden = true;
            }
            _ => {}
        }
    }
}

/// Extract package, options, messages and services from one parsed file
pub fn extract_file(
    tree: &dyn SyntaxTree,
    file_name: &str,
    top_level: bool,
) -> Result<FileExtraction> {
    let mut options = FileOptions {
        package: None,
        java_package: None,
        multiple_files: None,
        outer_class_name: outer_class_name(file_name)?,
        outer_class_overridden: false,
    };
    let mut imports = Vec::new();
    let mut types = Vec::new();
    let mut services = Vec::new();
    let mut comments = Vec::new();

    for child in children(tree) {
        match Statement::classify(child) {
            Statement::Import(path) => imports.push(path),
            Statement::Package(name) => options.package = Some(name),
            Statement::Option { name, value } => options.apply_option(&name, &value),
            Statement::Comment(text) => comments.push(text),
            Statement::Service(node) => {
                let service = extract_service(
                    node,
                    options.package.as_deref(),
                    mem::take(&mut comments),
                    file_name,
                )?;
                services.push(service);
            }
            Statement::Message(name) => {
                comments.clear();
                types.push(DeclaredType {
                    package: options.package.clone(),
                    name,
                    java_package: options.java_package.clone(),
                    outer_class_name: options.nesting_container(),
                });
            }
            Statement::Other => {}
        }
    }

    Ok(FileExtraction {
        file_name: file_name.to_string(),
        top_level,
        package: options.package,
        java_package: options.java_package,
        multiple_files: options.multiple_files,
        outer_class_name: options.outer_class_name,
        imports,
        types,
        services,
    })
}

fn extract_service(
    node: ServiceNode<'_>,
    package: Option<&str>,
    comments: Vec<String>,
    file_name: &str,
) -> Result<ServiceDescriptor> {
    let mut methods = Vec::new();
    let mut pending = Vec::new();

    for member in node.members() {
        match member {
            ServiceMember::Comment(text) => pending.push(text),
            ServiceMember::Rpc(rpc) => {
                let malformed = || GeneratorError::Syntax {
                    file: file_name.to_string(),
                    message: match rpc.line() {
                        Some(line) => {
                            format!("line {}: malformed rpc declaration '{}'", line, rpc.text())
                        }
                        None => format!("malformed rpc declaration '{}'", rpc.text()),
                    },
                };
                let name = rpc.name().ok_or_else(malformed)?;
                let request = rpc.request_type().ok_or_else(malformed)?;
                let response = rpc.response_type().ok_or_else(malformed)?;

                if rpc.client_streaming() || rpc.server_streaming() {
                    debug!(
                        "Streaming modifiers of rpc {}.{} are not kept in the descriptor",
                        node.name(),
                        name
                    );
                }

                methods.push(MethodDescriptor {
                    name,
                    request_types: vec![TypeDescriptor::parse(&request)],
                    response_type: TypeDescriptor::parse(&response),
                    comments: mem::take(&mut pending),
                });
            }
            ServiceMember::Other => {}
        }
    }

    Ok(ServiceDescriptor {
        name: node.name(),
        package_name: package.map(String::from),
        methods,
        comments,
        annotations: Vec::new(),
    })
}

fn strip_quotes(value: &str) -> &str {
    let value = value.trim();
    if value.len() >= 2 && (value.starts_with('"') || value.starts_with('\'')) {
        &value[1..value.len() - 1]
    } else {
        value
    }
}
