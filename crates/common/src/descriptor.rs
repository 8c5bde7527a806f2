//! Descriptor model handed from the parser to code emission
//!
//! Descriptors are plain values: the async variant of a service is built as a
//! fresh value from the resolved synchronous one and never shares storage
//! with it.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::{Hash, Hasher};

/// Reference to a schema or generated type
///
/// Two descriptors are equal when their package and name are equal; the
/// generic parameter does not take part in equality.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TypeDescriptor {
    /// Type name without package (e.g., "Ping")
    pub name: String,
    /// Dotted namespace, absent for root-scope and primitive types
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub package_name: Option<String>,
    /// Type parameter for wrappers such as the response-stream observer
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generic_type: Option<Box<TypeDescriptor>>,
}

impl TypeDescriptor {
    pub fn new(package_name: Option<&str>, name: &str) -> Self {
        Self {
            name: name.to_string(),
            package_name: package_name.map(String::from),
            generic_type: None,
        }
    }

    /// Type without a package
    pub fn bare(name: &str) -> Self {
        Self::new(None, name)
    }

    /// Parameterize this type with `generic`
    pub fn with_generic(mut self, generic: TypeDescriptor) -> Self {
        self.generic_type = Some(Box::new(generic));
        self
    }

    /// Split a type reference as written in a schema file
    ///
    /// Everything before the last period is the package:
    /// - "demo.Ping" -> package "demo", name "Ping"
    /// - "Ping" -> no package, name "Ping"
    /// - ".demo.Ping" -> package "demo", name "Ping"
    pub fn parse(full_name: &str) -> Self {
        let full_name = full_name.trim_start_matches('.');
        match full_name.rfind('.') {
            Some(index) if index > 0 => {
                Self::new(Some(&full_name[..index]), &full_name[index + 1..])
            }
            _ => Self::bare(full_name),
        }
    }

    /// Package-qualified name ("demo.Ping" or "Ping")
    pub fn full_name(&self) -> String {
        match &self.package_name {
            Some(package) if !package.is_empty() => format!("{}.{}", package, self.name),
            _ => self.name.clone(),
        }
    }
}

impl PartialEq for TypeDescriptor {
    fn eq(&self, other: &Self) -> bool {
        self.package_name == other.package_name && self.name == other.name
    }
}

impl Eq for TypeDescriptor {}

impl Hash for TypeDescriptor {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.package_name.hash(state);
        self.name.hash(state);
    }
}

impl fmt::Display for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.full_name())?;
        if let Some(generic) = &self.generic_type {
            write!(f, "<{}>", generic)?;
        }
        Ok(())
    }
}

/// One `rpc` declaration of a service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MethodDescriptor {
    pub name: String,
    /// Ordered request parameters, one for synchronous methods
    pub request_types: Vec<TypeDescriptor>,
    pub response_type: TypeDescriptor,
    /// Doc comments immediately preceding the declaration
    #[serde(default)]
    pub comments: Vec<String>,
}

/// One `service` declaration, or the async variant derived from it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceDescriptor {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub package_name: Option<String>,
    /// Methods in declaration order
    pub methods: Vec<MethodDescriptor>,
    #[serde(default)]
    pub comments: Vec<String>,
    #[serde(default)]
    pub annotations: Vec<AnnotationDescriptor>,
}

impl ServiceDescriptor {
    /// Package-qualified service name
    pub fn full_name(&self) -> String {
        match &self.package_name {
            Some(package) if !package.is_empty() => format!("{}.{}", package, self.name),
            _ => self.name.clone(),
        }
    }

    pub fn method(&self, name: &str) -> Option<&MethodDescriptor> {
        self.methods.iter().find(|m| m.name == name)
    }
}

/// Annotation attached to a generated service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnnotationDescriptor {
    pub name: String,
    pub package_name: String,
    /// Dotted path of the stub class the annotation points at
    pub value: String,
}
