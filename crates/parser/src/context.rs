//! Resolution context shared by all files of one run
//!
//! Holds the package alias table, the type registry and the service
//! registry. Entries are only ever added; the context is created per run and
//! dropped once the resolved services have been handed out.

use crate::extractor::{DeclaredType, FileExtraction};
use crate::naming::package_of_path;
use proto_service_generator_common::{
    GeneratorError, MethodDescriptor, MissingImport, Result, ServiceDescriptor, TypeDescriptor,
};
use std::collections::{HashMap, HashSet};
use tracing::debug;

/// Generated location of a declared schema type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerRef {
    /// Generated package, including the outer container when nested
    pub package: Option<String>,
    pub name: String,
}

/// Mutable accumulator for one extraction run
#[derive(Debug, Default)]
pub struct ResolutionContext {
    /// Schema package -> generated package, for well-known packages
    aliases: HashMap<String, String>,
    /// Schema package (None for root scope) -> type name -> container
    types: HashMap<Option<String>, HashMap<String, ContainerRef>>,
    /// (file base name, service) in registration order
    services: Vec<(String, ServiceDescriptor)>,
    imported: HashSet<String>,
    missing_imports: Vec<MissingImport>,
}

impl ResolutionContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Map a schema package to a fixed generated package
    ///
    /// Registering the same mapping twice is fine; mapping a package to a
    /// second, different target fails.
    pub fn add_alias(&mut self, proto_package: &str, target_package: &str) -> Result<()> {
        match self.aliases.get(proto_package) {
            Some(existing) if existing != target_package => Err(GeneratorError::ConflictingAlias {
                package: proto_package.to_string(),
                existing: existing.clone(),
                requested: target_package.to_string(),
            }),
            Some(_) => Ok(()),
            None => {
                self.aliases
                    .insert(proto_package.to_string(), target_package.to_string());
                Ok(())
            }
        }
    }

    /// Register a declared type under its package, and under the root scope
    /// when the declaring file was loaded at top level
    pub fn add_type(&mut self, declared: &DeclaredType, top_level: bool) {
        let container = self.container_for(declared);

        self.types
            .entry(declared.package.clone())
            .or_default()
            .insert(declared.name.clone(), container.clone());

        if top_level {
            self.types
                .entry(None)
                .or_default()
                .insert(declared.name.clone(), container);
        }
    }

    fn container_for(&self, declared: &DeclaredType) -> ContainerRef {
        let base = declared
            .java_package
            .as_deref()
            .or(declared.package.as_deref())
            .map(|package| {
                self.aliases
                    .get(package)
                    .map(String::as_str)
                    .unwrap_or(package)
                    .to_string()
            });

        let package = match (base, &declared.outer_class_name) {
            (Some(base), Some(outer)) => Some(format!("{}.{}", base, outer)),
            (None, Some(outer)) => Some(outer.clone()),
            (base, None) => base,
        };

        ContainerRef {
            package,
            name: declared.name.clone(),
        }
    }

    pub fn add_service(&mut self, file_name: &str, service: ServiceDescriptor) {
        self.services.push((file_name.to_string(), service));
    }

    /// Register the types of one extracted file, and its services when the
    /// file was loaded at top level
    pub fn merge(&mut self, extraction: FileExtraction) {
        for declared in &extraction.types {
            self.add_type(declared, extraction.top_level);
        }
        if !extraction.top_level {
            debug!(
                "Skipping {} service(s) of imported file '{}'",
                extraction.services.len(),
                extraction.file_name
            );
            return;
        }
        for service in extraction.services {
            self.add_service(&extraction.file_name, service);
        }
    }

    pub fn add_imported_file(&mut self, path: &str) {
        self.imported.insert(normalize_path(path));
    }

    pub fn is_imported(&self, path: &str) -> bool {
        self.imported.contains(&normalize_path(path))
    }

    pub fn record_missing_import(&mut self, missing: MissingImport) {
        self.missing_imports.push(missing);
    }

    pub fn missing_imports(&self) -> &[MissingImport] {
        &self.missing_imports
    }

    /// Resolved services declared in any of `file_names`
    ///
    /// Services come out in the order of `file_names`, then in declaration
    /// order. Services of files outside the list are left out even though
    /// they took part in resolution.
    pub fn services_for_generation(&self, file_names: &[String]) -> Result<Vec<ServiceDescriptor>> {
        let mut seen = HashSet::new();
        let mut resolved = Vec::new();

        for file_name in file_names {
            if !seen.insert(file_name.as_str()) {
                continue;
            }
            for (declared_in, service) in &self.services {
                if declared_in == file_name {
                    resolved.push(self.resolve_service(declared_in, service)?);
                }
            }
        }

        Ok(resolved)
    }

    fn resolve_service(&self, file_name: &str, service: &ServiceDescriptor) -> Result<ServiceDescriptor> {
        let methods = service
            .methods
            .iter()
            .map(|method| {
                let request_types = method
                    .request_types
                    .iter()
                    .map(|ty| self.resolve_in_service(ty, file_name, service))
                    .collect::<Result<Vec<_>>>()?;

                Ok(MethodDescriptor {
                    name: method.name.clone(),
                    request_types,
                    response_type: self.resolve_in_service(&method.response_type, file_name, service)?,
                    comments: method.comments.clone(),
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(ServiceDescriptor {
            name: service.name.clone(),
            package_name: service.package_name.clone(),
            methods,
            comments: service.comments.clone(),
            annotations: service.annotations.clone(),
        })
    }

    /// Rewrite a schema type reference to its generated identity
    ///
    /// - no package: the registration in the referencing service's package,
    ///   then the root-scope registration, otherwise unchanged (scalars and
    ///   other names never registered)
    /// - aliased package: same name in the alias target package
    /// - registered package: the registered container; an unknown name fails
    /// - anything else fails
    pub fn resolve_type(&self, ty: &TypeDescriptor) -> Result<TypeDescriptor> {
        self.resolve(ty, None, None)
    }

    fn resolve_in_service(
        &self,
        ty: &TypeDescriptor,
        file_name: &str,
        service: &ServiceDescriptor,
    ) -> Result<TypeDescriptor> {
        self.resolve(ty, Some(file_name), service.package_name.as_deref())
    }

    fn resolve(
        &self,
        ty: &TypeDescriptor,
        file_name: Option<&str>,
        scope: Option<&str>,
    ) -> Result<TypeDescriptor> {
        let package = match ty.package_name.as_deref() {
            Some(package) if !package.is_empty() => package,
            _ => return Ok(self.resolve_bare(ty, scope)),
        };

        if let Some(target) = self.aliases.get(package) {
            return Ok(TypeDescriptor::new(Some(target), &ty.name));
        }

        match self.types.get(&Some(package.to_string())) {
            Some(registered) => match registered.get(&ty.name) {
                Some(container) => Ok(to_type(container)),
                None => Err(GeneratorError::UnresolvableType {
                    package: package.to_string(),
                    name: ty.name.clone(),
                    cause: self.missing_import_for(package, file_name),
                }),
            },
            None => {
                debug!("No registered types for package '{}'", package);
                Err(GeneratorError::TypeNotFound {
                    type_name: ty.full_name(),
                    cause: self.missing_import_for(package, file_name),
                })
            }
        }
    }

    fn resolve_bare(&self, ty: &TypeDescriptor, scope: Option<&str>) -> TypeDescriptor {
        let in_scope = scope
            .filter(|package| !package.is_empty())
            .and_then(|package| self.types.get(&Some(package.to_string())))
            .and_then(|registered| registered.get(&ty.name));

        match in_scope.or_else(|| self.types.get(&None).and_then(|t| t.get(&ty.name))) {
            Some(container) => to_type(container),
            None => ty.clone(),
        }
    }

    /// The skipped import most likely to have provided `package`
    ///
    /// Prefers an import whose directory matches the package, then any
    /// import skipped by the file holding the failing reference.
    fn missing_import_for(&self, package: &str, file_name: Option<&str>) -> Option<MissingImport> {
        self.missing_imports
            .iter()
            .find(|m| package_of_path(&m.path).as_deref() == Some(package))
            .or_else(|| {
                file_name.and_then(|file| self.missing_imports.iter().find(|m| m.imported_by == file))
            })
            .cloned()
    }
}

fn to_type(container: &ContainerRef) -> TypeDescriptor {
    TypeDescriptor::new(container.package.as_deref(), &container.name)
}

/// Forward slashes, no leading "./"
fn normalize_path(path: &str) -> String {
    let path = path.replace('\\', "/");
    path.trim_start_matches("./").to_string()
}
