//! Resource loaders for imports not found under the root directory

use proto_service_generator_common::Result;
use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::PathBuf;

/// Source of imported schema files
///
/// `Ok(None)` means the resource does not exist; errors are reserved for
/// resources that exist but cannot be read.
pub trait ResourceLoader {
    fn load(&self, path: &str) -> Result<Option<Vec<u8>>>;
}

/// Loader that never finds anything
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopLoader;

impl ResourceLoader for NoopLoader {
    fn load(&self, _path: &str) -> Result<Option<Vec<u8>>> {
        Ok(None)
    }
}

/// Looks imports up in an ordered list of include directories
#[derive(Debug, Default, Clone)]
pub struct SearchPathLoader {
    roots: Vec<PathBuf>,
}

impl SearchPathLoader {
    pub fn new<I, P>(roots: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        Self {
            roots: roots.into_iter().map(Into::into).collect(),
        }
    }
}

impl ResourceLoader for SearchPathLoader {
    fn load(&self, path: &str) -> Result<Option<Vec<u8>>> {
        for root in &self.roots {
            let candidate = root.join(path);
            match fs::read(&candidate) {
                Ok(bytes) => return Ok(Some(bytes)),
                Err(e) if e.kind() == io::ErrorKind::NotFound => continue,
                Err(e) => return Err(e.into()),
            }
        }
        Ok(None)
    }
}

/// In-memory resources keyed by import path
#[derive(Debug, Default, Clone)]
pub struct MemoryLoader {
    resources: HashMap<String, Vec<u8>>,
}

impl MemoryLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_resource(mut self, path: &str, content: impl Into<Vec<u8>>) -> Self {
        self.insert(path, content);
        self
    }

    pub fn insert(&mut self, path: &str, content: impl Into<Vec<u8>>) {
        self.resources.insert(path.to_string(), content.into());
    }
}

impl ResourceLoader for MemoryLoader {
    fn load(&self, path: &str) -> Result<Option<Vec<u8>>> {
        Ok(self.resources.get(path).cloned())
    }
}
