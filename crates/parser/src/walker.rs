//! Schema file discovery and depth-first import walking

use crate::context::ResolutionContext;
use crate::extractor::{extract_file, FileExtraction};
use crate::loader::ResourceLoader;
use crate::naming::{base_name, package_of_path};
use crate::syntax::parse_schema;
use proto_service_generator_common::{
    GeneratorError, MissingImport, Result, PROTO_EXTENSION, WELL_KNOWN_PROTO_PACKAGE,
};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

/// Find every schema file below `proto_dir`, sorted by path
pub fn discover_proto_files(proto_dir: &Path) -> Result<Vec<PathBuf>> {
    if !proto_dir.exists() {
        return Err(GeneratorError::DirectoryNotFound(proto_dir.to_path_buf()));
    }

    if !proto_dir.is_dir() {
        return Err(GeneratorError::NotADirectory(proto_dir.to_path_buf()));
    }

    let mut proto_files = Vec::new();
    for entry in WalkDir::new(proto_dir).sort_by_file_name() {
        let entry = entry.map_err(|e| {
            GeneratorError::Io(e.into_io_error().unwrap_or_else(|| {
                std::io::Error::other(format!("Failed to walk {}", proto_dir.display()))
            }))
        })?;

        if entry.file_type().is_file()
            && entry.file_name().to_string_lossy().ends_with(PROTO_EXTENSION)
        {
            proto_files.push(entry.into_path());
        }
    }

    if proto_files.is_empty() {
        return Err(GeneratorError::NoSchemaFiles(proto_dir.to_path_buf()));
    }

    info!(
        "{} proto files were found in directory {}",
        proto_files.len(),
        proto_dir.display()
    );

    Ok(proto_files)
}

/// `path` relative to `root`, `/`-separated
pub fn relative_import_path(root: &Path, path: &Path) -> String {
    let relative = path.strip_prefix(root).unwrap_or(path);
    relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

/// Extracts files and, recursively, the imports they need
///
/// Files are visited depth-first and at most once; the imported-file set in
/// the context is the source of truth for "already visited". Extraction
/// results are collected and handed back by [`ImportWalker::finish`] so they
/// can be merged after the walk.
pub struct ImportWalker<'a> {
    loader: &'a dyn ResourceLoader,
    context: &'a mut ResolutionContext,
    extractions: Vec<FileExtraction>,
}

impl<'a> ImportWalker<'a> {
    pub fn new(loader: &'a dyn ResourceLoader, context: &'a mut ResolutionContext) -> Self {
        Self {
            loader,
            context,
            extractions: Vec::new(),
        }
    }

    /// Parse and extract one file, then walk its imports
    pub fn walk_file(&mut self, source: &str, file_name: &str, top_level: bool) -> Result<()> {
        let tree = parse_schema(source, file_name)?;
        let extraction = extract_file(&tree, file_name, top_level)?;

        self.context.add_imported_file(&extraction.qualified_path());

        let imports = extraction.imports.clone();
        self.extractions.push(extraction);

        for import in &imports {
            self.resolve_import(import, file_name);
        }

        Ok(())
    }

    /// Load and walk one import; failures are recorded, never raised
    fn resolve_import(&mut self, path: &str, imported_by: &str) {
        if self.context.is_imported(path) {
            debug!("Import '{}' already processed", path);
            return;
        }

        if package_of_path(path).as_deref() == Some(WELL_KNOWN_PROTO_PACKAGE) {
            debug!("Import '{}' belongs to the well-known types", path);
            return;
        }

        let bytes = match self.loader.load(path) {
            Ok(Some(bytes)) => bytes,
            Ok(None) => {
                warn!("Can not find resource with name = {}", path);
                self.record_miss(path, imported_by, "not found by resource loader".to_string());
                return;
            }
            Err(e) => {
                warn!("Can not read resource with name = {}: {}", path, e);
                self.record_miss(path, imported_by, e.to_string());
                return;
            }
        };

        // Marked before walking so import cycles terminate
        self.context.add_imported_file(path);

        let source = match String::from_utf8(bytes) {
            Ok(source) => source,
            Err(e) => {
                warn!("Resource {} is not valid UTF-8: {}", path, e);
                self.record_miss(path, imported_by, format!("not valid UTF-8: {}", e));
                return;
            }
        };

        debug!("Parsing imported resource '{}'", path);
        if let Err(e) = self.walk_file(&source, base_name(path), false) {
            warn!("Can not parse resource with name = {}: {}", path, e);
            self.record_miss(path, imported_by, e.to_string());
        }
    }

    fn record_miss(&mut self, path: &str, imported_by: &str, reason: String) {
        self.context.record_missing_import(MissingImport {
            path: path.to_string(),
            imported_by: imported_by.to_string(),
            reason,
        });
    }

    /// Extraction results in visiting order
    pub fn finish(self) -> Vec<FileExtraction> {
        self.extractions
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::MemoryLoader;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_discover_missing_directory() {
        let dir = TempDir::new().unwrap();
        let result = discover_proto_files(&dir.path().join("absent"));
        assert!(matches!(result, Err(GeneratorError::DirectoryNotFound(_))));
    }

    #[test]
    fn test_discover_rejects_file() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("a.proto");
        fs::write(&file, "message A {}").unwrap();
        assert!(matches!(
            discover_proto_files(&file),
            Err(GeneratorError::NotADirectory(_))
        ));
    }

    #[test]
    fn test_discover_empty_directory() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("readme.txt"), "no schemas").unwrap();
        assert!(matches!(
            discover_proto_files(dir.path()),
            Err(GeneratorError::NoSchemaFiles(_))
        ));
    }

    #[test]
    fn test_discover_recursive() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("nested/deeper")).unwrap();
        fs::write(dir.path().join("b.proto"), "").unwrap();
        fs::write(dir.path().join("nested/deeper/a.proto"), "").unwrap();
        fs::write(dir.path().join("nested/skip.txt"), "").unwrap();

        let files = discover_proto_files(dir.path()).unwrap();
        let relative: Vec<String> = files
            .iter()
            .map(|f| relative_import_path(dir.path(), f))
            .collect();
        assert_eq!(relative, vec!["b.proto", "nested/deeper/a.proto"]);
    }

    #[test]
    fn test_walker_follows_imports_once() {
        let loader = MemoryLoader::new()
            .with_resource("lib/types.proto", "package lib; message Shared {}")
            .with_resource(
                "lib/more.proto",
                "package lib; import \"lib/types.proto\"; message More {}",
            );
        let mut context = ResolutionContext::new();

        let mut walker = ImportWalker::new(&loader, &mut context);
        walker
            .walk_file(
                "import \"lib/types.proto\"; import \"lib/more.proto\"; import \"lib/types.proto\";",
                "root.proto",
                true,
            )
            .unwrap();
        let extractions = walker.finish();

        let names: Vec<&str> = extractions.iter().map(|e| e.file_name.as_str()).collect();
        assert_eq!(names, vec!["root.proto", "types.proto", "more.proto"]);
        assert!(!extractions[1].top_level);
        assert!(context.missing_imports().is_empty());
    }

    #[test]
    fn test_walker_records_missing_import() {
        let loader = MemoryLoader::new();
        let mut context = ResolutionContext::new();

        let mut walker = ImportWalker::new(&loader, &mut context);
        walker
            .walk_file(
                "import \"google/protobuf/empty.proto\"; import \"absent/x.proto\";",
                "root.proto",
                true,
            )
            .unwrap();
        walker.finish();

        let missing = context.missing_imports();
        assert_eq!(missing.len(), 1);
        assert_eq!(missing[0].path, "absent/x.proto");
        assert_eq!(missing[0].imported_by, "root.proto");
    }

    #[test]
    fn test_broken_import_is_soft_failure() {
        let loader = MemoryLoader::new().with_resource("bad/broken.proto", "message {");
        let mut context = ResolutionContext::new();

        let mut walker = ImportWalker::new(&loader, &mut context);
        walker
            .walk_file("import \"bad/broken.proto\";", "root.proto", true)
            .unwrap();
        assert_eq!(walker.finish().len(), 1);
        assert_eq!(context.missing_imports().len(), 1);
    }

    #[test]
    fn test_root_file_syntax_error_is_fatal() {
        let loader = MemoryLoader::new();
        let mut context = ResolutionContext::new();
        let mut walker = ImportWalker::new(&loader, &mut context);
        assert!(walker.walk_file("message {", "root.proto", true).is_err());
    }
}
