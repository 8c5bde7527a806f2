//! Output of the final service list

use proto_service_generator_common::{GeneratorError, Result, ServiceDescriptor};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

pub const SERVICES_FILE_NAME: &str = "services.json";

/// Writes generated service descriptors somewhere under the output directory
pub trait ServiceEmitter {
    fn emit(&self, services: &[ServiceDescriptor], out_dir: &Path) -> Result<()>;
}

#[derive(Serialize)]
struct ServicesDocument<'a> {
    services: &'a [ServiceDescriptor],
}

/// Writes all services to `<out_dir>/services.json`
#[derive(Debug, Default, Clone, Copy)]
pub struct JsonEmitter;

impl JsonEmitter {
    pub fn output_path(out_dir: &Path) -> PathBuf {
        out_dir.join(SERVICES_FILE_NAME)
    }
}

impl ServiceEmitter for JsonEmitter {
    fn emit(&self, services: &[ServiceDescriptor], out_dir: &Path) -> Result<()> {
        fs::create_dir_all(out_dir).map_err(|e| {
            GeneratorError::Emission(format!(
                "Failed to create output directory {}: {}",
                out_dir.display(),
                e
            ))
        })?;

        let rendered = serde_json::to_string_pretty(&ServicesDocument { services })?;

        let output_path = Self::output_path(out_dir);
        fs::write(&output_path, rendered).map_err(|e| {
            GeneratorError::Emission(format!(
                "Failed to write {}: {}",
                output_path.display(),
                e
            ))
        })?;

        info!(
            "{} service descriptors written to {}",
            services.len(),
            output_path.display()
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proto_service_generator_common::TypeDescriptor;
    use proto_service_generator_common::MethodDescriptor;
    use tempfile::TempDir;

    #[test]
    fn test_json_emitter_creates_directory() {
        let dir = TempDir::new().unwrap();
        let out_dir = dir.path().join("generated/services");

        let ping = TypeDescriptor::new(Some("demo"), "Ping");
        let services = vec![ServiceDescriptor {
            name: "Pinger".to_string(),
            package_name: Some("demo".to_string()),
            methods: vec![MethodDescriptor {
                name: "Do".to_string(),
                request_types: vec![ping.clone()],
                response_type: ping,
                comments: vec![],
            }],
            comments: vec![],
            annotations: vec![],
        }];

        JsonEmitter.emit(&services, &out_dir).unwrap();

        let written = fs::read_to_string(JsonEmitter::output_path(&out_dir)).unwrap();
        let value: serde_json::Value = serde_json::from_str(&written).unwrap();
        assert_eq!(value["services"][0]["name"], "Pinger");
        assert_eq!(value["services"][0]["methods"][0]["name"], "Do");
    }

    #[test]
    fn test_json_emitter_fails_on_file_path() {
        let dir = TempDir::new().unwrap();
        let blocker = dir.path().join("occupied");
        fs::write(&blocker, "").unwrap();

        let result = JsonEmitter.emit(&[], &blocker);
        assert!(matches!(result, Err(GeneratorError::Emission(_))));
    }
}
