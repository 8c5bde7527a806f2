//! Service list generation
//!
//! Takes the synchronous services extracted by the parser, marks each with
//! its blocking stub, and pairs it with a derived asynchronous variant.
//!
//! ## Example
//! ```rust,ignore
//! use proto_service_generator_common::GenerationSettings;
//! use proto_service_generator_generator::{ServiceGenerator, JsonEmitter};
//! use proto_service_generator_parser::SearchPathLoader;
//!
//! let settings = GenerationSettings::new("src/main/proto", "build/generated");
//! let loader = SearchPathLoader::new(&settings.include_dirs);
//! let services = ServiceGenerator::new(&settings, &loader).generate(&JsonEmitter)?;
//! ```

mod async_variant;
mod emitter;
mod stub;

pub use async_variant::{to_async, ASYNC_PREFIX};
pub use emitter::{JsonEmitter, ServiceEmitter, SERVICES_FILE_NAME};
pub use stub::{add_sync_stub_annotations, blocking_stub_class, sync_stub_annotation};

use proto_service_generator_common::{GenerationSettings, Result, ServiceDescriptor};
use proto_service_generator_parser::{ProtoServiceParser, ResourceLoader};
use tracing::{debug, info};

/// Runs extraction and derivation for one set of settings
pub struct ServiceGenerator<'a> {
    settings: &'a GenerationSettings,
    loader: &'a dyn ResourceLoader,
}

impl<'a> ServiceGenerator<'a> {
    pub fn new(settings: &'a GenerationSettings, loader: &'a dyn ResourceLoader) -> Self {
        Self { settings, loader }
    }

    /// Produce the combined service list
    ///
    /// Each synchronous service is immediately followed by its async variant.
    pub fn services(&self) -> Result<Vec<ServiceDescriptor>> {
        self.settings.validate()?;

        let mut services = ProtoServiceParser::new(&self.settings.proto_dir, self.loader).parse()?;
        add_sync_stub_annotations(&mut services);

        let mut combined = Vec::with_capacity(services.len() * 2);
        for service in services {
            let async_service = to_async(&service);
            debug!(
                "Derived {} from {}",
                async_service.full_name(),
                service.full_name()
            );
            combined.push(service);
            combined.push(async_service);
        }

        info!("{} services prepared for generation", combined.len());
        Ok(combined)
    }

    /// Produce the combined service list and hand it to `emitter`
    pub fn generate(&self, emitter: &dyn ServiceEmitter) -> Result<Vec<ServiceDescriptor>> {
        let services = self.services()?;
        emitter.emit(&services, &self.settings.out_dir)?;
        Ok(services)
    }
}

/// Validate `settings`, extract services and pair each with its async variant
pub fn generate_services(
    settings: &GenerationSettings,
    loader: &dyn ResourceLoader,
) -> Result<Vec<ServiceDescriptor>> {
    ServiceGenerator::new(settings, loader).services()
}
