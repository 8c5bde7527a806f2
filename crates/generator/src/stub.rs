//! Stub annotations for synchronous services

use proto_service_generator_common::{
    AnnotationDescriptor, ServiceDescriptor, GRPC_STUB_ANNOTATION, GRPC_STUB_ANNOTATION_PACKAGE,
};

/// Dotted path of the blocking stub class generated for `service`
///
/// `demo.Pinger` -> `demo.PingerGrpc.PingerBlockingStub.class`
pub fn blocking_stub_class(service: &ServiceDescriptor) -> String {
    let mut parts = Vec::with_capacity(3);
    if let Some(package) = service.package_name.as_deref().filter(|p| !p.is_empty()) {
        parts.push(package.to_string());
    }
    parts.push(format!("{}Grpc", service.name));
    parts.push(format!("{}BlockingStub.class", service.name));
    parts.join(".")
}

pub fn sync_stub_annotation(service: &ServiceDescriptor) -> AnnotationDescriptor {
    AnnotationDescriptor {
        name: GRPC_STUB_ANNOTATION.to_string(),
        package_name: GRPC_STUB_ANNOTATION_PACKAGE.to_string(),
        value: blocking_stub_class(service),
    }
}

/// Append the blocking stub annotation to every service
pub fn add_sync_stub_annotations(services: &mut [ServiceDescriptor]) {
    for service in services.iter_mut() {
        let annotation = sync_stub_annotation(service);
        service.annotations.push(annotation);
    }
}
