//! Derivation of asynchronous service variants
//!
//! The async variant of `Pinger` is `AsyncPinger`: each method takes the
//! original request plus a response observer and returns nothing, and the
//! stub annotation points at the non-blocking stub.

use proto_service_generator_common::{
    AnnotationDescriptor, MethodDescriptor, ServiceDescriptor, TypeDescriptor, NO_VALUE_TYPE,
    STREAM_OBSERVER_PACKAGE, STREAM_OBSERVER_TYPE,
};
use tracing::debug;

pub const ASYNC_PREFIX: &str = "Async";

const BLOCKING_STUB_SUFFIX: &str = "BlockingStub";
const CLASS_SEGMENT: &str = "class";

/// Build the async variant of a resolved service
///
/// The result is a new value; `service` is left untouched.
pub fn to_async(service: &ServiceDescriptor) -> ServiceDescriptor {
    ServiceDescriptor {
        name: format!("{}{}", ASYNC_PREFIX, service.name),
        package_name: service.package_name.clone(),
        methods: service.methods.iter().map(to_async_method).collect(),
        comments: service.comments.clone(),
        annotations: service
            .annotations
            .iter()
            .map(|annotation| to_async_annotation(annotation, &service.name))
            .collect(),
    }
}

fn to_async_method(method: &MethodDescriptor) -> MethodDescriptor {
    let observer = TypeDescriptor::new(Some(STREAM_OBSERVER_PACKAGE), STREAM_OBSERVER_TYPE)
        .with_generic(method.response_type.clone());

    let mut request_types = method.request_types.clone();
    request_types.push(observer);

    MethodDescriptor {
        name: method.name.clone(),
        request_types,
        response_type: TypeDescriptor::bare(NO_VALUE_TYPE),
        comments: method.comments.clone(),
    }
}

/// Point a blocking-stub annotation at the async stub
///
/// `pkg.ActGrpc.ActBlockingStub.class` becomes `pkg.ActGrpc.ActStub.class`.
/// Values of any other shape are kept as they are.
fn to_async_annotation(annotation: &AnnotationDescriptor, service_name: &str) -> AnnotationDescriptor {
    let mut parts: Vec<&str> = annotation.value.split('.').collect();
    let len = parts.len();

    let is_blocking_stub = len >= 3
        && parts[len - 1] == CLASS_SEGMENT
        && parts[len - 2].ends_with(BLOCKING_STUB_SUFFIX);

    if !is_blocking_stub {
        debug!(
            "Annotation {} value '{}' is not a blocking stub reference, keeping it",
            annotation.name, annotation.value
        );
        return annotation.clone();
    }

    let async_stub = format!("{}Stub", service_name);
    parts[len - 2] = &async_stub;

    AnnotationDescriptor {
        name: annotation.name.clone(),
        package_name: annotation.package_name.clone(),
        value: parts.join("."),
    }
}
