//! Naming conventions for generated containers

use proto_service_generator_common::{GeneratorError, Result, PROTO_EXTENSION};

/// Default outer container name for a schema file
///
/// The extension is stripped, the first letter and every letter following
/// an underscore are upper-cased, and underscores are dropped:
/// - "order_book.proto" -> "OrderBook"
/// - "act.proto" -> "Act"
pub fn outer_class_name(file_name: &str) -> Result<String> {
    let stem = file_name.strip_suffix(PROTO_EXTENSION).unwrap_or(file_name);

    let mut name = String::with_capacity(stem.len());
    let mut upper_next = true;
    for ch in stem.chars() {
        if ch == '_' {
            upper_next = true;
            continue;
        }
        if upper_next {
            name.extend(ch.to_uppercase());
            upper_next = false;
        } else {
            name.push(ch);
        }
    }

    if name.is_empty() {
        return Err(GeneratorError::InvalidFileName(file_name.to_string()));
    }

    Ok(name)
}

/// Dotted package implied by the directory part of an import path
///
/// "google/protobuf/timestamp.proto" -> Some("google.protobuf")
pub fn package_of_path(path: &str) -> Option<String> {
    path.rfind('/')
        .filter(|&index| index > 0)
        .map(|index| path[..index].replace('/', "."))
}

/// Base name of a `/`-separated path
pub fn base_name(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}
