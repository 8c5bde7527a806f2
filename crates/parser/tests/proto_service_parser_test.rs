//! Integration tests for directory-level service extraction

use mockall::mock;
use mockall::predicate::eq;
use proto_service_generator_common::{GeneratorError, Result, TypeDescriptor};
use proto_service_generator_parser::{
    get_service_descriptors, MemoryLoader, NoopLoader, ProtoServiceParser, ResourceLoader,
};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

mock! {
    pub Loader {}

    impl ResourceLoader for Loader {
        fn load(&self, path: &str) -> Result<Option<Vec<u8>>>;
    }
}

fn write_proto(root: &Path, relative: &str, content: &str) {
    let path = root.join(relative);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, content).unwrap();
}

#[test]
fn test_two_file_scenario() {
    let dir = TempDir::new().unwrap();
    write_proto(dir.path(), "a.proto", "package demo; message Ping {}");
    write_proto(
        dir.path(),
        "b.proto",
        r#"import "a.proto";
package demo;
service Pinger { rpc Do(Ping) returns (Ping); }
"#,
    );

    let services = get_service_descriptors(dir.path(), &NoopLoader).unwrap();

    assert_eq!(services.len(), 1);
    let pinger = &services[0];
    assert_eq!(pinger.name, "Pinger");
    assert_eq!(pinger.package_name.as_deref(), Some("demo"));
    assert_eq!(pinger.methods.len(), 1);

    let method = &pinger.methods[0];
    assert_eq!(method.name, "Do");
    assert_eq!(method.request_types, vec![TypeDescriptor::new(Some("demo"), "Ping")]);
    assert_eq!(method.response_type, TypeDescriptor::new(Some("demo"), "Ping"));
}

#[test]
fn test_import_loaded_once() {
    let dir = TempDir::new().unwrap();
    write_proto(
        dir.path(),
        "b.proto",
        r#"import "shared/ping.proto";
package demo;
service Pinger { rpc Do(shared.Ping) returns (shared.Ping); }
"#,
    );
    write_proto(
        dir.path(),
        "c.proto",
        r#"import "shared/ping.proto";
import "shared/ping.proto";
package demo;
service Ponger { rpc Do(shared.Ping) returns (shared.Ping); }
"#,
    );

    let mut loader = MockLoader::new();
    loader
        .expect_load()
        .with(eq("shared/ping.proto"))
        .times(1)
        .returning(|_| Ok(Some(b"package shared; message Ping {}".to_vec())));

    let services = get_service_descriptors(dir.path(), &loader).unwrap();

    let names: Vec<&str> = services.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(names, vec!["Pinger", "Ponger"]);
    assert_eq!(
        services[1].methods[0].response_type,
        TypeDescriptor::new(Some("shared"), "Ping")
    );
}

#[test]
fn test_imported_only_services_are_excluded() {
    let dir = TempDir::new().unwrap();
    write_proto(
        dir.path(),
        "b.proto",
        r#"import "lib/library.proto";
package demo;
service Pinger { rpc Do(lib.Book) returns (lib.Book); }
"#,
    );

    let loader = MemoryLoader::new().with_resource(
        "lib/library.proto",
        "package lib; message Book {} service Library { rpc Lend(Book) returns (Book); }",
    );

    let services = get_service_descriptors(dir.path(), &loader).unwrap();
    assert_eq!(services.len(), 1);
    assert_eq!(services[0].name, "Pinger");
}

#[test]
fn test_well_known_types_resolve_through_alias() {
    let dir = TempDir::new().unwrap();
    write_proto(
        dir.path(),
        "clock.proto",
        r#"syntax = "proto3";
import "google/protobuf/timestamp.proto";
import "google/protobuf/empty.proto";
package demo;
service Clock { rpc Now(google.protobuf.Empty) returns (google.protobuf.Timestamp); }
"#,
    );

    let mut loader = MockLoader::new();
    loader.expect_load().never();

    let services = get_service_descriptors(dir.path(), &loader).unwrap();
    let method = &services[0].methods[0];
    assert_eq!(
        method.request_types[0],
        TypeDescriptor::new(Some("com.google.protobuf"), "Empty")
    );
    assert_eq!(
        method.response_type,
        TypeDescriptor::new(Some("com.google.protobuf"), "Timestamp")
    );
}

#[test]
fn test_java_options_shape_resolved_types() {
    let dir = TempDir::new().unwrap();
    write_proto(
        dir.path(),
        "th2/act/act_messages.proto",
        r#"package th2.act;
option java_package = "com.exactpro.th2.act.grpc";
message PlaceOrderRequest {}
message PlaceOrderResponse {}
"#,
    );
    write_proto(
        dir.path(),
        "th2/act/act_service.proto",
        r#"import "th2/act/act_messages.proto";
package th2.act;
option java_package = "com.exactpro.th2.act.grpc";
option java_multiple_files = true;
// Places orders
service Act {
  /* Sends an order */
  rpc PlaceOrder(PlaceOrderRequest) returns (th2.act.PlaceOrderResponse);
}
"#,
    );

    let services = get_service_descriptors(dir.path(), &NoopLoader).unwrap();
    assert_eq!(services.len(), 1);

    let act = &services[0];
    assert_eq!(act.comments, vec!["Places orders"]);
    let method = &act.methods[0];
    assert_eq!(method.comments, vec!["Sends an order"]);
    assert_eq!(
        method.request_types[0],
        TypeDescriptor::new(Some("com.exactpro.th2.act.grpc.ActMessages"), "PlaceOrderRequest")
    );
    assert_eq!(
        method.response_type,
        TypeDescriptor::new(Some("com.exactpro.th2.act.grpc.ActMessages"), "PlaceOrderResponse")
    );
}

#[test]
fn test_missing_import_surfaces_on_resolution() {
    let dir = TempDir::new().unwrap();
    write_proto(
        dir.path(),
        "b.proto",
        r#"import "common/event.proto";
package demo;
service Pinger { rpc Do(common.Event) returns (common.Event); }
"#,
    );

    let result = ProtoServiceParser::new(dir.path(), &NoopLoader).parse();
    match result {
        Err(GeneratorError::TypeNotFound { type_name, cause }) => {
            assert_eq!(type_name, "common.Event");
            assert_eq!(cause.map(|c| c.path).as_deref(), Some("common/event.proto"));
        }
        other => panic!("expected TypeNotFound, got {:?}", other),
    }
}

#[test]
fn test_directory_without_schema_files() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("notes.md"), "nothing here").unwrap();

    let mut loader = MockLoader::new();
    loader.expect_load().never();

    let result = get_service_descriptors(dir.path(), &loader);
    assert!(matches!(result, Err(GeneratorError::NoSchemaFiles(_))));
}

#[test]
fn test_multiple_services_in_one_file_keep_order() {
    let dir = TempDir::new().unwrap();
    write_proto(
        dir.path(),
        "duo.proto",
        r#"package demo;
message Ping {}
service First { rpc A(Ping) returns (Ping); }
service Second { rpc B(Ping) returns (Ping); }
"#,
    );

    let services = get_service_descriptors(dir.path(), &NoopLoader).unwrap();
    let names: Vec<&str> = services.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(names, vec!["First", "Second"]);
}

#[test]
fn test_imported_file_sharing_base_name_is_excluded() {
    let dir = TempDir::new().unwrap();
    write_proto(
        dir.path(),
        "common.proto",
        r#"package app;
import "lib/common.proto";
service App { rpc Run(lib.Job) returns (lib.Job); }
"#,
    );
    let loader = MemoryLoader::new().with_resource(
        "lib/common.proto",
        "package lib; message Job {} service Library { rpc Run(Job) returns (Job); }",
    );

    let services = get_service_descriptors(dir.path(), &loader).unwrap();
    let names: Vec<&str> = services.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(names, vec!["App"]);
    assert_eq!(
        services[0].methods[0].response_type,
        TypeDescriptor::new(Some("lib"), "Job")
    );
}

#[test]
fn test_top_level_file_loaded_again_through_loader_is_not_duplicated() {
    let dir = TempDir::new().unwrap();
    let pinger = "package demo; message Ping {} service Pinger { rpc Do(Ping) returns (Ping); }";
    write_proto(dir.path(), "pinger.proto", pinger);
    write_proto(
        dir.path(),
        "user.proto",
        r#"package demo;
import "vendor/pinger.proto";
service User { rpc Do(Ping) returns (Ping); }
"#,
    );
    let loader = MemoryLoader::new().with_resource("vendor/pinger.proto", pinger);

    let services = get_service_descriptors(dir.path(), &loader).unwrap();
    let names: Vec<&str> = services.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(names, vec!["Pinger", "User"]);
}

#[test]
fn test_bare_name_resolves_in_own_package() {
    let dir = TempDir::new().unwrap();
    write_proto(
        dir.path(),
        "a.proto",
        "package alpha; message Ping {} service S { rpc Do(Ping) returns (Ping); }",
    );
    write_proto(dir.path(), "b.proto", "package beta; message Ping {}");

    let services = get_service_descriptors(dir.path(), &NoopLoader).unwrap();
    let method = &services[0].methods[0];
    assert_eq!(method.request_types, vec![TypeDescriptor::new(Some("alpha"), "Ping")]);
    assert_eq!(method.response_type, TypeDescriptor::new(Some("alpha"), "Ping"));
}
