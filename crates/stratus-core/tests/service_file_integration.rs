//! Integration tests for service-file discovery and loading

use std::fs;

use stratus_core::{EngineError, ServiceDescription};

#[test]
fn test_discover_prefers_yml_over_yaml_and_json() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("stratus.json"), "{\"service\": \"c\"}").unwrap();
    fs::write(dir.path().join("stratus.yaml"), "service: b\n").unwrap();
    fs::write(dir.path().join("stratus.yml"), "service: a\n").unwrap();

    let found = ServiceDescription::discover(dir.path()).unwrap();
    assert_eq!(found.file_name().unwrap(), "stratus.yml");

    let service = ServiceDescription::from_file(&found).unwrap();
    assert_eq!(service.service, "a");
}

#[test]
fn test_discover_returns_none_in_empty_directory() {
    let dir = tempfile::tempdir().unwrap();
    assert!(ServiceDescription::discover(dir.path()).is_none());
}

#[test]
fn test_json_service_file_parses() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("stratus.json");
    fs::write(
        &path,
        "{\"service\": \"photo-api\", \"provider\": {\"name\": \"aws\"}}",
    )
    .unwrap();

    let service = ServiceDescription::from_file(&path).unwrap();
    assert_eq!(service.service, "photo-api");
    assert_eq!(service.provider.name, "aws");
}

#[test]
fn test_missing_file_is_a_config_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = ServiceDescription::from_file(&dir.path().join("stratus.yml")).unwrap_err();
    assert!(matches!(err, EngineError::Config(_)));
}
