//! Integration tests against a saved `terraform show -json` document.
//!
//! The plan under `tests/testdata/basic` covers root and child module
//! resources, JSON-encoded attributes nested inside JSON-encoded attributes,
//! and replace actions.

use std::fs;

use serde_json::Value;
use tempfile::TempDir;
use tfluent_core::check::in_plan;
use tfluent_core::{
    Action, CheckExt, Error, ErrorKind, OutputProvider, Outputs, Plan, PlanProvider,
};

/// Path to the basic test plan
const BASIC_PLAN: &str = "tests/testdata/basic/plan.json";

/// Helper to get absolute path from relative test path
fn fixture_path(relative: &str) -> String {
    let manifest_dir = env!("CARGO_MANIFEST_DIR");
    format!("{manifest_dir}/{relative}")
}

fn basic_plan() -> Plan {
    Plan::from_file(fixture_path(BASIC_PLAN)).expect("Failed to load basic plan")
}

// =============================================================================
// Plan Loading Tests
// =============================================================================

#[test]
fn test_load_plan_from_file() {
    let plan = basic_plan();
    assert_eq!(plan.format_version(), "1.2");
    assert_eq!(plan.resource_count(), 6);
    in_plan(&plan).number_of_resources_equals(6).error_is_nil();
    in_plan(&plan)
        .number_of_resources_equals(1)
        .error_contains("expected 1 resources, got 6");
}

#[test]
fn test_missing_plan_file() {
    let err = Plan::from_file(fixture_path("tests/testdata/nope/plan.json")).unwrap_err();
    assert!(matches!(err, Error::Io { .. }));
}

#[test]
fn test_plan_file_with_invalid_json() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let path = temp_dir.path().join("plan.json");
    fs::write(&path, "{\"format_version\": ").expect("Failed to write plan");

    let err = Plan::from_file(&path).unwrap_err();
    assert!(err.to_string().starts_with("Failed to parse plan"));
}

// =============================================================================
// Resource And Attribute Tests
// =============================================================================

#[test]
fn test_resource_and_key_assertions() {
    let plan = basic_plan();
    let resource = in_plan(&plan).that("local_file.test");

    resource.exists().error_is_nil();
    resource.key("content").has_value("test").error_is_nil();
    resource.key("content_base64").exists().error_is_nil();
    resource.key("content_base64").has_value(Value::Null).error_is_nil();
    resource.key("not_exists").does_not_exist().error_is_nil();
    resource
        .key("content")
        .has_value("throwError")
        .error_contains("local_file.test: attribute content, planned value test not equal to assertion throwError");
}

#[test]
fn test_resource_in_child_module() {
    let plan = basic_plan();
    in_plan(&plan)
        .that("module.test.local_file.test")
        .key("content")
        .has_value("test")
        .error_is_nil();
}

#[test]
fn test_typed_attributes() {
    let plan = basic_plan();
    let resource = in_plan(&plan).that("module.test.azapi_resource.test");

    resource.key("count").has_value(2).error_is_nil();
    resource.key("count").has_value(2.0).error_is_nil();
    resource
        .key("locations")
        .has_value(vec!["westeurope", "northeurope"])
        .error_is_nil();
    resource.key("tags").query("owner").has_value("platform").error_is_nil();
    resource.key("locations").query("#").has_value(2).error_is_nil();
}

#[test]
fn test_nested_json_strings() {
    let plan = basic_plan();
    let body = in_plan(&plan)
        .that("module.test.azapi_resource.test")
        .key("body");

    body.query("properties.mode").has_value("Incremental").error_is_nil();
    body.query("properties.template.resources.#.type")
        .has_value(vec!["a", "b"])
        .error_is_nil();

    // Parameters are JSON encoded again inside the body.
    body.query("properties.parameters")
        .query("sku.value")
        .has_value("Standard")
        .error_is_nil();
    body.query("properties.parameters.sku.value")
        .exists()
        .error_contains("not found when expected");
}

#[test]
fn test_query_errors_are_deferred() {
    let plan = basic_plan();
    let content = in_plan(&plan).that("local_file.test").key("content");

    let query = content.query("a").query("b").query("c");
    let err = query.has_value("x").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::MalformedJson);
    assert!(err.message().starts_with("local_file.test.content?a: "));
}

#[test]
fn test_json_predicates() {
    let plan = basic_plan();
    in_plan(&plan)
        .that("local_file.test_array_json")
        .key("content")
        .contains_json_value(|raw| {
            let items: Vec<Value> = serde_json::from_slice(raw)?;
            Ok::<_, serde_json::Error>(Some(items.len() == 1 && items[0]["test"] == "test"))
        })
        .error_is_nil();

    in_plan(&plan)
        .that("local_file.test_empty_json")
        .key("content")
        .contains_json_value(|_| Ok::<_, String>(Some(true)))
        .error_contains("key content was empty");
}

#[test]
fn test_change_actions() {
    let plan = basic_plan();
    let replaced = in_plan(&plan).that("module.test.local_file.test");
    replaced.has_action(Action::Delete).error_is_nil();
    replaced.has_action(Action::Create).error_is_nil();

    let change = plan.resource_change("module.test.local_file.test").unwrap();
    assert_eq!(change.module_address.as_deref(), Some("module.test"));
    assert_eq!(change.change.before["content"], "old");
}

// =============================================================================
// Output Tests
// =============================================================================

#[test]
fn test_planned_outputs() {
    let plan = basic_plan();
    plan.output_ref("file_name").has_value("test.txt").error_is_nil();
    plan.output_ref("file_id").does_not_exist().error_is_nil();
}

#[test]
fn test_applied_outputs_from_file() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let path = temp_dir.path().join("outputs.json");
    fs::write(
        &path,
        r#"{
            "ids": {"sensitive": false, "type": ["list", "string"], "value": ["a", "b"]},
            "settings": {"sensitive": false, "type": "string", "value": "{\"tier\":\"premium\"}"}
        }"#,
    )
    .expect("Failed to write outputs");

    let outputs = Outputs::from_file(&path).unwrap();
    outputs.output_ref("ids").query("1").has_value("b").error_is_nil();
    outputs
        .output_ref("settings")
        .query("tier")
        .has_value("premium")
        .error_is_nil();
    outputs
        .output_ref("missing")
        .query("tier")
        .exists()
        .error_contains("output.missing: not found when expected");
}
