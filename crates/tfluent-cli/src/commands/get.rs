//! Get command implementation.

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use serde_json::Value;
use tracing::{debug, info};

use tfluent_core::check::in_plan;
use tfluent_core::{Plan, PlanProvider, ValueRef};

/// Arguments for the get command.
#[derive(Args)]
pub struct GetArgs {
    /// Plan JSON produced by `terraform show -json`
    #[arg(long, env = "TFLUENT_PLAN")]
    pub plan: PathBuf,

    /// Resource address, e.g. `module.storage.azurerm_storage_account.this`
    pub address: String,

    /// Attribute of the resource
    #[arg(short, long)]
    pub key: Option<String>,

    /// Query evaluated against the attribute, or against all attributes without --key
    #[arg(short, long)]
    pub query: Option<String>,
}

/// Runs the get command.
pub fn run(args: &GetArgs) -> Result<()> {
    info!(plan = %args.plan.display(), address = %args.address, "Reading planned value");

    let plan = Plan::from_file(&args.plan)?;
    let value = resolve(&plan, args)?;
    println!("{}", render(&value)?);
    Ok(())
}

/// Finds the value named by the address, key and query.
fn resolve(plan: &Plan, args: &GetArgs) -> Result<Value> {
    let resource = in_plan(plan).that(args.address.as_str());
    resource.exists()?;

    let target = match &args.key {
        Some(key) => {
            let key = resource.key(key.as_str());
            key.exists()?;
            key.value_ref()
        }
        None => {
            let values = plan
                .resource(&args.address)
                .cloned()
                .map(Value::Object)
                .unwrap_or_default();
            ValueRef::found(args.address.as_str(), values)
        }
    };

    let target = match &args.query {
        Some(query) => {
            debug!(query = %query, "Applying query");
            target.query(query)
        }
        None => target,
    };

    Ok(target.into_value()?)
}

/// Prints strings raw and everything else as pretty JSON.
fn render(value: &Value) -> Result<String> {
    Ok(match value {
        Value::String(s) => s.clone(),
        other => serde_json::to_string_pretty(other)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn plan() -> Plan {
        let path = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
            .join("../tfluent-core/tests/testdata/basic/plan.json");
        Plan::from_file(path).unwrap()
    }

    fn args(address: &str, key: Option<&str>, query: Option<&str>) -> GetArgs {
        GetArgs {
            plan: PathBuf::new(),
            address: address.to_string(),
            key: key.map(str::to_string),
            query: query.map(str::to_string),
        }
    }

    #[test]
    fn test_resolve_attribute() {
        let value = resolve(&plan(), &args("local_file.test", Some("content"), None)).unwrap();
        assert_eq!(value, json!("test"));
    }

    #[test]
    fn test_resolve_query_into_json_string() {
        let value = resolve(
            &plan(),
            &args(
                "module.test.azapi_resource.test",
                Some("body"),
                Some("properties.template.resources.#.type"),
            ),
        )
        .unwrap();
        assert_eq!(value, json!(["a", "b"]));
    }

    #[test]
    fn test_resolve_whole_resource_with_query() {
        let value = resolve(
            &plan(),
            &args("module.test.azapi_resource.test", None, Some("tags.owner")),
        )
        .unwrap();
        assert_eq!(value, json!("platform"));

        let all = resolve(&plan(), &args("local_file.test_int", None, None)).unwrap();
        assert_eq!(all["filename"], "test_int.txt");
    }

    #[test]
    fn test_resolve_missing() {
        let err = resolve(&plan(), &args("local_file.nope", None, None)).unwrap_err();
        assert_eq!(err.to_string(), "local_file.nope: resource not found in plan");

        let err = resolve(&plan(), &args("local_file.test", Some("nope"), None)).unwrap_err();
        assert_eq!(err.to_string(), "local_file.test: key nope not found in resource");

        let err = resolve(&plan(), &args("local_file.test", Some("content"), Some("x"))).unwrap_err();
        assert!(err.to_string().starts_with("local_file.test.content?x: "));
    }

    #[test]
    fn test_render() {
        assert_eq!(render(&json!("raw")).unwrap(), "raw");
        assert_eq!(render(&json!(2)).unwrap(), "2");
        assert_eq!(render(&json!({"a": 1})).unwrap(), "{\n  \"a\": 1\n}");
    }
}
