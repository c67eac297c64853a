//! Read-only views over plan and output data.
//!
//! Assertions never talk to Terraform directly. They read from a
//! [`PlanProvider`] (resource address to planned attributes) or an
//! [`OutputProvider`] (output name to value). [`Plan`](crate::Plan) and
//! [`Outputs`](crate::Outputs) implement these for Terraform's JSON
//! documents; tests can implement them over in-memory maps.

use serde_json::{Map, Value};

use crate::operative::ValueRef;
use crate::plan::Action;

/// Source of planned resource attributes.
pub trait PlanProvider {
    /// Returns the planned attributes of the resource at `address`.
    fn resource(&self, address: &str) -> Option<&Map<String, Value>>;

    /// Returns the number of resources in the plan.
    fn resource_count(&self) -> usize;

    /// Returns the planned change actions for the resource at `address`.
    fn change_actions(&self, _address: &str) -> Option<&[Action]> {
        None
    }

    /// Returns a reference to attribute `key` of the resource at `address`,
    /// named `"<address>.<key>"`.
    fn attribute(&self, address: &str, key: &str) -> ValueRef {
        self.resource(address).map_or_else(
            || ValueRef::missing(format!("{address}.{key}")),
            |attributes| ValueRef::lookup(address, attributes, key),
        )
    }
}

/// Source of output values.
pub trait OutputProvider {
    /// Returns the value of output `name`.
    fn output(&self, name: &str) -> Option<&Value>;

    /// Returns a reference to output `name`, named `"output.<name>"`.
    ///
    /// Works best with strongly typed outputs (`bool`, `number`, `string`,
    /// `list`, `map`); outputs of type `any` tend to arrive as strings.
    fn output_ref(&self, name: &str) -> ValueRef {
        ValueRef::from_option(format!("output.{name}"), self.output(name))
    }
}

impl<P: PlanProvider + ?Sized> PlanProvider for &P {
    fn resource(&self, address: &str) -> Option<&Map<String, Value>> {
        (**self).resource(address)
    }

    fn resource_count(&self) -> usize {
        (**self).resource_count()
    }

    fn change_actions(&self, address: &str) -> Option<&[Action]> {
        (**self).change_actions(address)
    }
}

impl<O: OutputProvider + ?Sized> OutputProvider for &O {
    fn output(&self, name: &str) -> Option<&Value> {
        (**self).output(name)
    }
}
