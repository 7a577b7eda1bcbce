//! Nylas node definition and builder.

use crate::client::HttpCaller;
use crate::credentials::Credentials;
use crate::error::NylasError;
use crate::executor::{execute, ExecutionResult, FailPolicy};
use crate::params::NodeParameters;
use crate::resource::{Operation, Resource};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// A configured Nylas node: one operation applied to every input item.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NylasNode {
    /// Node name, for logging
    #[serde(default = "default_name")]
    pub name: String,

    pub resource: Resource,

    pub operation: Operation,

    /// Capture item failures as error records instead of aborting
    #[serde(default)]
    pub continue_on_fail: bool,

    /// Declared parameter values; strings may hold `{{ json.* }}` expressions
    #[serde(default)]
    pub parameters: HashMap<String, Value>,

    /// Credentials; the environment is used when absent
    #[serde(default, skip_serializing)]
    pub credentials: Option<Credentials>,
}

fn default_name() -> String {
    "Nylas".to_string()
}

impl NylasNode {
    /// Start a node for `operation`; the resource follows from it.
    pub fn new(operation: Operation) -> NodeBuilder {
        NodeBuilder::new(operation)
    }

    pub fn fail_policy(&self) -> FailPolicy {
        FailPolicy::from_continue_on_fail(self.continue_on_fail)
    }

    /// Parameter source for a batch, with `resource` and `operation` declared.
    pub fn parameters_for(&self, items: Vec<Value>) -> NodeParameters {
        let mut parameters = self.parameters.clone();
        parameters.insert("resource".to_string(), Value::from(self.resource.as_str()));
        parameters.insert("operation".to_string(), Value::from(self.operation.as_str()));
        NodeParameters::new(parameters, items)
    }

    /// Run the node over `items`.
    pub async fn run<C>(&self, items: Vec<Value>, caller: &C) -> Result<ExecutionResult, NylasError>
    where
        C: HttpCaller + ?Sized,
    {
        tracing::debug!(
            node = %self.name,
            resource = %self.resource,
            operation = %self.operation,
            "Running node"
        );

        let source = self.parameters_for(items);
        execute(&source, source.item_count(), caller, self.fail_policy()).await
    }
}

/// Builder for creating nodes.
#[derive(Debug, Clone)]
pub struct NodeBuilder {
    node: NylasNode,
}

impl NodeBuilder {
    pub fn new(operation: Operation) -> Self {
        Self {
            node: NylasNode {
                name: default_name(),
                resource: operation.resource(),
                operation,
                continue_on_fail: false,
                parameters: HashMap::new(),
                credentials: None,
            },
        }
    }

    pub fn name(mut self, name: &str) -> Self {
        self.node.name = name.to_string();
        self
    }

    /// Set the grant every request is scoped to.
    pub fn grant(self, grant_id: &str) -> Self {
        self.with_param("grantId", grant_id)
    }

    pub fn with_param<V: Into<Value>>(mut self, key: &str, value: V) -> Self {
        self.node.parameters.insert(key.to_string(), value.into());
        self
    }

    /// Add all parameters from a JSON object.
    pub fn with_params(mut self, params: Value) -> Self {
        if let Value::Object(map) = params {
            for (k, v) in map {
                self.node.parameters.insert(k, v);
            }
        }
        self
    }

    pub fn continue_on_fail(mut self, enabled: bool) -> Self {
        self.node.continue_on_fail = enabled;
        self
    }

    pub fn credentials(mut self, credentials: Credentials) -> Self {
        self.node.credentials = Some(credentials);
        self
    }

    pub fn build(self) -> NylasNode {
        self.node
    }
}

impl From<NodeBuilder> for NylasNode {
    fn from(builder: NodeBuilder) -> Self {
        builder.build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::ParamSource;
    use serde_json::json;

    #[test]
    fn test_node_builder() {
        let node = NylasNode::new(Operation::ListEvents)
            .grant("grant-1")
            .with_param("limit", 10)
            .with_params(json!({"calendarId": "work", "start": 100}))
            .continue_on_fail(true)
            .build();

        assert_eq!(node.resource, Resource::Calendar);
        assert_eq!(node.operation, Operation::ListEvents);
        assert_eq!(node.parameters.get("limit"), Some(&Value::from(10)));
        assert_eq!(node.parameters.get("calendarId"), Some(&json!("work")));
        assert_eq!(node.fail_policy(), FailPolicy::Continue);
    }

    #[test]
    fn test_parameters_declare_resource_and_operation() {
        let node = NylasNode::new(Operation::DeleteContact).build();
        let source = node.parameters_for(vec![json!({})]);

        assert_eq!(source.get_param("resource", 0).unwrap(), Some(json!("contact")));
        assert_eq!(
            source.get_param("operation", 0).unwrap(),
            Some(json!("deleteContact"))
        );
    }
}
