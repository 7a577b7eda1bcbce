//! YAML node definitions.

use crate::NylasNode;
use anyhow::{Context, Result};
use std::path::Path;

/// Parse a node definition from a YAML string.
///
/// # Example
///
/// ```rust
/// use nylas_workflow::parse_yaml;
///
/// let yaml = r#"
/// resource: calendar
/// operation: listEvents
/// parameters:
///   grantId: "{{ json.grant }}"
///   calendarId: primary
///   limit: 20
/// "#;
///
/// let node = parse_yaml(yaml).unwrap();
/// assert_eq!(node.operation.as_str(), "listEvents");
/// ```
pub fn parse_yaml(yaml: &str) -> Result<NylasNode> {
    let node: NylasNode = serde_yaml::from_str(yaml).context("Failed to parse node YAML")?;

    validate(&node).with_context(|| format!("Invalid node '{}'", node.name))?;

    Ok(node)
}

/// Load and parse a node definition from a YAML file.
///
/// ```rust,no_run
/// use nylas_workflow::yaml::load_file;
///
/// let node = load_file("send-digest.yaml")?;
/// # Ok::<(), anyhow::Error>(())
/// ```
pub fn load_file(path: impl AsRef<Path>) -> Result<NylasNode> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read node file: {}", path.display()))?;

    let node = parse_yaml(&content)
        .with_context(|| format!("Failed to load node from {}", path.display()))?;

    tracing::debug!(node = %node.name, operation = %node.operation, "Loaded node definition");
    Ok(node)
}

/// Validate a node definition.
fn validate(node: &NylasNode) -> Result<()> {
    if node.name.trim().is_empty() {
        anyhow::bail!("Node name cannot be empty");
    }

    if node.operation.resource() != node.resource {
        anyhow::bail!(
            "Operation '{}' does not belong to resource '{}'",
            node.operation,
            node.resource
        );
    }

    if !node.parameters.contains_key("grantId") {
        anyhow::bail!("Node must declare a grantId parameter");
    }

    Ok(())
}
