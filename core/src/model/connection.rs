#![deny(missing_docs)]

//! # Connections
//!
//! Base URL templates with `{variable}` placeholders. A declaration is tagged
//! `connection` and carries a `url` field plus an optional `variables`
//! member whose children each have an optional `default` and an optional
//! `enum` container of allowed literal values.

use super::{invalid, model_element, required, required_name, Element};
use crate::alias::Declared;
use crate::declaration::FromNode;
use crate::error::{AppError, AppResult};
use crate::tree::{Node, NodeKind, TagReader};
use indexmap::IndexMap;
use regex::{Captures, Regex};
use std::sync::LazyLock;

static PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{([^}]+)}").expect("Invalid regex constant"));

/// A named placeholder in a connection URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionVariable {
    /// Placeholder name.
    pub name: String,
    /// Used when no value is supplied.
    pub default_value: Option<String>,
    /// Permitted values; `None` accepts any string.
    pub allowed_values: Option<Vec<String>>,
    /// Shared attributes.
    pub element: Element,
}

impl ConnectionVariable {
    /// A variable accepting any value, without default.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            default_value: None,
            allowed_values: None,
            element: Element::new(),
        }
    }

    /// Sets the default.
    pub fn with_default(mut self, value: impl Into<String>) -> Self {
        self.default_value = Some(value.into());
        self
    }

    /// Restricts the permitted values.
    pub fn with_allowed_values<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.allowed_values = Some(values.into_iter().map(Into::into).collect());
        self
    }

    /// Returns `true` if `value` is permitted.
    pub fn accepts(&self, value: &str) -> bool {
        self.allowed_values
            .as_ref()
            .map_or(true, |allowed| allowed.iter().any(|candidate| candidate == value))
    }

    fn from_node(node: Node<'_>) -> AppResult<Self> {
        Ok(Self {
            name: required_name(node)?,
            default_value: node.member_value("default").map(str::to_string),
            allowed_values: node.member("enum").map(|values| {
                values
                    .walk()
                    .filter(|value| value.kind() == NodeKind::Literal)
                    .filter_map(|value| value.value().map(str::to_string))
                    .collect()
            }),
            element: Element::from_node(node),
        })
    }
}

/// A base URL template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Connection {
    /// Declared name, absent for inline connections.
    pub name: Option<String>,
    /// URL template, e.g. `https://{region}.example.com/v1`.
    pub url: String,
    /// Placeholder definitions.
    pub variables: Vec<ConnectionVariable>,
    /// Shared attributes.
    pub element: Element,
}

impl Connection {
    /// A connection without variables.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            name: None,
            url: url.into(),
            variables: Vec::new(),
            element: Element::new(),
        }
    }

    /// Adds a variable.
    pub fn with_variable(mut self, variable: ConnectionVariable) -> Self {
        self.variables.push(variable);
        self
    }

    /// Looks a variable up by name.
    pub fn variable(&self, name: &str) -> Option<&ConnectionVariable> {
        self.variables.iter().find(|variable| variable.name == name)
    }

    /// Placeholder names in the URL template, in order of appearance.
    pub fn placeholders(&self) -> Vec<&str> {
        PLACEHOLDER
            .captures_iter(&self.url)
            .filter_map(|cap| cap.get(1))
            .map(|name| name.as_str())
            .collect()
    }

    /// Checks that every placeholder is defined and every default is permitted.
    pub fn validate(&self) -> AppResult<()> {
        if let Some(missing) = self
            .placeholders()
            .into_iter()
            .find(|placeholder| self.variable(placeholder).is_none())
        {
            return Err(AppError::Validation(format!(
                "Connection '{}' uses undefined variable '{}'",
                self.url, missing
            )));
        }

        for variable in &self.variables {
            if variable.allowed_values.as_ref().is_some_and(Vec::is_empty) {
                return Err(AppError::Validation(format!(
                    "Connection variable '{}' has an empty enum",
                    variable.name
                )));
            }
            if let Some(default) = &variable.default_value {
                if !variable.accepts(default) {
                    return Err(AppError::Validation(format!(
                        "Default '{}' of variable '{}' is not an allowed value",
                        default, variable.name
                    )));
                }
            }
        }
        Ok(())
    }

    /// Substitutes placeholders with `values`, falling back to defaults.
    ///
    /// # Errors
    ///
    /// `Validation` if a placeholder has neither a value nor a default, or a
    /// value is outside the variable's allowed set.
    pub fn expand(&self, values: &IndexMap<String, String>) -> AppResult<String> {
        let mut resolved: IndexMap<&str, &str> = IndexMap::new();
        for placeholder in self.placeholders() {
            let variable = self.variable(placeholder);
            let value = values
                .get(placeholder)
                .map(String::as_str)
                .or_else(|| variable.and_then(|variable| variable.default_value.as_deref()))
                .ok_or_else(|| {
                    AppError::Validation(format!("No value for connection variable '{}'", placeholder))
                })?;

            if let Some(variable) = variable {
                if !variable.accepts(value) {
                    return Err(AppError::Validation(format!(
                        "Value '{}' is not allowed for connection variable '{}'",
                        value, placeholder
                    )));
                }
            }
            resolved.insert(placeholder, value);
        }

        let url = PLACEHOLDER.replace_all(&self.url, |cap: &Captures<'_>| {
            resolved.get(&cap[1]).copied().unwrap_or_default().to_string()
        });
        Ok(url.into_owned())
    }
}

model_element!(Connection, ConnectionVariable);

impl FromNode for Connection {
    fn from_node(node: Node<'_>) -> AppResult<Self> {
        let variables = match node.member("variables") {
            Some(variables) => variables
                .children()
                .filter(|variable| variable.kind() == NodeKind::Member)
                .map(ConnectionVariable::from_node)
                .collect::<AppResult<Vec<_>>>()?,
            None => Vec::new(),
        };

        let connection = Self {
            name: node.name().map(str::to_string),
            url: required(node, "url")?.to_string(),
            variables,
            element: Element::from_node(node),
        };
        connection
            .validate()
            .map_err(|err| invalid(node, err.to_string()))?;
        Ok(connection)
    }
}

impl Declared for Connection {
    const KIND: &'static str = "connection";

    fn is_declaration(node: Node<'_>) -> bool {
        node.has_tag("connection")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::{Document, DocumentSpec, NodeSpec};
    use pretty_assertions::assert_eq;

    fn regional() -> Connection {
        let spec = DocumentSpec::new("servers.yaml").declaration(
            NodeSpec::interface("regional")
                .tag("connection")
                .child(NodeSpec::field("url", "https://{region}.example.com/{version}"))
                .child(NodeSpec::member("variables").children([
                    NodeSpec::member("region").children([
                        NodeSpec::field("default", "eu"),
                        NodeSpec::member("enum").child(
                            NodeSpec::container()
                                .children([NodeSpec::literal("eu"), NodeSpec::literal("us")]),
                        ),
                    ]),
                    NodeSpec::member("version").describe("API version"),
                ])),
        );
        let document = Document::from_spec(&spec);
        let connection = Connection::from_node(document.declarations().next().unwrap()).unwrap();
        connection
    }

    #[test]
    fn test_from_node() {
        let connection = regional();
        assert_eq!(connection.name.as_deref(), Some("regional"));
        assert_eq!(connection.placeholders(), vec!["region", "version"]);
        assert_eq!(
            connection.variables,
            vec![
                ConnectionVariable::new("region")
                    .with_default("eu")
                    .with_allowed_values(["eu", "us"]),
                {
                    let mut version = ConnectionVariable::new("version");
                    version.element = Element::new().describe("API version");
                    version
                },
            ]
        );
    }

    #[test]
    fn test_expand_uses_defaults_and_checks_allowed_values() {
        let connection = regional();
        let mut values = IndexMap::new();
        values.insert("version".to_string(), "v2".to_string());
        assert_eq!(connection.expand(&values).unwrap(), "https://eu.example.com/v2");

        values.insert("region".to_string(), "ap".to_string());
        assert!(matches!(connection.expand(&values), Err(AppError::Validation(_))));

        values.shift_remove("version");
        values.insert("region".to_string(), "us".to_string());
        assert!(matches!(connection.expand(&values), Err(AppError::Validation(_))));
    }

    #[test]
    fn test_undefined_placeholder_is_invalid() {
        let connection = Connection::new("https://{tenant}.example.com");
        assert!(matches!(connection.validate(), Err(AppError::Validation(_))));

        let spec = DocumentSpec::new("servers.yaml").declaration(
            NodeSpec::interface("tenant")
                .tag("connection")
                .child(NodeSpec::field("url", "https://{tenant}.example.com")),
        );
        let document = Document::from_spec(&spec);
        assert!(matches!(
            Connection::from_node(document.declarations().next().unwrap()),
            Err(AppError::InvalidDeclaration { .. })
        ));
    }

    #[test]
    fn test_empty_braces_are_not_placeholders() {
        let connection = Connection::new("https://{}.example.com/{version}")
            .with_variable(ConnectionVariable::new("version").with_default("v1"));
        assert_eq!(connection.placeholders(), vec!["version"]);
        assert!(connection.validate().is_ok());
        assert_eq!(
            connection.expand(&IndexMap::new()).unwrap(),
            "https://{}.example.com/v1"
        );
    }

    #[test]
    fn test_substituted_values_are_not_expanded_again() {
        let connection = Connection::new("https://{host}/{path}")
            .with_variable(ConnectionVariable::new("host"))
            .with_variable(ConnectionVariable::new("path"));
        let mut values = IndexMap::new();
        values.insert("host".to_string(), "{path}".to_string());
        values.insert("path".to_string(), "v1".to_string());
        assert_eq!(connection.expand(&values).unwrap(), "https://{path}/v1");
    }

    #[test]
    fn test_empty_enum_is_rejected() {
        let connection = Connection::new("https://{region}.example.com")
            .with_variable(ConnectionVariable::new("region").with_allowed_values(Vec::<String>::new()));
        assert!(matches!(connection.validate(), Err(AppError::Validation(_))));
    }

    #[test]
    fn test_any_value_without_allowed_set() {
        let variable = ConnectionVariable::new("anything");
        assert!(variable.accepts("whatever"));
        let restricted = variable.with_allowed_values(["a"]);
        assert!(!restricted.accepts("b"));
    }
}
