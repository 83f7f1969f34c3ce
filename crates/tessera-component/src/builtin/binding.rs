use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::component::value_text;
use crate::ComponentContext;

/// Where a component parameter gets its value.
///
/// In configuration a binding is written `{"literal": ...}` or
/// `{"property": "name"}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Binding {
    /// A fixed value.
    Literal(Value),
    /// A page property, read on every render.
    Property(String),
}

impl Binding {
    #[must_use]
    pub fn literal(value: impl Into<Value>) -> Self {
        Self::Literal(value.into())
    }

    #[must_use]
    pub fn property(name: impl Into<String>) -> Self {
        Self::Property(name.into())
    }

    /// Current value; a missing property resolves to `null`.
    #[must_use]
    pub fn resolve(&self, ctx: &ComponentContext<'_>) -> Value {
        match self {
            Self::Literal(value) => value.clone(),
            Self::Property(name) => ctx.property(name).cloned().unwrap_or(Value::Null),
        }
    }

    /// Current value as display text.
    #[must_use]
    pub fn text(&self, ctx: &ComponentContext<'_>) -> String {
        value_text(&self.resolve(ctx))
    }
}

impl Default for Binding {
    fn default() -> Self {
        Self::Literal(Value::Null)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn deserializes_both_forms() {
        let literal: Binding = serde_json::from_value(json!({"literal": "hi"})).expect("literal");
        assert_eq!(literal, Binding::literal("hi"));

        let property: Binding =
            serde_json::from_value(json!({"property": "name"})).expect("property");
        assert_eq!(property, Binding::property("name"));
    }
}
