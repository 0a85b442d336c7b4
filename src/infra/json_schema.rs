//! A JSON Schema subset for validating frontmatter objects.
//!
//! Supported keywords: `type` (single or list, `"null"` for nullable),
//! `properties`, `required`, `additionalProperties` (boolean), `enum`,
//! `items`, and `anyOf` for the optional-wrapper pattern
//! (`anyOf: [{...}, {type: null}]`). Unknown keywords are ignored.

use std::collections::BTreeMap;

use serde::Deserialize;
use serde_json::Value;

use crate::domain::{FieldShape, Frontmatter, FrontmatterValidator, SCHEMA_KEY, ValidationMode};

/// `type` may be a single name or a list of names.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum TypeDecl {
    One(String),
    Many(Vec<String>),
}

impl TypeDecl {
    fn names(&self) -> Vec<&str> {
        match self {
            TypeDecl::One(name) => vec![name.as_str()],
            TypeDecl::Many(names) => names.iter().map(String::as_str).collect(),
        }
    }
}

/// One schema node.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldSchema {
    #[serde(rename = "type")]
    pub types: Option<TypeDecl>,
    #[serde(default)]
    pub properties: BTreeMap<String, FieldSchema>,
    #[serde(default)]
    pub required: Vec<String>,
    /// Only the boolean form is interpreted; a schema object counts as `true`.
    pub additional_properties: Option<Value>,
    #[serde(rename = "enum")]
    pub enum_values: Option<Vec<Value>>,
    pub items: Option<Box<FieldSchema>>,
    #[serde(default)]
    pub any_of: Vec<FieldSchema>,
}

impl FieldShape for FieldSchema {
    fn type_name(&self) -> String {
        let inner = self.unwrap_nullable();
        let names: Vec<&str> = inner
            .types
            .as_ref()
            .map(|t| t.names().into_iter().filter(|n| *n != "null").collect())
            .unwrap_or_default();
        if names.is_empty() {
            "any".to_string()
        } else {
            names.join(" | ")
        }
    }

    fn unwrap_nullable(&self) -> &Self {
        let non_null: Vec<&FieldSchema> = self
            .any_of
            .iter()
            .filter(|branch| !branch.is_null_only())
            .collect();
        if non_null.len() == 1 && non_null.len() < self.any_of.len() {
            non_null[0]
        } else {
            self
        }
    }
}

impl FieldSchema {
    fn is_null_only(&self) -> bool {
        self.types
            .as_ref()
            .is_some_and(|t| t.names().iter().all(|n| *n == "null"))
    }

    fn is_nullable(&self) -> bool {
        self.types
            .as_ref()
            .is_some_and(|t| t.names().contains(&"null"))
            || self.any_of.iter().any(FieldSchema::is_null_only)
    }

    fn allows_additional(&self, mode: ValidationMode) -> bool {
        match self.additional_properties {
            Some(Value::Bool(allowed)) => allowed,
            Some(_) => true,
            None => mode == ValidationMode::Permissive,
        }
    }

    fn check(&self, path: &str, value: &Value, mode: ValidationMode, errors: &mut Vec<String>) {
        if value.is_null() && self.is_nullable() {
            return;
        }
        let shape = self.unwrap_nullable();

        if let Some(types) = &shape.types {
            let names = types.names();
            if !names.iter().any(|name| value_has_type(value, name)) {
                errors.push(format!(
                    "{}: expected {}, got {}",
                    describe(path),
                    shape.type_name(),
                    json_type_name(value)
                ));
                return;
            }
        }

        if let Some(allowed) = &shape.enum_values
            && !allowed.contains(value)
        {
            let options: Vec<String> = allowed.iter().map(Value::to_string).collect();
            errors.push(format!(
                "{}: value {} is not one of [{}]",
                describe(path),
                value,
                options.join(", ")
            ));
        }

        match value {
            Value::Object(map) => shape.check_object(path, map, mode, errors),
            Value::Array(items) => {
                if let Some(item_schema) = &shape.items {
                    for (i, item) in items.iter().enumerate() {
                        item_schema.check(&format!("{}[{}]", path, i), item, mode, errors);
                    }
                }
            }
            _ => {}
        }
    }

    fn check_object(
        &self,
        path: &str,
        map: &serde_json::Map<String, Value>,
        mode: ValidationMode,
        errors: &mut Vec<String>,
    ) {
        for name in &self.required {
            if !map.contains_key(name) {
                errors.push(format!("missing required field '{}'", join(path, name)));
            }
        }

        for (key, value) in map {
            match self.properties.get(key) {
                Some(schema) => schema.check(&join(path, key), value, mode, errors),
                None => {
                    let top_level_schema_key = path.is_empty() && key == SCHEMA_KEY;
                    let constrained = !self.properties.is_empty()
                        || self.additional_properties == Some(Value::Bool(false));
                    if constrained && !top_level_schema_key && !self.allows_additional(mode) {
                        errors.push(format!("unexpected field '{}'", join(path, key)));
                    }
                }
            }
        }
    }
}

/// A loaded frontmatter schema.
#[derive(Debug, Clone, PartialEq)]
pub struct JsonSchema {
    root: FieldSchema,
}

impl JsonSchema {
    pub fn new(root: FieldSchema) -> Self {
        Self { root }
    }

    pub fn from_json_str(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text).map(Self::new)
    }

    pub fn from_yaml_str(text: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(text).map(Self::new)
    }

    pub fn root(&self) -> &FieldSchema {
        &self.root
    }
}

impl FrontmatterValidator for JsonSchema {
    fn validate(&self, frontmatter: &Frontmatter, mode: ValidationMode) -> Vec<String> {
        let mut errors = Vec::new();
        self.root.check_object("", frontmatter, mode, &mut errors);
        errors
    }
}

fn value_has_type(value: &Value, name: &str) -> bool {
    match name {
        "string" => value.is_string(),
        "number" => value.is_number(),
        "integer" => value.is_i64() || value.is_u64() || value.as_f64().is_some_and(|f| f.fract() == 0.0),
        "boolean" => value.is_boolean(),
        "array" => value.is_array(),
        "object" => value.is_object(),
        "null" => value.is_null(),
        _ => true,
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn join(path: &str, key: &str) -> String {
    if path.is_empty() {
        key.to_string()
    } else {
        format!("{}.{}", path, key)
    }
}

fn describe(path: &str) -> String {
    if path.is_empty() {
        "frontmatter".to_string()
    } else {
        format!("field '{}'", path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn schema(value: Value) -> JsonSchema {
        JsonSchema::new(serde_json::from_value(value).unwrap())
    }

    fn fm(value: Value) -> Frontmatter {
        value.as_object().cloned().unwrap()
    }

    fn skill_schema() -> JsonSchema {
        schema(json!({
            "type": "object",
            "properties": {
                "name": {"type": "string"},
                "description": {"type": "string"},
                "version": {"type": ["integer", "null"]},
                "status": {"enum": ["draft", "published"]},
                "tags": {"type": "array", "items": {"type": "string"}},
                "owner": {"anyOf": [{"type": "object", "properties": {"email": {"type": "string"}}, "required": ["email"]}, {"type": "null"}]}
            },
            "required": ["name", "description"]
        }))
    }

    #[test]
    fn missing_required_field_is_reported() {
        let errors = skill_schema().validate(&fm(json!({"name": "X"})), ValidationMode::Permissive);
        assert_eq!(errors, vec!["missing required field 'description'"]);
    }

    #[test]
    fn valid_frontmatter_passes() {
        let errors = skill_schema().validate(
            &fm(json!({"name": "X", "description": "d", "version": null, "tags": ["a"]})),
            ValidationMode::Strict,
        );
        assert!(errors.is_empty(), "{:?}", errors);
    }

    #[test]
    fn type_mismatch_names_both_types() {
        let errors = skill_schema().validate(
            &fm(json!({"name": 3, "description": "d", "version": "one"})),
            ValidationMode::Permissive,
        );
        assert_eq!(
            errors,
            vec![
                "field 'name': expected string, got number",
                "field 'version': expected integer, got string",
            ]
        );
    }

    #[test]
    fn enum_and_items_are_checked() {
        let errors = skill_schema().validate(
            &fm(json!({"name": "X", "description": "d", "status": "gone", "tags": ["ok", 1]})),
            ValidationMode::Permissive,
        );
        assert_eq!(errors.len(), 2);
        assert!(errors[0].contains("status"));
        assert_eq!(errors[1], "field 'tags[1]': expected string, got number");
    }

    #[test]
    fn strict_mode_rejects_undeclared_fields() {
        let data = fm(json!({"name": "X", "description": "d", "extra": true}));
        assert!(skill_schema().validate(&data, ValidationMode::Permissive).is_empty());
        assert_eq!(
            skill_schema().validate(&data, ValidationMode::Strict),
            vec!["unexpected field 'extra'"]
        );
    }

    #[test]
    fn explicit_additional_properties_overrides_mode() {
        let closed = schema(json!({"properties": {"a": {}}, "additionalProperties": false}));
        assert_eq!(
            closed.validate(&fm(json!({"b": 1})), ValidationMode::Permissive),
            vec!["unexpected field 'b'"]
        );

        let open = schema(json!({"properties": {"a": {}}, "additionalProperties": true}));
        assert!(open.validate(&fm(json!({"b": 1})), ValidationMode::Strict).is_empty());
    }

    #[test]
    fn schema_key_is_never_undeclared() {
        let data = fm(json!({"name": "X", "description": "d", "$schema": "s.json"}));
        assert!(skill_schema().validate(&data, ValidationMode::Strict).is_empty());
    }

    #[test]
    fn nested_optional_object_is_unwrapped() {
        let errors = skill_schema().validate(
            &fm(json!({"name": "X", "description": "d", "owner": {}})),
            ValidationMode::Permissive,
        );
        assert_eq!(errors, vec!["missing required field 'owner.email'"]);
    }

    #[test]
    fn field_shape_introspection() {
        let root = skill_schema().root().clone();
        assert_eq!(root.properties["version"].type_name(), "integer");
        assert_eq!(root.properties["owner"].type_name(), "object");
        assert_eq!(root.properties["status"].type_name(), "any");
        let owner = root.properties["owner"].unwrap_nullable();
        assert_eq!(owner.required, vec!["email"]);
    }

    #[test]
    fn loads_yaml_schema() {
        let schema = JsonSchema::from_yaml_str("type: object\nrequired: [title]\n").unwrap();
        assert_eq!(
            schema.validate(&Frontmatter::new(), ValidationMode::Permissive),
            vec!["missing required field 'title'"]
        );
    }
}
