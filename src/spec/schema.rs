use serde_json::Value;
use std::collections::HashSet;

use super::types::{FieldDescriptor, PrimitiveType, SchemaDescriptor};

/// Reduce a JSON pointer style reference to its last segment.
///
/// `#/components/schemas/GpioStatus` → `GpioStatus`
pub fn ref_name(reference: &str) -> &str {
    reference.rsplit('/').next().unwrap_or(reference)
}

/// Describe a JSON schema structurally. References are recorded by name and
/// never followed here.
pub fn describe_schema(schema: &Value) -> SchemaDescriptor {
    if let Some(reference) = schema.get("$ref").and_then(Value::as_str) {
        return SchemaDescriptor::Reference(ref_name(reference).to_string());
    }

    let ty = schema.get("type").and_then(Value::as_str);
    match ty {
        Some("string") => match schema.get("enum").and_then(Value::as_array) {
            Some(values) if !values.is_empty() => SchemaDescriptor::Enum {
                values: values.iter().map(enum_literal).collect(),
                title: schema
                    .get("title")
                    .and_then(Value::as_str)
                    .map(str::to_string),
            },
            _ => SchemaDescriptor::Primitive(PrimitiveType::String),
        },
        Some("integer") => SchemaDescriptor::Primitive(PrimitiveType::Integer),
        Some("number") => SchemaDescriptor::Primitive(PrimitiveType::Number),
        Some("boolean") => SchemaDescriptor::Primitive(PrimitiveType::Boolean),
        Some("array") => {
            let items = schema
                .get("items")
                .map(describe_schema)
                .unwrap_or(SchemaDescriptor::Primitive(PrimitiveType::Any));
            SchemaDescriptor::Array(Box::new(items))
        }
        Some("object") => describe_record(schema),
        None if schema.get("properties").is_some() => describe_record(schema),
        _ => SchemaDescriptor::Primitive(PrimitiveType::Any),
    }
}

fn enum_literal(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn describe_record(schema: &Value) -> SchemaDescriptor {
    let required: HashSet<&str> = schema
        .get("required")
        .and_then(Value::as_array)
        .map(|r| r.iter().filter_map(Value::as_str).collect())
        .unwrap_or_default();

    let fields = schema
        .get("properties")
        .and_then(Value::as_object)
        .map(|props| {
            props
                .iter()
                .map(|(name, prop)| FieldDescriptor {
                    name: name.clone(),
                    schema: describe_schema(prop),
                    required: required.contains(name.as_str()),
                    description: prop
                        .get("description")
                        .and_then(Value::as_str)
                        .map(str::to_string),
                })
                .collect()
        })
        .unwrap_or_default();

    SchemaDescriptor::Record { fields }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_ref_name() {
        assert_eq!(ref_name("#/components/schemas/GpioStatus"), "GpioStatus");
        assert_eq!(ref_name("Plain"), "Plain");
    }

    #[test]
    fn test_describe_primitives() {
        assert_eq!(
            describe_schema(&json!({"type": "string"})),
            SchemaDescriptor::Primitive(PrimitiveType::String)
        );
        assert_eq!(
            describe_schema(&json!({"type": "integer"})),
            SchemaDescriptor::Primitive(PrimitiveType::Integer)
        );
        assert_eq!(
            describe_schema(&json!({"type": "number"})),
            SchemaDescriptor::Primitive(PrimitiveType::Number)
        );
        assert_eq!(
            describe_schema(&json!({"type": "boolean"})),
            SchemaDescriptor::Primitive(PrimitiveType::Boolean)
        );
        assert_eq!(
            describe_schema(&json!({})),
            SchemaDescriptor::Primitive(PrimitiveType::Any)
        );
    }

    #[test]
    fn test_describe_enum() {
        let schema = json!({"type": "string", "enum": ["high", "low"], "title": "GpioStatus"});
        assert_eq!(
            describe_schema(&schema),
            SchemaDescriptor::Enum {
                values: vec!["high".to_string(), "low".to_string()],
                title: Some("GpioStatus".to_string()),
            }
        );
    }

    #[test]
    fn test_empty_enum_is_plain_string() {
        assert_eq!(
            describe_schema(&json!({"type": "string", "enum": []})),
            SchemaDescriptor::Primitive(PrimitiveType::String)
        );
    }

    #[test]
    fn test_describe_record_keeps_declaration_order() {
        let schema = json!({
            "type": "object",
            "required": ["a"],
            "properties": {
                "b": {"type": "integer"},
                "a": {"type": "string", "description": "first"}
            }
        });
        let SchemaDescriptor::Record { fields } = describe_schema(&schema) else {
            panic!("expected record");
        };
        assert_eq!(fields.len(), 2);
        assert_eq!(fields[0].name, "b");
        assert!(!fields[0].required);
        assert_eq!(fields[1].name, "a");
        assert!(fields[1].required);
        assert_eq!(fields[1].description.as_deref(), Some("first"));
    }

    #[test]
    fn test_describe_array_and_reference() {
        let schema = json!({"type": "array", "items": {"$ref": "#/components/schemas/Pin"}});
        assert_eq!(
            describe_schema(&schema),
            SchemaDescriptor::Array(Box::new(SchemaDescriptor::Reference("Pin".to_string())))
        );
        assert_eq!(
            describe_schema(&json!({"type": "array"})),
            SchemaDescriptor::Array(Box::new(SchemaDescriptor::Primitive(PrimitiveType::Any)))
        );
    }
}
