use std::collections::{HashMap, HashSet};

use super::naming::{rust_identifier, to_pascal_case, unique_name};
use crate::error::{ResolutionFailure, ResolutionFailureKind};
use crate::spec::{NamedSchema, PrimitiveType, SchemaDescriptor, SpecDocument};

/// Rust type used wherever a schema cannot be given a concrete type.
pub const GENERIC_TYPE: &str = "serde_json::Value";

/// Names a generated type may not take because generated code relies on them.
const RESERVED_TYPE_NAMES: &[&str] = &[
    "Box", "Option", "Result", "Some", "None", "Ok", "Err", "String", "Vec", "Default",
];

/// Resolves schema descriptors to Rust type expressions.
///
/// Enum and record schemas get a generated type, named once from the Pascal
/// case of the schema name. Everything else is mapped structurally. References
/// are followed by name; a missing target or a reference loop is recorded as a
/// [`ResolutionFailure`] and mapped to [`GENERIC_TYPE`].
pub struct TypeMapper<'a> {
    doc: &'a SpecDocument,
    schemas: HashMap<&'a str, &'a NamedSchema>,
    type_names: HashMap<&'a str, String>,
}

impl<'a> TypeMapper<'a> {
    /// Build a mapper for `doc`, reserving `taken` (e.g. the client type name)
    /// so no schema type collides with it.
    pub fn new(doc: &'a SpecDocument, taken: &[&str]) -> Self {
        let mut seen: HashSet<String> = RESERVED_TYPE_NAMES
            .iter()
            .chain(taken.iter())
            .map(|s| s.to_string())
            .collect();

        let mut schemas = HashMap::new();
        let mut type_names = HashMap::new();
        for named in &doc.schemas {
            schemas.entry(named.name.as_str()).or_insert(named);
            if named.schema.is_emitted_type() && !type_names.contains_key(named.name.as_str()) {
                let base = type_name_for(&named.name);
                type_names.insert(named.name.as_str(), unique_name(&mut seen, &base));
            }
        }
        Self {
            doc,
            schemas,
            type_names,
        }
    }

    /// Generated type name for the enum or record schema `name`.
    pub fn type_name(&self, name: &str) -> Option<&str> {
        self.type_names.get(name).map(String::as_str)
    }

    /// Rust type for `schema`. `location` describes where the schema sits and
    /// is only used in recorded failures.
    pub fn rust_type(
        &self,
        schema: &SchemaDescriptor,
        location: &str,
        failures: &mut Vec<ResolutionFailure>,
    ) -> String {
        let mut visiting = Vec::new();
        self.map(schema, location, &mut visiting, failures)
    }

    fn map(
        &self,
        schema: &SchemaDescriptor,
        location: &str,
        visiting: &mut Vec<String>,
        failures: &mut Vec<ResolutionFailure>,
    ) -> String {
        match schema {
            SchemaDescriptor::Primitive(p) => primitive_type(*p).to_string(),
            SchemaDescriptor::Enum { title, .. } => title
                .as_deref()
                .and_then(|t| self.enum_named(t))
                .unwrap_or("String")
                .to_string(),
            SchemaDescriptor::Record { .. } => GENERIC_TYPE.to_string(),
            SchemaDescriptor::Array(items) => {
                format!("Vec<{}>", self.map(items, location, visiting, failures))
            }
            SchemaDescriptor::Reference(name) => {
                self.map_reference(name, location, visiting, failures)
            }
        }
    }

    fn map_reference(
        &self,
        name: &str,
        location: &str,
        visiting: &mut Vec<String>,
        failures: &mut Vec<ResolutionFailure>,
    ) -> String {
        if let Some(type_name) = self.type_names.get(name) {
            return type_name.clone();
        }
        if visiting.iter().any(|v| v == name) {
            self.record(failures, location, name, ResolutionFailureKind::Cycle);
            return GENERIC_TYPE.to_string();
        }
        let Some(target) = self.schemas.get(name) else {
            self.record(failures, location, name, ResolutionFailureKind::Missing);
            return GENERIC_TYPE.to_string();
        };
        visiting.push(name.to_string());
        let ty = self.map(&target.schema, location, visiting, failures);
        visiting.pop();
        ty
    }

    fn record(
        &self,
        failures: &mut Vec<ResolutionFailure>,
        location: &str,
        reference: &str,
        kind: ResolutionFailureKind,
    ) {
        let failure = ResolutionFailure {
            location: location.to_string(),
            reference: reference.to_string(),
            kind,
        };
        tracing::warn!(location = %location, reference = %reference, "{failure}");
        failures.push(failure);
    }

    /// An inline enum reuses the named enum whose name matches its `title`,
    /// exactly if possible, otherwise by Pascal case.
    fn enum_named(&self, title: &str) -> Option<&str> {
        let wanted = to_pascal_case(title);
        let enums = || {
            self.doc
                .schemas
                .iter()
                .filter(|s| matches!(s.schema, SchemaDescriptor::Enum { .. }))
        };
        enums()
            .find(|s| s.name == title)
            .or_else(|| enums().find(|s| to_pascal_case(&s.name) == wanted))
            .and_then(|s| self.type_name(&s.name))
    }

    /// Name of the record schema `schema` refers to directly, following
    /// reference chains. Arrays are not followed.
    pub fn direct_record(&self, schema: &SchemaDescriptor) -> Option<&'a str> {
        let mut current = schema;
        let mut hops = 0;
        while let SchemaDescriptor::Reference(name) = current {
            let target = self.schemas.get(name.as_str()).copied()?;
            if matches!(target.schema, SchemaDescriptor::Record { .. }) {
                return Some(target.name.as_str());
            }
            hops += 1;
            if hops > self.schemas.len() {
                return None;
            }
            current = &target.schema;
        }
        None
    }

    /// True when a field of record `owner` pointing at record `target` would
    /// make `owner` infinitely sized, i.e. `target` reaches `owner` again
    /// through direct record fields.
    pub fn needs_box(&self, owner: &str, target: &str) -> bool {
        let mut stack = vec![target];
        let mut seen = HashSet::new();
        while let Some(current) = stack.pop() {
            if current == owner {
                return true;
            }
            if !seen.insert(current) {
                continue;
            }
            if let Some(SchemaDescriptor::Record { fields }) =
                self.schemas.get(current).map(|s| &s.schema)
            {
                stack.extend(fields.iter().filter_map(|f| self.direct_record(&f.schema)));
            }
        }
        false
    }
}

fn primitive_type(p: PrimitiveType) -> &'static str {
    match p {
        PrimitiveType::String => "String",
        PrimitiveType::Integer => "i64",
        PrimitiveType::Number => "f64",
        PrimitiveType::Boolean => "bool",
        PrimitiveType::Any => GENERIC_TYPE,
    }
}

fn type_name_for(schema_name: &str) -> String {
    let pascal = to_pascal_case(schema_name);
    if pascal.is_empty() {
        return "Schema".to_string();
    }
    rust_identifier(&pascal)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spec::{FieldDescriptor, ServerDescriptor};

    fn doc(schemas: Vec<(&str, SchemaDescriptor)>) -> SpecDocument {
        SpecDocument {
            version: Some("3.0.0".to_string()),
            title: "Test".to_string(),
            description: String::new(),
            server: ServerDescriptor::default(),
            schemas: schemas
                .into_iter()
                .map(|(name, schema)| NamedSchema {
                    name: name.to_string(),
                    description: None,
                    schema,
                })
                .collect(),
            channels: Vec::new(),
            warnings: Vec::new(),
        }
    }

    fn reference(name: &str) -> SchemaDescriptor {
        SchemaDescriptor::Reference(name.to_string())
    }

    fn record(fields: Vec<(&str, SchemaDescriptor)>) -> SchemaDescriptor {
        SchemaDescriptor::Record {
            fields: fields
                .into_iter()
                .map(|(name, schema)| FieldDescriptor {
                    name: name.to_string(),
                    schema,
                    required: true,
                    description: None,
                })
                .collect(),
        }
    }

    fn status_enum() -> SchemaDescriptor {
        SchemaDescriptor::Enum {
            values: vec!["high".to_string(), "low".to_string()],
            title: None,
        }
    }

    #[test]
    fn test_primitive_mapping() {
        let d = doc(vec![]);
        let mapper = TypeMapper::new(&d, &[]);
        let mut failures = Vec::new();
        let cases = [
            (PrimitiveType::String, "String"),
            (PrimitiveType::Integer, "i64"),
            (PrimitiveType::Number, "f64"),
            (PrimitiveType::Boolean, "bool"),
            (PrimitiveType::Any, GENERIC_TYPE),
        ];
        for (p, expected) in cases {
            assert_eq!(
                mapper.rust_type(&SchemaDescriptor::Primitive(p), "x", &mut failures),
                expected
            );
        }
        assert!(failures.is_empty());
    }

    #[test]
    fn test_named_types_and_aliases() {
        let d = doc(vec![
            ("gpio-status", status_enum()),
            ("PinId", SchemaDescriptor::Primitive(PrimitiveType::Integer)),
            ("PinList", SchemaDescriptor::Array(Box::new(reference("PinId")))),
            ("gpio_message", record(vec![])),
        ]);
        let mapper = TypeMapper::new(&d, &[]);
        let mut failures = Vec::new();
        assert_eq!(mapper.rust_type(&reference("gpio-status"), "x", &mut failures), "GpioStatus");
        assert_eq!(mapper.rust_type(&reference("gpio_message"), "x", &mut failures), "GpioMessage");
        assert_eq!(mapper.rust_type(&reference("PinId"), "x", &mut failures), "i64");
        assert_eq!(mapper.rust_type(&reference("PinList"), "x", &mut failures), "Vec<i64>");
        assert!(failures.is_empty());
    }

    #[test]
    fn test_missing_reference_degrades_to_generic() {
        let d = doc(vec![]);
        let mapper = TypeMapper::new(&d, &[]);
        let mut failures = Vec::new();
        let ty = mapper.rust_type(
            &SchemaDescriptor::Array(Box::new(reference("Nope"))),
            "schemas.A.properties.b",
            &mut failures,
        );
        assert_eq!(ty, "Vec<serde_json::Value>");
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].reference, "Nope");
        assert_eq!(failures[0].location, "schemas.A.properties.b");
        assert_eq!(failures[0].kind, ResolutionFailureKind::Missing);
    }

    #[test]
    fn test_alias_cycle_degrades_to_generic() {
        let d = doc(vec![("A", reference("B")), ("B", reference("A"))]);
        let mapper = TypeMapper::new(&d, &[]);
        let mut failures = Vec::new();
        assert_eq!(mapper.rust_type(&reference("A"), "x", &mut failures), GENERIC_TYPE);
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].kind, ResolutionFailureKind::Cycle);
    }

    #[test]
    fn test_inline_enum_uses_titled_schema() {
        let d = doc(vec![("GpioStatus", status_enum())]);
        let mapper = TypeMapper::new(&d, &[]);
        let mut failures = Vec::new();
        let titled = SchemaDescriptor::Enum {
            values: vec!["high".to_string()],
            title: Some("GpioStatus".to_string()),
        };
        let untitled = SchemaDescriptor::Enum {
            values: vec!["high".to_string()],
            title: None,
        };
        assert_eq!(mapper.rust_type(&titled, "x", &mut failures), "GpioStatus");
        assert_eq!(mapper.rust_type(&untitled, "x", &mut failures), "String");
    }

    #[test]
    fn test_type_names_avoid_reserved_and_taken() {
        let d = doc(vec![
            ("String", record(vec![])),
            ("DeviceClient", record(vec![])),
        ]);
        let mapper = TypeMapper::new(&d, &["DeviceClient"]);
        assert_eq!(mapper.type_name("String"), Some("String_1"));
        assert_eq!(mapper.type_name("DeviceClient"), Some("DeviceClient_1"));
    }

    #[test]
    fn test_needs_box_for_recursive_records() {
        let d = doc(vec![
            ("Node", record(vec![("next", reference("Node")), ("children", SchemaDescriptor::Array(Box::new(reference("Node"))))])),
            ("Left", record(vec![("right", reference("Right"))])),
            ("Right", record(vec![("left", reference("Left"))])),
            ("Leaf", record(vec![])),
        ]);
        let mapper = TypeMapper::new(&d, &[]);
        assert!(mapper.needs_box("Node", "Node"));
        assert!(mapper.needs_box("Left", "Right"));
        assert!(!mapper.needs_box("Node", "Leaf"));
        assert_eq!(
            mapper.direct_record(&SchemaDescriptor::Array(Box::new(reference("Node")))),
            None
        );
    }
}
