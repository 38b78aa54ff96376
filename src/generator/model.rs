use std::collections::HashSet;

use super::naming::{
    enum_constant_name, rust_identifier, sanitize_identifier, to_kebab_case, to_pascal_case,
    to_snake_case, unique_name,
};
use super::schema::{TypeMapper, GENERIC_TYPE};
use crate::error::ResolutionFailure;
use crate::spec::{FieldDescriptor, SchemaDescriptor, SpecDocument};

/// Per-message method suffixes that would collide with the client's own methods
/// (`send_message`, `send_raw_message`).
const RESERVED_METHOD_SUFFIXES: &[&str] = &["message", "raw_message"];

/// Everything the emitter needs, with every output identifier derived once.
#[derive(Debug, Clone, PartialEq)]
pub struct ClientModel {
    pub title: String,
    pub description: String,
    /// `<Pascal(title)>Client`
    pub client_name: String,
    /// `<kebab(Pascal(title))>-client`
    pub package_name: String,
    /// Package name as a Rust crate identifier
    pub crate_name: String,
    pub default_url: String,
    pub enums: Vec<EnumModel>,
    pub records: Vec<RecordModel>,
    pub channels: Vec<ChannelModel>,
    /// References that degraded to `serde_json::Value`, in discovery order
    pub resolution_failures: Vec<ResolutionFailure>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumModel {
    pub schema_name: String,
    pub type_name: String,
    pub description: Option<String>,
    pub variants: Vec<EnumVariantModel>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumVariantModel {
    /// Constant name, e.g. `HIGH`
    pub ident: String,
    /// Literal as it appears on the wire, e.g. `high`
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordModel {
    pub schema_name: String,
    pub type_name: String,
    pub description: Option<String>,
    /// Required fields first, then optional ones, each group in declaration order
    pub fields: Vec<FieldModel>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldModel {
    pub ident: String,
    /// Property name in the schema
    pub wire_name: String,
    /// Full field type, including `Option<..>` for optional fields
    pub ty: String,
    pub optional: bool,
    pub description: Option<String>,
}

impl FieldModel {
    /// True when serde needs a `rename` to map the field to its property name.
    pub fn needs_rename(&self) -> bool {
        self.ident.trim_start_matches("r#") != self.wire_name
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelModel {
    pub name: String,
    pub address: Option<String>,
    pub messages: Vec<MessageModel>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageModel {
    /// Wire discriminator, verbatim from the channel's `messages` key
    pub name: String,
    /// snake_case suffix of `send_<suffix>` / `on_<suffix>`
    pub method_suffix: String,
    pub payload_type: String,
    pub summary: Option<String>,
}

impl ClientModel {
    /// Derive the model from a loaded document.
    pub fn build(doc: &SpecDocument) -> Self {
        let pascal_title = pascal_title(&doc.title);
        let client_name = format!("{pascal_title}Client");
        let package_name = format!("{}-client", to_kebab_case(&pascal_title));
        let crate_name = package_name.replace('-', "_");

        let mapper = TypeMapper::new(doc, &[client_name.as_str()]);
        let mut failures = Vec::new();
        let mut enums = Vec::new();
        let mut records = Vec::new();

        for named in &doc.schemas {
            let Some(type_name) = mapper.type_name(&named.name) else {
                continue;
            };
            match &named.schema {
                SchemaDescriptor::Enum { values, .. } => enums.push(EnumModel {
                    schema_name: named.name.clone(),
                    type_name: type_name.to_string(),
                    description: named.description.clone(),
                    variants: enum_variants(values),
                }),
                SchemaDescriptor::Record { fields } => records.push(RecordModel {
                    schema_name: named.name.clone(),
                    type_name: type_name.to_string(),
                    description: named.description.clone(),
                    fields: record_fields(&mapper, &named.name, fields, &mut failures),
                }),
                _ => {}
            }
        }

        let mut seen_methods: HashSet<String> = RESERVED_METHOD_SUFFIXES
            .iter()
            .map(|s| s.to_string())
            .collect();
        let channels = doc
            .channels
            .iter()
            .map(|channel| ChannelModel {
                name: channel.name.clone(),
                address: channel.address.clone(),
                messages: channel
                    .messages
                    .iter()
                    .map(|message| {
                        let location = format!(
                            "channels.{}.messages.{}.payload",
                            channel.name, message.name
                        );
                        let payload_type = message
                            .payload
                            .as_ref()
                            .map(|p| mapper.rust_type(p, &location, &mut failures))
                            .unwrap_or_else(|| GENERIC_TYPE.to_string());
                        let suffix = sanitize_identifier(&to_snake_case(&message.name));
                        MessageModel {
                            name: message.name.clone(),
                            method_suffix: unique_name(&mut seen_methods, &suffix),
                            payload_type,
                            summary: message.summary.clone(),
                        }
                    })
                    .collect(),
            })
            .collect();

        ClientModel {
            title: doc.title.clone(),
            description: doc.description.clone(),
            client_name,
            package_name,
            crate_name,
            default_url: doc.server.url(),
            enums,
            records,
            channels,
            resolution_failures: failures,
        }
    }

    /// All messages across channels, in declaration order.
    pub fn messages(&self) -> impl Iterator<Item = &MessageModel> {
        self.channels.iter().flat_map(|c| c.messages.iter())
    }
}

/// Pascal case of the title with anything but ASCII letters and digits dropped.
fn pascal_title(title: &str) -> String {
    let pascal: String = to_pascal_case(title)
        .chars()
        .filter(char::is_ascii_alphanumeric)
        .collect();
    match pascal.chars().next() {
        None => "AsyncApi".to_string(),
        Some(c) if c.is_ascii_digit() => format!("Api{pascal}"),
        Some(_) => pascal,
    }
}

fn enum_variants(values: &[String]) -> Vec<EnumVariantModel> {
    let mut seen = HashSet::new();
    values
        .iter()
        .map(|value| EnumVariantModel {
            ident: unique_name(&mut seen, &rust_identifier(&enum_constant_name(value))),
            value: value.clone(),
        })
        .collect()
}

fn record_fields(
    mapper: &TypeMapper<'_>,
    record: &str,
    fields: &[FieldDescriptor],
    failures: &mut Vec<ResolutionFailure>,
) -> Vec<FieldModel> {
    let mut seen = HashSet::new();
    let (required, optional): (Vec<&FieldDescriptor>, Vec<&FieldDescriptor>) =
        fields.iter().partition(|f| f.required);

    required
        .into_iter()
        .chain(optional)
        .map(|field| {
            let location = format!("schemas.{record}.properties.{}", field.name);
            let mut ty = mapper.rust_type(&field.schema, &location, failures);
            if mapper
                .direct_record(&field.schema)
                .is_some_and(|target| mapper.needs_box(record, target))
            {
                ty = format!("Box<{ty}>");
            }
            if !field.required {
                ty = format!("Option<{ty}>");
            }
            FieldModel {
                ident: unique_name(&mut seen, &rust_identifier(&to_snake_case(&field.name))),
                wire_name: field.name.clone(),
                ty,
                optional: !field.required,
                description: field.description.clone(),
            }
        })
        .collect()
}
