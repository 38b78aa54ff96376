use serde_json::Value;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use super::schema::{describe_schema, ref_name};
use super::types::{
    ChannelDescriptor, MessageDescriptor, NamedSchema, ServerDescriptor, SpecDocument,
};
use crate::error::{SpecError, SpecWarning};

pub const DEFAULT_TITLE: &str = "AsyncAPI Client";
pub const DEFAULT_DESCRIPTION: &str = "Generated AsyncAPI WebSocket client";

/// True for the AsyncAPI versions the generator is written against (3.x).
pub fn is_supported_version(version: &str) -> bool {
    version.starts_with("3.")
}

fn is_yaml(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.eq_ignore_ascii_case("yaml") || e.eq_ignore_ascii_case("yml"))
        .unwrap_or(false)
}

/// Load and parse an AsyncAPI document.
///
/// `.yaml`/`.yml` files are read as YAML, everything else as JSON. A version
/// outside 3.x is only a warning; it is logged and kept on the document.
pub fn load_spec(path: impl AsRef<Path>) -> Result<SpecDocument, SpecError> {
    let path = path.as_ref();
    let content = fs::read_to_string(path).map_err(|e| match e.kind() {
        ErrorKind::NotFound => SpecError::NotFound {
            path: path.to_path_buf(),
        },
        _ => SpecError::InvalidFormat {
            path: path.to_path_buf(),
            reason: e.to_string(),
        },
    })?;

    let value: Value = if is_yaml(path) {
        serde_yaml::from_str(&content).map_err(|e| SpecError::InvalidFormat {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?
    } else {
        serde_json::from_str(&content).map_err(|e| SpecError::InvalidFormat {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?
    };

    let doc = build_document(path, &value)?;
    tracing::debug!(
        spec = %path.display(),
        schemas = doc.schemas.len(),
        channels = doc.channels.len(),
        "loaded specification"
    );
    Ok(doc)
}

/// Build a [`SpecDocument`] from an already parsed document tree.
///
/// `source` is only used in error messages.
pub fn build_document(source: &Path, root: &Value) -> Result<SpecDocument, SpecError> {
    if !root.is_object() {
        return Err(SpecError::InvalidFormat {
            path: source.to_path_buf(),
            reason: "top-level value must be an object".to_string(),
        });
    }

    let version = root.get("asyncapi").and_then(scalar_string);
    let mut warnings = Vec::new();
    if !version.as_deref().is_some_and(is_supported_version) {
        let warning = SpecWarning::UnsupportedVersion {
            found: version.clone(),
        };
        tracing::warn!(spec = %source.display(), "{warning}");
        warnings.push(warning);
    }

    let info = root.get("info");
    let title = info
        .and_then(|i| i.get("title"))
        .and_then(Value::as_str)
        .unwrap_or(DEFAULT_TITLE)
        .to_string();
    let description = info
        .and_then(|i| i.get("description"))
        .and_then(Value::as_str)
        .unwrap_or(DEFAULT_DESCRIPTION)
        .to_string();

    let schemas = root
        .pointer("/components/schemas")
        .and_then(Value::as_object)
        .map(|schemas| {
            schemas
                .iter()
                .map(|(name, schema)| NamedSchema {
                    name: name.clone(),
                    description: schema
                        .get("description")
                        .and_then(Value::as_str)
                        .map(str::to_string),
                    schema: describe_schema(schema),
                })
                .collect()
        })
        .unwrap_or_default();

    let channels = root
        .get("channels")
        .and_then(Value::as_object)
        .map(|channels| {
            channels
                .iter()
                .map(|(name, channel)| extract_channel(root, name, channel))
                .collect()
        })
        .unwrap_or_default();

    Ok(SpecDocument {
        version,
        title,
        description,
        server: extract_server(root),
        schemas,
        channels,
        warnings,
    })
}

fn scalar_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// First declared server, falling back to `wss://localhost`.
fn extract_server(root: &Value) -> ServerDescriptor {
    let defaults = ServerDescriptor::default();
    let Some(server) = root
        .get("servers")
        .and_then(Value::as_object)
        .and_then(|servers| servers.values().next())
    else {
        return defaults;
    };

    ServerDescriptor {
        protocol: server
            .get("protocol")
            .and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or(defaults.protocol),
        host: server
            .get("host")
            .and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or(defaults.host),
        port: server.get("port").and_then(scalar_string),
        pathname: server
            .get("pathname")
            .and_then(Value::as_str)
            .filter(|p| !p.is_empty())
            .map(str::to_string),
    }
}

fn extract_channel(root: &Value, name: &str, channel: &Value) -> ChannelDescriptor {
    let messages = channel
        .get("messages")
        .and_then(Value::as_object)
        .map(|messages| {
            messages
                .iter()
                .map(|(message_name, message)| {
                    let resolved = resolve_message(root, name, message_name, message);
                    MessageDescriptor {
                        name: message_name.clone(),
                        summary: resolved
                            .and_then(|m| m.get("summary").or_else(|| m.get("description")))
                            .and_then(Value::as_str)
                            .map(str::to_string),
                        payload: resolved
                            .and_then(|m| m.get("payload"))
                            .map(|payload| describe_schema(payload_schema(payload))),
                    }
                })
                .collect()
        })
        .unwrap_or_default();

    ChannelDescriptor {
        name: name.to_string(),
        address: channel
            .get("address")
            .and_then(Value::as_str)
            .map(str::to_string),
        messages,
    }
}

/// Follow a message `$ref` (e.g. `#/components/messages/GpioMessage`) within the document.
fn resolve_message<'a>(
    root: &'a Value,
    channel: &str,
    message_name: &str,
    message: &'a Value,
) -> Option<&'a Value> {
    let Some(reference) = message.get("$ref").and_then(Value::as_str) else {
        return Some(message);
    };
    let target = reference
        .strip_prefix('#')
        .and_then(|pointer| root.pointer(pointer))
        .or_else(|| {
            root.pointer("/components/messages")
                .and_then(|m| m.get(ref_name(reference)))
        });
    if target.is_none() {
        tracing::warn!(
            channel = %channel,
            message = %message_name,
            reference = %reference,
            "message reference not found; payload treated as untyped"
        );
    }
    target
}

/// Unwrap a multi-format schema object (`{schemaFormat, schema}`) to its schema.
fn payload_schema(payload: &Value) -> &Value {
    match (payload.get("schemaFormat"), payload.get("schema")) {
        (Some(_), Some(schema)) => schema,
        _ => payload,
    }
}
