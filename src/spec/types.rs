use crate::error::SpecWarning;

/// An AsyncAPI document reduced to what client generation needs.
///
/// Schemas and channels keep the order in which the document declares them.
#[derive(Debug, Clone, PartialEq)]
pub struct SpecDocument {
    /// Declared `asyncapi` version, if any
    pub version: Option<String>,
    pub title: String,
    pub description: String,
    pub server: ServerDescriptor,
    /// `components.schemas`, in declaration order
    pub schemas: Vec<NamedSchema>,
    /// `channels`, in declaration order
    pub channels: Vec<ChannelDescriptor>,
    /// Non-fatal findings from loading
    pub warnings: Vec<SpecWarning>,
}

impl SpecDocument {
    /// Look up a component schema by its declared name.
    pub fn schema(&self, name: &str) -> Option<&NamedSchema> {
        self.schemas.iter().find(|s| s.name == name)
    }

    /// Every message of every channel, channels first, in declaration order.
    pub fn messages(&self) -> impl Iterator<Item = (&ChannelDescriptor, &MessageDescriptor)> {
        self.channels
            .iter()
            .flat_map(|c| c.messages.iter().map(move |m| (c, m)))
    }
}

/// The endpoint the generated client connects to by default.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerDescriptor {
    pub protocol: String,
    pub host: String,
    pub port: Option<String>,
    pub pathname: Option<String>,
}

impl ServerDescriptor {
    /// `protocol://host[:port][pathname]`
    pub fn url(&self) -> String {
        let mut url = format!("{}://{}", self.protocol, self.host);
        if let Some(port) = &self.port {
            url.push(':');
            url.push_str(port);
        }
        if let Some(path) = &self.pathname {
            if !path.starts_with('/') {
                url.push('/');
            }
            url.push_str(path);
        }
        url
    }
}

impl Default for ServerDescriptor {
    fn default() -> Self {
        Self {
            protocol: "wss".to_string(),
            host: "localhost".to_string(),
            port: None,
            pathname: None,
        }
    }
}

/// A schema from `components.schemas`.
#[derive(Debug, Clone, PartialEq)]
pub struct NamedSchema {
    pub name: String,
    pub description: Option<String>,
    pub schema: SchemaDescriptor,
}

/// Structural description of a JSON schema.
#[derive(Debug, Clone, PartialEq)]
pub enum SchemaDescriptor {
    Primitive(PrimitiveType),
    /// A string restricted to a list of literals
    Enum {
        values: Vec<String>,
        /// `title` of the schema, used to find the named enum of an inline enum
        title: Option<String>,
    },
    Record {
        fields: Vec<FieldDescriptor>,
    },
    Array(Box<SchemaDescriptor>),
    /// `$ref` reduced to the referenced schema name
    Reference(String),
}

impl SchemaDescriptor {
    pub fn is_emitted_type(&self) -> bool {
        matches!(self, SchemaDescriptor::Enum { .. } | SchemaDescriptor::Record { .. })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrimitiveType {
    String,
    Integer,
    Number,
    Boolean,
    /// Untyped or unsupported; maps to the generic JSON value
    Any,
}

/// One property of a record schema.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldDescriptor {
    pub name: String,
    pub schema: SchemaDescriptor,
    pub required: bool,
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChannelDescriptor {
    /// Key under `channels`
    pub name: String,
    pub address: Option<String>,
    pub messages: Vec<MessageDescriptor>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MessageDescriptor {
    /// Key under the channel's `messages`; used verbatim as the wire `type`
    pub name: String,
    pub summary: Option<String>,
    pub payload: Option<SchemaDescriptor>,
}
