use askama::Template;
use std::path::Path;

use super::model::{ClientModel, MessageModel};

/// Split free text into lines for doc comments, dropping trailing whitespace.
pub(crate) fn doc_lines(text: Option<&str>) -> Vec<String> {
    text.map(|t| t.lines().map(|l| l.trim_end().to_string()).collect())
        .unwrap_or_default()
}

/// Rust string literal for `s`, quotes included.
pub(crate) fn rust_str_literal(s: &str) -> String {
    format!("{s:?}")
}

/// TOML basic string for `s`, quotes included.
pub(crate) fn toml_str_literal(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c.is_control() => out.push_str(&format!("\\u{:04X}", c as u32)),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

/// Enum data for the client template
#[derive(Debug, Clone)]
pub struct EnumView {
    pub type_name: String,
    pub doc: Vec<String>,
    pub variants: Vec<VariantView>,
}

#[derive(Debug, Clone)]
pub struct VariantView {
    pub ident: String,
    /// Wire literal as a Rust string literal
    pub literal: String,
}

/// Record data for the client template
#[derive(Debug, Clone)]
pub struct RecordView {
    pub type_name: String,
    pub doc: Vec<String>,
    pub fields: Vec<FieldView>,
}

#[derive(Debug, Clone)]
pub struct FieldView {
    pub ident: String,
    pub ty: String,
    pub optional: bool,
    pub renamed: bool,
    /// Property name as a Rust string literal
    pub wire_literal: String,
    pub doc: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct ChannelView {
    pub name: String,
    pub messages: Vec<MessageView>,
}

#[derive(Debug, Clone)]
pub struct MessageView {
    pub name: String,
    /// Message name as a Rust string literal
    pub literal: String,
    pub suffix: String,
    pub payload_type: String,
    pub doc: Vec<String>,
}

impl From<&MessageModel> for MessageView {
    fn from(m: &MessageModel) -> Self {
        Self {
            name: m.name.clone(),
            literal: rust_str_literal(&m.name),
            suffix: m.method_suffix.clone(),
            payload_type: m.payload_type.clone(),
            doc: doc_lines(m.summary.as_deref()),
        }
    }
}

/// Template data for `src/client.rs`, the generated client itself
#[derive(Template)]
#[template(path = "client.rs.txt", escape = "none")]
pub struct ClientTemplateData {
    pub title: String,
    pub description: Vec<String>,
    pub client_name: String,
    pub default_url: String,
    pub enums: Vec<EnumView>,
    pub records: Vec<RecordView>,
    pub channels: Vec<ChannelView>,
    pub messages: Vec<MessageView>,
}

impl ClientTemplateData {
    pub fn from_model(model: &ClientModel) -> Self {
        let enums = model
            .enums
            .iter()
            .map(|e| EnumView {
                type_name: e.type_name.clone(),
                doc: match &e.description {
                    Some(d) => doc_lines(Some(d)),
                    None => vec![format!("Values of the `{}` schema.", e.schema_name)],
                },
                variants: e
                    .variants
                    .iter()
                    .map(|v| VariantView {
                        ident: v.ident.clone(),
                        literal: rust_str_literal(&v.value),
                    })
                    .collect(),
            })
            .collect();

        let records = model
            .records
            .iter()
            .map(|r| RecordView {
                type_name: r.type_name.clone(),
                doc: match &r.description {
                    Some(d) => doc_lines(Some(d)),
                    None => vec![format!("Data of the `{}` schema.", r.schema_name)],
                },
                fields: r
                    .fields
                    .iter()
                    .map(|f| FieldView {
                        ident: f.ident.clone(),
                        ty: f.ty.clone(),
                        optional: f.optional,
                        renamed: f.needs_rename(),
                        wire_literal: rust_str_literal(&f.wire_name),
                        doc: doc_lines(f.description.as_deref()),
                    })
                    .collect(),
            })
            .collect();

        let channels = model
            .channels
            .iter()
            .map(|c| ChannelView {
                name: c.name.clone(),
                messages: c.messages.iter().map(MessageView::from).collect(),
            })
            .collect();

        Self {
            title: model.title.clone(),
            description: doc_lines(Some(&model.description)),
            client_name: model.client_name.clone(),
            default_url: rust_str_literal(&model.default_url),
            enums,
            records,
            channels,
            messages: model.messages().map(MessageView::from).collect(),
        }
    }
}

/// Template data for `src/main.rs`, an example binary using the client
#[derive(Template)]
#[template(path = "main.rs.txt", escape = "none")]
pub struct MainRsTemplateData {
    pub title: String,
    pub crate_name: String,
    pub client_name: String,
    pub messages: Vec<MessageView>,
}

/// Template data for `src/lib.rs`
#[derive(Template)]
#[template(path = "lib.rs.txt", escape = "none")]
pub struct LibRsTemplateData {
    pub title: String,
}

/// Template data for the generated crate's `Cargo.toml`
#[derive(Template)]
#[template(path = "Cargo.toml.txt", escape = "none")]
pub struct CargoTomlTemplateData {
    pub package_name: String,
    pub crate_name: String,
    /// TOML string literal
    pub description: String,
    /// Complete dependency line for the runtime crate
    pub runtime_dependency: String,
}

/// Formatting configuration for the generated crate
#[derive(Template)]
#[template(path = "rustfmt.toml.txt", escape = "none")]
pub struct RustfmtTemplate;

/// README entry for an emitted type
#[derive(Debug, Clone)]
pub struct TypeSummary {
    pub type_name: String,
    pub kind: &'static str,
    pub members: String,
}

/// Template data for the generated crate's `README.md`
#[derive(Template)]
#[template(path = "README.md.txt", escape = "none")]
pub struct ReadmeTemplateData {
    pub title: String,
    pub description: String,
    pub package_name: String,
    pub crate_name: String,
    pub client_name: String,
    pub default_url: String,
    pub types: Vec<TypeSummary>,
    pub messages: Vec<MessageView>,
}

pub fn render_client_rs(model: &ClientModel) -> anyhow::Result<String> {
    Ok(ClientTemplateData::from_model(model).render()?)
}

pub fn render_main_rs(model: &ClientModel) -> anyhow::Result<String> {
    Ok(MainRsTemplateData {
        title: model.title.clone(),
        crate_name: model.crate_name.clone(),
        client_name: model.client_name.clone(),
        messages: model.messages().map(MessageView::from).collect(),
    }
    .render()?)
}

pub fn render_lib_rs(model: &ClientModel) -> anyhow::Result<String> {
    Ok(LibRsTemplateData {
        title: model.title.clone(),
    }
    .render()?)
}

/// Render the manifest. With `runtime_path` the runtime crate is a path
/// dependency, otherwise a registry dependency on this crate's version.
pub fn render_cargo_toml(
    model: &ClientModel,
    runtime_path: Option<&Path>,
) -> anyhow::Result<String> {
    let runtime_dependency = match runtime_path {
        Some(path) => format!(
            "{} = {{ path = {} }}",
            env!("CARGO_PKG_NAME"),
            toml_str_literal(&path.to_string_lossy())
        ),
        None => format!(
            "{} = {}",
            env!("CARGO_PKG_NAME"),
            toml_str_literal(env!("CARGO_PKG_VERSION"))
        ),
    };
    Ok(CargoTomlTemplateData {
        package_name: model.package_name.clone(),
        crate_name: model.crate_name.clone(),
        description: toml_str_literal(&model.description),
        runtime_dependency,
    }
    .render()?)
}

pub fn render_rustfmt_toml() -> anyhow::Result<String> {
    Ok(RustfmtTemplate.render()?)
}

pub fn render_readme(model: &ClientModel) -> anyhow::Result<String> {
    let mut types: Vec<TypeSummary> = model
        .enums
        .iter()
        .map(|e| TypeSummary {
            type_name: e.type_name.clone(),
            kind: "enum",
            members: e
                .variants
                .iter()
                .map(|v| format!("`{}`", v.value))
                .collect::<Vec<_>>()
                .join(", "),
        })
        .collect();
    types.extend(model.records.iter().map(|r| TypeSummary {
        type_name: r.type_name.clone(),
        kind: "struct",
        members: r
            .fields
            .iter()
            .map(|f| format!("`{}`", f.wire_name))
            .collect::<Vec<_>>()
            .join(", "),
    }));

    Ok(ReadmeTemplateData {
        title: model.title.clone(),
        description: model.description.clone(),
        package_name: model.package_name.clone(),
        crate_name: model.crate_name.clone(),
        client_name: model.client_name.clone(),
        default_url: model.default_url.clone(),
        types,
        messages: model.messages().map(MessageView::from).collect(),
    }
    .render()?)
}
