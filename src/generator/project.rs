use std::fs;
use std::path::{Path, PathBuf};

use super::model::ClientModel;
use super::templates::{
    render_cargo_toml, render_client_rs, render_lib_rs, render_main_rs, render_readme,
    render_rustfmt_toml,
};
use crate::error::ResolutionFailure;
use crate::spec::{load_spec, SpecDocument};

/// Path of the client source inside a generated crate.
pub const CLIENT_SOURCE_PATH: &str = "src/client.rs";

/// Options for [`generate_client`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerateOptions {
    /// Directory the generated crate is written to
    pub output_dir: PathBuf,
    /// Depend on the runtime crate by path instead of by registry version
    pub runtime_path: Option<PathBuf>,
}

impl Default for GenerateOptions {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("generated-client"),
            runtime_path: None,
        }
    }
}

/// One generated file, path relative to the crate root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedFile {
    path: PathBuf,
    contents: String,
}

impl GeneratedFile {
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn contents(&self) -> &str {
        &self.contents
    }
}

/// The output of one generation run. Read-only once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedArtifact {
    client_name: String,
    package_name: String,
    files: Vec<GeneratedFile>,
    resolution_failures: Vec<ResolutionFailure>,
}

impl GeneratedArtifact {
    pub fn client_name(&self) -> &str {
        &self.client_name
    }

    pub fn package_name(&self) -> &str {
        &self.package_name
    }

    /// Files in emission order.
    pub fn files(&self) -> &[GeneratedFile] {
        &self.files
    }

    /// Contents of the file at `path` (relative, `/`-separated).
    pub fn file(&self, path: &str) -> Option<&str> {
        self.files
            .iter()
            .find(|f| f.path == Path::new(path))
            .map(GeneratedFile::contents)
    }

    /// The generated client source.
    pub fn client_source(&self) -> &str {
        self.file(CLIENT_SOURCE_PATH).unwrap_or_default()
    }

    pub fn resolution_failures(&self) -> &[ResolutionFailure] {
        &self.resolution_failures
    }
}

/// Render a client crate for `doc` that depends on the published runtime.
pub fn render_client(doc: &SpecDocument) -> anyhow::Result<GeneratedArtifact> {
    render_client_with(doc, None)
}

/// Render a client crate for `doc`; see [`GenerateOptions::runtime_path`].
///
/// Pure: the same document always renders to the same artifact.
pub fn render_client_with(
    doc: &SpecDocument,
    runtime_path: Option<&Path>,
) -> anyhow::Result<GeneratedArtifact> {
    let model = ClientModel::build(doc);
    let files = vec![
        file("Cargo.toml", render_cargo_toml(&model, runtime_path)?),
        file("README.md", render_readme(&model)?),
        file("rustfmt.toml", render_rustfmt_toml()?),
        file("src/lib.rs", render_lib_rs(&model)?),
        file(CLIENT_SOURCE_PATH, render_client_rs(&model)?),
        file("src/main.rs", render_main_rs(&model)?),
    ];
    Ok(GeneratedArtifact {
        client_name: model.client_name,
        package_name: model.package_name,
        files,
        resolution_failures: model.resolution_failures,
    })
}

fn file(path: &str, contents: String) -> GeneratedFile {
    GeneratedFile {
        path: PathBuf::from(path),
        contents,
    }
}

/// Write every file of `artifact` below `output_dir`, creating directories and
/// overwriting existing files. Returns the written paths.
pub fn write_artifact(
    artifact: &GeneratedArtifact,
    output_dir: &Path,
) -> anyhow::Result<Vec<PathBuf>> {
    let mut written = Vec::with_capacity(artifact.files.len());
    for generated in &artifact.files {
        let path = output_dir.join(&generated.path);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, &generated.contents)?;
        tracing::debug!(path = %path.display(), "wrote generated file");
        written.push(path);
    }
    Ok(written)
}

/// Load `spec_path`, render the client and write it to `options.output_dir`.
pub fn generate_client(
    spec_path: &Path,
    options: &GenerateOptions,
) -> anyhow::Result<GeneratedArtifact> {
    let doc = load_spec(spec_path)?;
    let artifact = render_client_with(&doc, options.runtime_path.as_deref())?;
    write_artifact(&artifact, &options.output_dir)?;
    tracing::info!(
        spec = %spec_path.display(),
        output = %options.output_dir.display(),
        client = %artifact.client_name,
        files = artifact.files.len(),
        unresolved = artifact.resolution_failures.len(),
        "generated client"
    );
    Ok(artifact)
}
