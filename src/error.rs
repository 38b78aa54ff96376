//! Error and diagnostic types shared by the loader, the generator and the runtime.

use std::fmt;
use std::path::PathBuf;

use crate::ids::ConnectionId;

/// Fatal failure while loading a specification document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpecError {
    /// The path does not point at an existing file.
    NotFound {
        /// Path as given by the caller
        path: PathBuf,
    },
    /// The file exists but its contents are not a usable specification.
    InvalidFormat {
        /// Path as given by the caller
        path: PathBuf,
        /// Parser message or structural complaint
        reason: String,
    },
}

impl fmt::Display for SpecError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SpecError::NotFound { path } => {
                write!(f, "specification file '{}' not found", path.display())
            }
            SpecError::InvalidFormat { path, reason } => {
                write!(
                    f,
                    "invalid specification format in '{}': {}",
                    path.display(),
                    reason
                )
            }
        }
    }
}

impl std::error::Error for SpecError {}

/// Non-fatal finding recorded while loading a specification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpecWarning {
    /// The declared `asyncapi` version is not a 3.x version (or is missing).
    UnsupportedVersion {
        /// The declared version, if any
        found: Option<String>,
    },
}

impl fmt::Display for SpecWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SpecWarning::UnsupportedVersion { found: Some(version) } => write!(
                f,
                "generator targets AsyncAPI 3.x, found version {version}"
            ),
            SpecWarning::UnsupportedVersion { found: None } => {
                write!(f, "generator targets AsyncAPI 3.x, no version declared")
            }
        }
    }
}

/// A schema reference that could not be turned into a concrete type.
///
/// Recorded during model building; the affected type degrades to
/// `serde_json::Value` and generation continues.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolutionFailure {
    /// Where the reference was found, e.g. `schemas.Device.properties.owner`
    pub location: String,
    /// The referenced schema name
    pub reference: String,
    /// What went wrong
    pub kind: ResolutionFailureKind,
}

/// Why a reference could not be resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolutionFailureKind {
    /// No schema with that name exists
    Missing,
    /// The reference chain loops back on itself without passing through a record
    Cycle,
}

impl fmt::Display for ResolutionFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let what = match self.kind {
            ResolutionFailureKind::Missing => "unknown schema",
            ResolutionFailureKind::Cycle => "cyclic reference to schema",
        };
        write!(
            f,
            "{} '{}' at {}; using serde_json::Value",
            what, self.reference, self.location
        )
    }
}

impl std::error::Error for ResolutionFailure {}

/// Failure observed by a running client.
///
/// None of these stop the client. Transport failures are handed to the
/// registered error handlers; the rest are logged where they happen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientError {
    /// Handshake failed or the transport broke while reading
    ConnectionFailure {
        /// Client that observed the failure, as carried on its log lines
        connection_id: ConnectionId,
        /// Endpoint the client was talking to
        url: String,
        /// Transport error text
        reason: String,
    },
    /// An outbound frame could not be serialized or written
    SendFailure {
        /// Serializer or transport error text
        reason: String,
    },
    /// An inbound frame was not valid JSON text
    DecodeFailure {
        /// Decoder error text
        reason: String,
    },
    /// A message handler returned an error or panicked
    HandlerFailure {
        /// Discriminator of the message being handled
        message_type: String,
        /// Error or panic text
        reason: String,
    },
    /// An operation needed an open connection
    NotConnected,
}

impl fmt::Display for ClientError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClientError::ConnectionFailure { url, reason, .. } => {
                write!(f, "connection to {url} failed: {reason}")
            }
            ClientError::SendFailure { reason } => write!(f, "failed to send message: {reason}"),
            ClientError::DecodeFailure { reason } => {
                write!(f, "failed to decode message: {reason}")
            }
            ClientError::HandlerFailure {
                message_type,
                reason,
            } => write!(f, "handler for '{message_type}' failed: {reason}"),
            ClientError::NotConnected => write!(f, "not connected to server"),
        }
    }
}

impl std::error::Error for ClientError {}
