//! Message and error handler registries.
//!
//! Every message name known when the client was generated becomes a slot in
//! [`HandlerRegistry`]. A slot holds any number of handlers, invoked in
//! registration order. Each handler runs under `catch_unwind`, so an `Err` or a
//! panic in one handler is logged and the remaining handlers still run.
//!
//! Both registries are append-only. Dispatch copies the handler list out of
//! the lock before invoking anything, so a handler may itself register
//! handlers without deadlocking.

use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::{Arc, PoisonError, RwLock};

use tracing::{debug, error, warn};

use super::envelope::Envelope;
use crate::error::ClientError;

/// Return type of message handlers.
pub type HandlerResult = anyhow::Result<()>;

/// A handler for inbound envelopes of one message type.
pub type MessageHandler = Arc<dyn Fn(&Envelope) -> HandlerResult + Send + Sync>;

/// A handler for transport failures.
pub type ErrorHandler = Arc<dyn Fn(&ClientError) + Send + Sync>;

/// Result of dispatching one envelope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DispatchOutcome {
    /// Handlers that were called
    pub invoked: usize,
    /// Of those, handlers that returned an error or panicked
    pub failed: usize,
}

/// Handlers keyed by message type.
#[derive(Default)]
pub struct HandlerRegistry {
    slots: RwLock<HashMap<String, Vec<MessageHandler>>>,
}

impl fmt::Debug for HandlerRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let slots = self.slots.read().unwrap_or_else(PoisonError::into_inner);
        let mut counts: Vec<(&str, usize)> =
            slots.iter().map(|(k, v)| (k.as_str(), v.len())).collect();
        counts.sort_unstable();
        f.debug_struct("HandlerRegistry")
            .field("slots", &counts)
            .finish()
    }
}

impl HandlerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with an empty slot for each of `names`.
    pub fn with_slots<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let slots = names
            .into_iter()
            .map(|name| (name.into(), Vec::new()))
            .collect();
        Self {
            slots: RwLock::new(slots),
        }
    }

    /// Whether `message_type` has a slot, registered handlers or not.
    pub fn has_slot(&self, message_type: &str) -> bool {
        self.slots
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(message_type)
    }

    /// Append `handler` to the slot for `message_type`, creating the slot if
    /// the name was not declared.
    pub fn register(&self, message_type: &str, handler: MessageHandler) {
        let mut slots = self.slots.write().unwrap_or_else(PoisonError::into_inner);
        if !slots.contains_key(message_type) {
            debug!(message_type, "registering handler for undeclared message type");
        }
        slots
            .entry(message_type.to_string())
            .or_default()
            .push(handler);
    }

    pub fn handler_count(&self, message_type: &str) -> usize {
        self.slots
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(message_type)
            .map_or(0, Vec::len)
    }

    /// Invoke every handler registered for the envelope's type, in order.
    pub fn dispatch(&self, envelope: &Envelope) -> DispatchOutcome {
        let handlers: Vec<MessageHandler> = self
            .slots
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&envelope.message_type)
            .cloned()
            .unwrap_or_default();

        if handlers.is_empty() {
            debug!(
                message_type = %envelope.message_type,
                "no handler registered, discarding message"
            );
            return DispatchOutcome::default();
        }

        let mut outcome = DispatchOutcome::default();
        for (index, handler) in handlers.iter().enumerate() {
            outcome.invoked += 1;
            let reason = match catch_unwind(AssertUnwindSafe(|| handler(envelope))) {
                Ok(Ok(())) => continue,
                Ok(Err(err)) => format!("{err:#}"),
                Err(panic) => format!("panicked: {}", panic_message(panic.as_ref())),
            };
            outcome.failed += 1;
            let failure = ClientError::HandlerFailure {
                message_type: envelope.message_type.clone(),
                reason,
            };
            warn!(handler_index = index, error = %failure, "message handler failed");
        }
        outcome
    }
}

/// Handlers for transport failures, called in registration order.
#[derive(Default)]
pub struct ErrorHandlerList {
    handlers: RwLock<Vec<ErrorHandler>>,
}

impl fmt::Debug for ErrorHandlerList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ErrorHandlerList")
            .field("len", &self.len())
            .finish()
    }
}

impl ErrorHandlerList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, handler: ErrorHandler) {
        self.handlers
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(handler);
    }

    pub fn len(&self) -> usize {
        self.handlers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Pass `err` to every handler. A panicking handler is logged and skipped.
    pub fn notify(&self, err: &ClientError) {
        let handlers: Vec<ErrorHandler> = self
            .handlers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        for (index, handler) in handlers.iter().enumerate() {
            if let Err(panic) = catch_unwind(AssertUnwindSafe(|| handler(err))) {
                error!(
                    handler_index = index,
                    panic_message = %panic_message(panic.as_ref()),
                    "error handler panicked"
                );
            }
        }
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}
