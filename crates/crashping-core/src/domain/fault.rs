//! Fault - the payload of an uncaught panic
//!
//! A `Fault` mirrors an exception: a kind, an optional message and an
//! optional originating cause. The fault trigger raises one with
//! [`std::panic::panic_any`]; ordinary `panic!` payloads are converted
//! with [`Fault::from_panic_payload`].

use std::any::Any;
use std::fmt::{self, Display, Formatter};

/// Kind used for the deliberate null-reference fault.
pub const NULL_REFERENCE_KIND: &str = "NullReference";

/// Kind used for panics whose payload is not a [`Fault`].
pub const PANIC_KIND: &str = "panic";

/// An uncaught runtime fault
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fault {
    kind: String,
    message: Option<String>,
    cause: Option<Box<Fault>>,
}

impl Fault {
    /// Creates a fault of the given kind with no message and no cause
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            message: None,
            cause: None,
        }
    }

    /// A null-reference fault with neither message nor cause
    pub fn null_reference() -> Self {
        Self::new(NULL_REFERENCE_KIND)
    }

    /// Sets the descriptive message
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Sets the originating cause
    pub fn with_cause(mut self, cause: Fault) -> Self {
        self.cause = Some(Box::new(cause));
        self
    }

    pub fn kind(&self) -> &str {
        &self.kind
    }

    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    pub fn cause(&self) -> Option<&Fault> {
        self.cause.as_deref()
    }

    /// Build a fault from a panic payload.
    ///
    /// `Fault` payloads are cloned as-is; `&str` and `String` payloads
    /// become a [`PANIC_KIND`] fault carrying that message.
    pub fn from_panic_payload(payload: &(dyn Any + Send)) -> Self {
        if let Some(fault) = payload.downcast_ref::<Fault>() {
            fault.clone()
        } else if let Some(s) = payload.downcast_ref::<&str>() {
            Self::new(PANIC_KIND).with_message(*s)
        } else if let Some(s) = payload.downcast_ref::<String>() {
            Self::new(PANIC_KIND).with_message(s.clone())
        } else {
            Self::new(PANIC_KIND)
        }
    }

    /// Returns a copy with `f` applied to every message in the cause chain.
    pub fn map_messages<F>(&self, f: &F) -> Self
    where
        F: Fn(&str) -> String,
    {
        Self {
            kind: self.kind.clone(),
            message: self.message.as_deref().map(f),
            cause: self.cause.as_ref().map(|c| Box::new(c.map_messages(f))),
        }
    }
}

impl Display for Fault {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match &self.message {
            Some(message) => write!(f, "{}: {}", self.kind, message),
            None => f.write_str(&self.kind),
        }
    }
}

impl std::error::Error for Fault {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.cause
            .as_deref()
            .map(|c| c as &(dyn std::error::Error + 'static))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        assert_eq!(Fault::null_reference().to_string(), "NullReference");
        let fault = Fault::new("IoError").with_message("disk full");
        assert_eq!(fault.to_string(), "IoError: disk full");
    }

    #[test]
    fn test_cause_chain() {
        let fault = Fault::new("Outer")
            .with_message("wrapped")
            .with_cause(Fault::new("Inner").with_message("root"));
        assert_eq!(fault.cause().unwrap().to_string(), "Inner: root");

        let source = std::error::Error::source(&fault).unwrap();
        assert_eq!(source.to_string(), "Inner: root");
    }

    #[test]
    fn test_from_panic_payload() {
        let boxed: Box<dyn Any + Send> = Box::new(Fault::null_reference());
        assert_eq!(
            Fault::from_panic_payload(boxed.as_ref()),
            Fault::null_reference()
        );

        let boxed: Box<dyn Any + Send> = Box::new("boom");
        let fault = Fault::from_panic_payload(boxed.as_ref());
        assert_eq!(fault.kind(), PANIC_KIND);
        assert_eq!(fault.message(), Some("boom"));

        let boxed: Box<dyn Any + Send> = Box::new(String::from("formatted boom"));
        assert_eq!(
            Fault::from_panic_payload(boxed.as_ref()).message(),
            Some("formatted boom")
        );

        let boxed: Box<dyn Any + Send> = Box::new(42_u32);
        let fault = Fault::from_panic_payload(boxed.as_ref());
        assert_eq!(fault.kind(), PANIC_KIND);
        assert!(fault.message().is_none());
    }

    #[test]
    fn test_map_messages() {
        let fault = Fault::new("Outer")
            .with_message("/home/alice/a")
            .with_cause(Fault::new("Inner").with_message("/home/alice/b"));
        let mapped = fault.map_messages(&|m: &str| m.replace("/home/alice", "<HOME>"));
        assert_eq!(mapped.message(), Some("<HOME>/a"));
        assert_eq!(mapped.cause().unwrap().message(), Some("<HOME>/b"));
        assert_eq!(mapped.kind(), "Outer");
    }
}
