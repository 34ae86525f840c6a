//! Uncaught-failure events as the capture hooks receive them.
use std::fmt;

/// An error object: something with a class name, a message and maybe a stack.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ErrorObject {
    pub name: Option<String>,
    pub message: String,
    pub stack: Option<String>,
}

impl ErrorObject {
    pub fn new(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            message: message.into(),
            stack: None,
        }
    }

    pub fn with_stack(mut self, stack: impl Into<String>) -> Self {
        self.stack = Some(stack.into());
        self
    }

    /// The class name, if it is present and non-empty.
    pub fn class_name(&self) -> Option<&str> {
        self.name.as_deref().filter(|name| !name.trim().is_empty())
    }
}

impl fmt::Display for ErrorObject {
    /// Mirrors the usual `Name: message` rendering, dropping whichever half
    /// is empty.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.class_name(), self.message.is_empty()) {
            (Some(name), false) => write!(f, "{}: {}", name, self.message),
            (Some(name), true) => f.write_str(name),
            (None, _) => f.write_str(&self.message),
        }
    }
}

/// Whatever value was thrown or used as a rejection reason.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ThrownValue {
    Error(ErrorObject),
    Text(String),
    Undefined,
    Null,
    /// A value that cannot be turned into a string.
    Opaque,
}

impl ThrownValue {
    /// String form of the value. Never fails.
    pub fn describe(&self) -> String {
        match self {
            ThrownValue::Error(error) => error.to_string(),
            ThrownValue::Text(text) => text.clone(),
            ThrownValue::Undefined => "undefined".to_string(),
            ThrownValue::Null => "null".to_string(),
            ThrownValue::Opaque => "[unserializable value]".to_string(),
        }
    }

    pub fn stack(&self) -> Option<String> {
        match self {
            ThrownValue::Error(error) => error.stack.clone(),
            _ => None,
        }
    }

    pub fn as_error(&self) -> Option<&ErrorObject> {
        match self {
            ThrownValue::Error(error) => Some(error),
            _ => None,
        }
    }
}

impl From<ErrorObject> for ThrownValue {
    fn from(error: ErrorObject) -> Self {
        ThrownValue::Error(error)
    }
}

impl From<&str> for ThrownValue {
    fn from(text: &str) -> Self {
        ThrownValue::Text(text.to_string())
    }
}

/// An uncaught synchronous error or a resource-load failure.
///
/// `error` is absent for events that carry no error object, such as
/// cross-origin script errors.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ErrorEvent {
    pub message: String,
    pub filename: Option<String>,
    pub lineno: Option<u64>,
    pub colno: Option<u64>,
    pub error: Option<ThrownValue>,
}

impl ErrorEvent {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            ..Self::default()
        }
    }

    pub fn at(mut self, filename: impl Into<String>, lineno: u64, colno: u64) -> Self {
        self.filename = Some(filename.into());
        self.lineno = Some(lineno);
        self.colno = Some(colno);
        self
    }

    pub fn with_error(mut self, error: impl Into<ThrownValue>) -> Self {
        self.error = Some(error.into());
        self
    }
}

/// A promise rejection that reached the top level unhandled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RejectionEvent {
    pub reason: ThrownValue,
}

impl RejectionEvent {
    pub fn new(reason: impl Into<ThrownValue>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}
