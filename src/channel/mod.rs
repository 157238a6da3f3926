//! Line-delimited JSON framing for the method-call channel.

pub mod message;

pub use message::{ErrorPayload, Frame, MethodCall, MethodResult, RequestFrame, ResponseFrame};

/// Inbound operation names
pub const METHOD_NOTIFY: &str = "notify";
pub const METHOD_CLOSE: &str = "close";
