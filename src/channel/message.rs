use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A named call with a dictionary of arguments, in either direction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MethodCall {
    pub method: String,

    #[serde(default)]
    pub arguments: Value,
}

impl MethodCall {
    pub fn new(method: impl Into<String>, arguments: Value) -> Self {
        Self {
            method: method.into(),
            arguments,
        }
    }
}

/// Inbound frame: a method call tagged with a caller-chosen id
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestFrame {
    pub id: u64,

    #[serde(flatten)]
    pub call: MethodCall,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorPayload {
    pub code: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
}

/// Outcome of an inbound call
#[derive(Debug, Clone, PartialEq)]
pub enum MethodResult {
    Success(Value),
    Error(ErrorPayload),
    NotImplemented,
}

/// Outbound frame answering the request with the same id
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseFrame {
    pub id: u64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorPayload>,

    #[serde(default, rename = "notImplemented", skip_serializing_if = "is_false")]
    pub not_implemented: bool,
}

fn is_false(value: &bool) -> bool {
    !*value
}

impl ResponseFrame {
    pub fn new(id: u64, result: MethodResult) -> Self {
        let mut frame = Self {
            id,
            result: None,
            error: None,
            not_implemented: false,
        };
        match result {
            MethodResult::Success(value) => frame.result = Some(value),
            MethodResult::Error(payload) => frame.error = Some(payload),
            MethodResult::NotImplemented => frame.not_implemented = true,
        }
        frame
    }

    pub fn into_result(self) -> MethodResult {
        if self.not_implemented {
            MethodResult::NotImplemented
        } else if let Some(error) = self.error {
            MethodResult::Error(error)
        } else {
            MethodResult::Success(self.result.unwrap_or(Value::Null))
        }
    }
}

/// Anything the bridge writes to a connection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Frame {
    Response(ResponseFrame),
    Event(MethodCall),
}

impl Frame {
    pub fn decode(line: &str) -> serde_json::Result<Self> {
        serde_json::from_str(line)
    }

    /// Serialize as a single newline-terminated line
    pub fn encode(&self) -> serde_json::Result<String> {
        let mut json = serde_json::to_string(self)?;
        json.push('\n');
        Ok(json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_request_deserialization() {
        let json = r#"{"id":7,"method":"notify","arguments":{"identifier":"n1"}}"#;
        let frame: RequestFrame = serde_json::from_str(json).unwrap();

        assert_eq!(frame.id, 7);
        assert_eq!(frame.call.method, "notify");
        assert_eq!(frame.call.arguments["identifier"], "n1");
    }

    #[test]
    fn test_request_without_arguments() {
        let frame: RequestFrame = serde_json::from_str(r#"{"id":1,"method":"ping"}"#).unwrap();
        assert!(frame.call.arguments.is_null());
    }

    #[test]
    fn test_success_response_serialization() {
        let frame = Frame::Response(ResponseFrame::new(3, MethodResult::Success(json!(true))));
        let json = frame.encode().unwrap();

        assert_eq!(json, "{\"id\":3,\"result\":true}\n");
    }

    #[test]
    fn test_error_response_serialization() {
        let payload = ErrorPayload {
            code: "notification_error".into(),
            message: Some("denied".into()),
            details: None,
        };
        let frame = Frame::Response(ResponseFrame::new(4, MethodResult::Error(payload)));
        let json = frame.encode().unwrap();

        assert!(json.contains("\"code\":\"notification_error\""));
        assert!(json.contains("\"message\":\"denied\""));
        assert!(!json.contains("\"result\""));
        assert!(!json.contains("\"details\""));
    }

    #[test]
    fn test_not_implemented_response() {
        let frame = ResponseFrame::new(5, MethodResult::NotImplemented);
        let json = serde_json::to_string(&frame).unwrap();
        assert_eq!(json, r#"{"id":5,"notImplemented":true}"#);

        let decoded: ResponseFrame = serde_json::from_str(&json).unwrap();
        assert_eq!(decoded.into_result(), MethodResult::NotImplemented);
    }

    #[test]
    fn test_decode_distinguishes_events_from_responses() {
        let event = Frame::decode(
            r#"{"method":"onLocalNotificationShow","arguments":{"notificationId":"n1"}}"#,
        )
        .unwrap();
        assert!(matches!(event, Frame::Event(ref call) if call.method == "onLocalNotificationShow"));

        let response = Frame::decode(r#"{"id":9,"result":true}"#).unwrap();
        match response {
            Frame::Response(frame) => {
                assert_eq!(frame.id, 9);
                assert_eq!(frame.into_result(), MethodResult::Success(json!(true)));
            }
            other => panic!("expected response, got {:?}", other),
        }
    }

    #[test]
    fn test_decode_rejects_garbage() {
        assert!(Frame::decode("not json").is_err());
        assert!(Frame::decode(r#"{"foo":1}"#).is_err());
    }
}
