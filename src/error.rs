use thiserror::Error;

use crate::channel::message::ErrorPayload;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NotificationError {
    /// The OS notification service rejected the request
    #[error("{0}")]
    Submission(String),

    /// A required argument was missing or had the wrong type
    #[error("invalid arguments: {0}")]
    InvalidArguments(String),

    #[error("bridge channel closed")]
    ChannelClosed,
}

impl NotificationError {
    /// Error code reported on the channel
    pub fn code(&self) -> &'static str {
        match self {
            Self::Submission(_) => "notification_error",
            Self::InvalidArguments(_) => "invalid_arguments",
            Self::ChannelClosed => "channel_closed",
        }
    }
}

impl From<NotificationError> for ErrorPayload {
    fn from(err: NotificationError) -> Self {
        let message = match &err {
            NotificationError::Submission(msg) | NotificationError::InvalidArguments(msg) => {
                msg.clone()
            }
            NotificationError::ChannelClosed => err.to_string(),
        };
        ErrorPayload {
            code: err.code().to_string(),
            message: Some(message),
            details: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_submission_error_payload() {
        let payload: ErrorPayload =
            NotificationError::Submission("Notifications are not allowed".into()).into();
        assert_eq!(payload.code, "notification_error");
        assert_eq!(payload.message.as_deref(), Some("Notifications are not allowed"));
        assert!(payload.details.is_none());
    }

    #[test]
    fn test_invalid_arguments_code() {
        let err = NotificationError::InvalidArguments("identifier is required".into());
        assert_eq!(err.code(), "invalid_arguments");
        assert_eq!(err.to_string(), "invalid arguments: identifier is required");
    }
}
