use serde_json::{json, Value};

use super::request::ActionMap;
use crate::channel::MethodCall;

pub const EVENT_SHOW: &str = "onLocalNotificationShow";
pub const EVENT_CLOSE: &str = "onLocalNotificationClose";
pub const EVENT_CLICK: &str = "onLocalNotificationClick";
pub const EVENT_CLICK_ACTION: &str = "onLocalNotificationClickAction";

/// Outbound lifecycle event for one notification
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BridgeEvent {
    Shown { notification_id: String },
    Closed { notification_id: String },
    Clicked { notification_id: String },
    ClickedAction { notification_id: String, action_index: usize },
}

impl BridgeEvent {
    pub fn notification_id(&self) -> &str {
        match self {
            Self::Shown { notification_id }
            | Self::Closed { notification_id }
            | Self::Clicked { notification_id }
            | Self::ClickedAction { notification_id, .. } => notification_id,
        }
    }

    pub fn method_name(&self) -> &'static str {
        match self {
            Self::Shown { .. } => EVENT_SHOW,
            Self::Closed { .. } => EVENT_CLOSE,
            Self::Clicked { .. } => EVENT_CLICK,
            Self::ClickedAction { .. } => EVENT_CLICK_ACTION,
        }
    }

    pub fn to_call(&self) -> MethodCall {
        let mut arguments = json!({ "notificationId": self.notification_id() });
        if let Self::ClickedAction { action_index, .. } = self {
            arguments["actionIndex"] = Value::from(*action_index);
        }
        MethodCall::new(self.method_name(), arguments)
    }
}

/// Which action the user invoked on a delivered notification
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InvokedAction {
    /// Tap on the notification body
    Default,
    Dismiss,
    Custom(String),
}

/// A user interaction reported by the OS service
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Interaction {
    pub identifier: String,
    pub action: InvokedAction,
}

/// Decide which event, if any, an interaction produces
pub fn classify(
    identifier: &str,
    action: &InvokedAction,
    actions: Option<&ActionMap>,
) -> Option<BridgeEvent> {
    match action {
        InvokedAction::Default => Some(BridgeEvent::Clicked {
            notification_id: identifier.to_string(),
        }),
        InvokedAction::Custom(action_id) => actions
            .and_then(|map| map.get(action_id))
            .map(|&action_index| BridgeEvent::ClickedAction {
                notification_id: identifier.to_string(),
                action_index,
            }),
        InvokedAction::Dismiss => None,
    }
}
