use serde_json::Value;
use std::collections::HashMap;

use crate::error::NotificationError;

/// Native action identifier -> zero-based action index
pub type ActionMap = HashMap<String, usize>;

/// A caller-defined button on a notification
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionSpec {
    pub text: String,
}

/// Parsed arguments of a `notify` call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationRequest {
    pub identifier: String,
    pub title: Option<String>,
    pub subtitle: Option<String>,
    pub body: Option<String>,
    pub silent: bool,
    pub actions: Vec<ActionSpec>,
}

impl NotificationRequest {
    pub fn new(identifier: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            title: None,
            subtitle: None,
            body: None,
            silent: false,
            actions: Vec::new(),
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_action(mut self, text: impl Into<String>) -> Self {
        self.actions.push(ActionSpec { text: text.into() });
        self
    }

    /// Parse the argument dictionary of a `notify` call.
    ///
    /// Optional fields of the wrong type are treated as absent.
    pub fn from_arguments(args: &Value) -> Result<Self, NotificationError> {
        let identifier = identifier_argument(args)?;

        let actions = args
            .get("actions")
            .and_then(Value::as_array)
            .map(|items| {
                items
                    .iter()
                    .enumerate()
                    .map(|(index, item)| ActionSpec {
                        text: item
                            .get("text")
                            .and_then(Value::as_str)
                            .map(str::to_string)
                            .unwrap_or_else(|| format!("Action {}", index + 1)),
                    })
                    .collect()
            })
            .unwrap_or_default();

        Ok(Self {
            identifier,
            title: string_argument(args, "title"),
            subtitle: string_argument(args, "subtitle"),
            body: string_argument(args, "body"),
            silent: args.get("silent").and_then(Value::as_bool).unwrap_or(false),
            actions,
        })
    }

    /// Build the native request plus the action map to track for it
    pub fn to_native(&self, namespace: &str) -> (NativeRequest, Option<ActionMap>) {
        let (category, action_map) = if self.actions.is_empty() {
            (None, None)
        } else {
            let category_id = category_identifier(namespace, &self.identifier);
            let mut map = ActionMap::with_capacity(self.actions.len());
            let actions = self
                .actions
                .iter()
                .enumerate()
                .map(|(index, action)| {
                    let identifier = action_identifier(&category_id, index);
                    map.insert(identifier.clone(), index);
                    NativeAction {
                        identifier,
                        title: action.text.clone(),
                    }
                })
                .collect();
            (
                Some(CategorySpec {
                    identifier: category_id,
                    actions,
                }),
                Some(map),
            )
        };

        let native = NativeRequest {
            identifier: self.identifier.clone(),
            title: self.title.clone().unwrap_or_default(),
            subtitle: self.subtitle.clone(),
            body: self.body.clone(),
            sound: !self.silent,
            category,
        };
        (native, action_map)
    }
}

/// Extract the required, non-empty `identifier` argument
pub fn identifier_argument(args: &Value) -> Result<String, NotificationError> {
    if !args.is_object() {
        return Err(NotificationError::InvalidArguments(
            "arguments must be a dictionary".to_string(),
        ));
    }
    match args.get("identifier") {
        Some(Value::String(id)) if !id.is_empty() => Ok(id.clone()),
        Some(Value::String(_)) => Err(NotificationError::InvalidArguments(
            "identifier must not be empty".to_string(),
        )),
        Some(_) => Err(NotificationError::InvalidArguments(
            "identifier must be a string".to_string(),
        )),
        None => Err(NotificationError::InvalidArguments(
            "identifier is required".to_string(),
        )),
    }
}

fn string_argument(args: &Value, key: &str) -> Option<String> {
    args.get(key).and_then(Value::as_str).map(str::to_string)
}

pub fn category_identifier(namespace: &str, identifier: &str) -> String {
    format!("{}.category.{}", namespace, identifier)
}

pub fn action_identifier(category_identifier: &str, index: usize) -> String {
    format!("{}.action.{}", category_identifier, index)
}

/// Content handed to the OS notification service
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NativeRequest {
    pub identifier: String,
    /// Empty when the caller gave no title
    pub title: String,
    pub subtitle: Option<String>,
    pub body: Option<String>,
    /// Attach the default sound
    pub sound: bool,
    pub category: Option<CategorySpec>,
}

/// Per-notification category bundling its actions
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategorySpec {
    pub identifier: String,
    pub actions: Vec<NativeAction>,
}

/// A native action; activating it brings the app to the foreground
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NativeAction {
    pub identifier: String,
    pub title: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_minimal() {
        let req = NotificationRequest::from_arguments(&json!({"identifier": "n1"})).unwrap();
        assert_eq!(req, NotificationRequest::new("n1"));
    }

    #[test]
    fn test_parse_all_fields() {
        let req = NotificationRequest::from_arguments(&json!({
            "identifier": "n1",
            "title": "Hi",
            "subtitle": "Sub",
            "body": "Body",
            "silent": true,
            "actions": [{"text": "OK"}, {"text": "Cancel"}]
        }))
        .unwrap();

        assert_eq!(req.title.as_deref(), Some("Hi"));
        assert_eq!(req.subtitle.as_deref(), Some("Sub"));
        assert_eq!(req.body.as_deref(), Some("Body"));
        assert!(req.silent);
        assert_eq!(
            req.actions,
            vec![
                ActionSpec { text: "OK".into() },
                ActionSpec { text: "Cancel".into() }
            ]
        );
    }

    #[test]
    fn test_action_text_defaults_to_position() {
        let req = NotificationRequest::from_arguments(&json!({
            "identifier": "n1",
            "actions": [{"text": "OK"}, {}, "bogus", {"text": 5}]
        }))
        .unwrap();

        let texts: Vec<_> = req.actions.iter().map(|a| a.text.as_str()).collect();
        assert_eq!(texts, vec!["OK", "Action 2", "Action 3", "Action 4"]);
    }

    #[test]
    fn test_wrongly_typed_optionals_are_ignored() {
        let req = NotificationRequest::from_arguments(&json!({
            "identifier": "n1",
            "title": 42,
            "silent": "yes",
            "actions": "none"
        }))
        .unwrap();

        assert!(req.title.is_none());
        assert!(!req.silent);
        assert!(req.actions.is_empty());
    }

    #[test]
    fn test_identifier_validation() {
        for args in [
            json!({}),
            json!({"identifier": ""}),
            json!({"identifier": 1}),
            json!(null),
            json!(["n1"]),
        ] {
            let err = NotificationRequest::from_arguments(&args).unwrap_err();
            assert_eq!(err.code(), "invalid_arguments", "args: {}", args);
        }
    }

    #[test]
    fn test_native_without_actions() {
        let (native, map) = NotificationRequest::new("n1").to_native("local_notifier");

        assert_eq!(native.identifier, "n1");
        assert_eq!(native.title, "");
        assert!(native.subtitle.is_none());
        assert!(native.body.is_none());
        assert!(native.sound);
        assert!(native.category.is_none());
        assert!(map.is_none());
    }

    #[test]
    fn test_native_silent_drops_sound() {
        let mut req = NotificationRequest::new("n1").with_title("Hi");
        req.silent = true;
        let (native, _) = req.to_native("local_notifier");

        assert_eq!(native.title, "Hi");
        assert!(!native.sound);
    }

    #[test]
    fn test_native_category_and_action_map() {
        let req = NotificationRequest::new("n1")
            .with_action("OK")
            .with_action("Cancel")
            .with_action("Later");
        let (native, map) = req.to_native("local_notifier");

        let category = native.category.unwrap();
        assert_eq!(category.identifier, "local_notifier.category.n1");
        assert_eq!(category.actions.len(), 3);
        assert_eq!(category.actions[1].identifier, "local_notifier.category.n1.action.1");
        assert_eq!(category.actions[1].title, "Cancel");

        let map = map.unwrap();
        assert_eq!(map.len(), 3);
        for (index, action) in category.actions.iter().enumerate() {
            assert_eq!(map[&action.identifier], index);
        }
    }
}
