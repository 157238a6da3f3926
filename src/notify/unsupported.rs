use tracing::warn;

use super::{Completion, NotificationService};
use crate::bridge::{CategorySpec, InteractionSink, NativeRequest};

/// Stand-in for platforms without a native backend; every submission fails
pub struct UnsupportedService {
    platform: &'static str,
}

impl UnsupportedService {
    pub fn new(platform: &'static str) -> Self {
        Self { platform }
    }
}

impl NotificationService for UnsupportedService {
    fn attach(&self, _sink: InteractionSink) {}

    fn request_authorization(&self) {
        warn!("{} notifications not yet implemented", self.platform);
    }

    fn register_category(&self, _category: &CategorySpec) {}

    fn submit(&self, _request: &NativeRequest, completion: Completion) {
        completion(Err(format!("{} notifications not yet implemented", self.platform)));
    }

    fn remove(&self, _identifier: &str) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bridge::NotificationRequest;
    use std::sync::mpsc;

    #[test]
    fn test_submit_fails_with_platform_message() {
        let service = UnsupportedService::new("Linux");
        let (native, _) = NotificationRequest::new("n1").to_native("local_notifier");

        let (tx, rx) = mpsc::channel();
        service.submit(&native, Box::new(move |outcome| tx.send(outcome).unwrap()));

        assert_eq!(
            rx.recv().unwrap(),
            Err("Linux notifications not yet implemented".to_string())
        );
    }
}
