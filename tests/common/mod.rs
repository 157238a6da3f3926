#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use local_notifier::bridge::{
    Bridge, BridgeEvent, BridgeHandle, CategorySpec, InteractionSink, InvokedAction,
    NativeRequest, Outbound,
};
use local_notifier::channel::{MethodCall, MethodResult};
use local_notifier::notify::{Completion, NotificationService};
use serde_json::{Value, json};
use tokio::sync::mpsc;

pub const NAMESPACE: &str = "local_notifier";

/// In-memory stand-in for the OS notification service
#[derive(Default)]
pub struct FakeService {
    pub fail_with: Mutex<Option<String>>,
    /// Keep completions until `release` instead of firing them
    pub hold: Mutex<bool>,
    pub held: Mutex<Vec<(String, Completion)>>,
    pub sink: Mutex<Option<InteractionSink>>,
    pub submitted: Mutex<Vec<NativeRequest>>,
    pub categories: Mutex<Vec<CategorySpec>>,
    pub removed: Mutex<Vec<String>>,
    pub authorization_requests: AtomicUsize,
}

impl FakeService {
    pub fn fail_submissions(&self, message: &str) {
        *self.fail_with.lock().unwrap() = Some(message.to_string());
    }

    pub fn hold_submissions(&self) {
        *self.hold.lock().unwrap() = true;
    }

    /// Fire the oldest held completion for `identifier` successfully
    pub fn release(&self, identifier: &str) {
        self.complete_held(identifier, Ok(()));
    }

    /// Fire the oldest held completion for `identifier` with an OS error
    pub fn reject(&self, identifier: &str, message: &str) {
        self.complete_held(identifier, Err(message.to_string()));
    }

    fn complete_held(&self, identifier: &str, outcome: Result<(), String>) {
        let completion = {
            let mut held = self.held.lock().unwrap();
            let index = held
                .iter()
                .position(|(id, _)| id == identifier)
                .expect("no held submission");
            held.remove(index).1
        };
        completion(outcome);
    }

    /// Simulate the user acting on a delivered notification
    pub fn interact(&self, identifier: &str, action: InvokedAction) {
        let sink = self.sink.lock().unwrap().clone().expect("bridge not attached");
        sink.deliver(identifier, action);
    }

    pub fn submitted(&self) -> Vec<NativeRequest> {
        self.submitted.lock().unwrap().clone()
    }
}

impl NotificationService for FakeService {
    fn attach(&self, sink: InteractionSink) {
        *self.sink.lock().unwrap() = Some(sink);
    }

    fn request_authorization(&self) {
        self.authorization_requests.fetch_add(1, Ordering::SeqCst);
    }

    fn register_category(&self, category: &CategorySpec) {
        self.categories.lock().unwrap().push(category.clone());
    }

    fn submit(&self, request: &NativeRequest, completion: Completion) {
        self.submitted.lock().unwrap().push(request.clone());

        if *self.hold.lock().unwrap() {
            self.held
                .lock()
                .unwrap()
                .push((request.identifier.clone(), completion));
            return;
        }

        let outcome = match self.fail_with.lock().unwrap().clone() {
            Some(message) => Err(message),
            None => Ok(()),
        };
        // The OS completes on one of its own threads.
        std::thread::spawn(move || completion(outcome));
    }

    fn remove(&self, identifier: &str) {
        self.removed.lock().unwrap().push(identifier.to_string());
    }
}

/// A bridge wired to a fake service, with the outbound side exposed
pub struct Harness {
    pub fake: Arc<FakeService>,
    pub bridge: BridgeHandle,
    outbound: mpsc::UnboundedReceiver<Outbound>,
    next_id: u64,
}

impl Harness {
    pub fn new() -> Self {
        let fake = Arc::new(FakeService::default());
        let (tx, rx) = mpsc::unbounded_channel();
        let bridge = Bridge::spawn(fake.clone(), NAMESPACE, tx);
        Self {
            fake,
            bridge,
            outbound: rx,
            next_id: 1,
        }
    }

    pub fn call(&mut self, method: &str, arguments: Value) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        self.bridge
            .call(0, id, MethodCall::new(method, arguments))
            .unwrap();
        id
    }

    pub async fn next(&mut self) -> Outbound {
        tokio::time::timeout(Duration::from_secs(2), self.outbound.recv())
            .await
            .expect("timed out waiting for outbound")
            .expect("bridge stopped")
    }

    pub async fn response(&mut self, id: u64) -> MethodResult {
        match self.next().await {
            Outbound::Response {
                id: got, result, ..
            } if got == id => result,
            other => panic!("expected response {}, got {:?}", id, other),
        }
    }

    pub async fn event(&mut self) -> BridgeEvent {
        match self.next().await {
            Outbound::Event(event) => event,
            other => panic!("expected event, got {:?}", other),
        }
    }

    /// Assert nothing was emitted: a marker call must be answered next
    pub async fn assert_quiet(&mut self) {
        let marker = self.call("ping", Value::Null);
        assert_eq!(self.response(marker).await, MethodResult::NotImplemented);
    }

    pub async fn notify(&mut self, arguments: Value) -> MethodResult {
        let id = self.call("notify", arguments);
        self.response(id).await
    }

    pub async fn close(&mut self, identifier: &str) -> MethodResult {
        let id = self.call("close", json!({ "identifier": identifier }));
        self.response(id).await
    }
}

pub fn success() -> MethodResult {
    MethodResult::Success(json!(true))
}

pub fn shown(id: &str) -> BridgeEvent {
    BridgeEvent::Shown {
        notification_id: id.to_string(),
    }
}
