//! The notification bridge.
//!
//! One tokio task owns the registry. Inbound calls, submission completions
//! and interaction callbacks all arrive on its inbox, so state is only ever
//! touched from that task. Responses and events leave through a single
//! ordered [`Outbound`] channel.

pub mod event;
pub mod registry;
pub mod request;

use serde_json::Value;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::channel::{METHOD_CLOSE, METHOD_NOTIFY, MethodCall, MethodResult};
use crate::error::NotificationError;
use crate::notify::NotificationService;

pub use event::{BridgeEvent, Interaction, InvokedAction, classify};
pub use registry::{Generation, Registry};
pub use request::{ActionMap, ActionSpec, CategorySpec, NativeAction, NativeRequest, NotificationRequest};

/// Everything the bridge sends back across the channel
#[derive(Debug, Clone, PartialEq)]
pub enum Outbound {
    /// Result of call `id`, issued from connection `origin`
    Response {
        origin: u64,
        id: u64,
        result: MethodResult,
    },
    Event(BridgeEvent),
}

enum Message {
    Call {
        origin: u64,
        id: u64,
        call: MethodCall,
    },
    Submitted {
        origin: u64,
        id: u64,
        identifier: String,
        generation: Generation,
        outcome: Result<(), String>,
    },
    Interaction(Interaction),
}

/// Entry point for OS interaction callbacks; callable from any thread
#[derive(Clone)]
pub struct InteractionSink {
    inbox: mpsc::WeakUnboundedSender<Message>,
}

impl InteractionSink {
    pub fn deliver(&self, identifier: impl Into<String>, action: InvokedAction) {
        let interaction = Interaction {
            identifier: identifier.into(),
            action,
        };
        match self.inbox.upgrade() {
            Some(inbox) => {
                let _ = inbox.send(Message::Interaction(interaction));
            }
            None => debug!("Bridge stopped, dropping interaction {:?}", interaction),
        }
    }
}

/// Cloneable handle for submitting calls to a running bridge
#[derive(Clone)]
pub struct BridgeHandle {
    inbox: mpsc::UnboundedSender<Message>,
}

impl BridgeHandle {
    pub fn call(&self, origin: u64, id: u64, call: MethodCall) -> Result<(), NotificationError> {
        self.inbox
            .send(Message::Call { origin, id, call })
            .map_err(|_| NotificationError::ChannelClosed)
    }

    pub fn interactions(&self) -> InteractionSink {
        InteractionSink {
            inbox: self.inbox.downgrade(),
        }
    }
}

pub struct Bridge {
    service: Arc<dyn NotificationService>,
    namespace: String,
    registry: Registry,
    inbox: mpsc::WeakUnboundedSender<Message>,
    outbound: mpsc::UnboundedSender<Outbound>,
}

impl Bridge {
    /// Attach to `service` and start the bridge task.
    ///
    /// Must be called within a tokio runtime. The task ends once every
    /// handle is dropped and no submission is in flight.
    pub fn spawn(
        service: Arc<dyn NotificationService>,
        namespace: impl Into<String>,
        outbound: mpsc::UnboundedSender<Outbound>,
    ) -> BridgeHandle {
        let (tx, rx) = mpsc::unbounded_channel();
        let handle = BridgeHandle { inbox: tx };

        service.attach(handle.interactions());
        service.request_authorization();

        let bridge = Bridge {
            service,
            namespace: namespace.into(),
            registry: Registry::new(),
            inbox: handle.inbox.downgrade(),
            outbound,
        };
        tokio::spawn(bridge.run(rx));

        handle
    }

    async fn run(mut self, mut rx: mpsc::UnboundedReceiver<Message>) {
        while let Some(message) = rx.recv().await {
            match message {
                Message::Call { origin, id, call } => self.handle_call(origin, id, call),
                Message::Submitted {
                    origin,
                    id,
                    identifier,
                    generation,
                    outcome,
                } => self.finish_notify(origin, id, identifier, generation, outcome),
                Message::Interaction(interaction) => self.handle_interaction(interaction),
            }
        }
        debug!("Bridge stopped with {} tracked notifications", self.registry.len());
    }

    fn handle_call(&mut self, origin: u64, id: u64, call: MethodCall) {
        debug!("Received call {} ({}) from {}", call.method, id, origin);

        let outcome = match call.method.as_str() {
            METHOD_NOTIFY => NotificationRequest::from_arguments(&call.arguments)
                .map(|request| self.notify(origin, id, request)),
            METHOD_CLOSE => request::identifier_argument(&call.arguments)
                .map(|identifier| self.close(origin, id, &identifier)),
            other => {
                debug!("Method {} not implemented", other);
                self.respond(origin, id, MethodResult::NotImplemented);
                Ok(())
            }
        };

        if let Err(e) = outcome {
            warn!("Rejected {} call: {}", call.method, e);
            self.respond(origin, id, MethodResult::Error(e.into()));
        }
    }

    fn notify(&mut self, origin: u64, id: u64, request: NotificationRequest) {
        let (native, actions) = request.to_native(&self.namespace);

        if self.registry.is_tracked(&native.identifier) {
            info!("Replacing active notification {}", native.identifier);
        }
        // Tracked before submission so a close racing the completion is honored.
        let generation = self.registry.track(&native.identifier, actions);

        if let Some(category) = &native.category {
            self.service.register_category(category);
        }

        let Some(inbox) = self.inbox.upgrade() else {
            self.registry.untrack_generation(&native.identifier, generation);
            self.respond(origin, id, MethodResult::Error(NotificationError::ChannelClosed.into()));
            return;
        };

        let identifier = native.identifier.clone();
        self.service.submit(
            &native,
            Box::new(move |outcome| {
                let _ = inbox.send(Message::Submitted {
                    origin,
                    id,
                    identifier,
                    generation,
                    outcome,
                });
            }),
        );
    }

    fn finish_notify(
        &mut self,
        origin: u64,
        id: u64,
        identifier: String,
        generation: Generation,
        outcome: Result<(), String>,
    ) {
        match outcome {
            Ok(()) => {
                info!("Notification {} shown", identifier);
                self.respond(origin, id, MethodResult::Success(Value::Bool(true)));
                self.emit(BridgeEvent::Shown {
                    notification_id: identifier,
                });
            }
            Err(message) => {
                warn!("Notification {} failed: {}", identifier, message);
                // A replacement submitted since then stays tracked.
                self.registry.untrack_generation(&identifier, generation);
                let error = NotificationError::Submission(message);
                self.respond(origin, id, MethodResult::Error(error.into()));
            }
        }
    }

    fn close(&mut self, origin: u64, id: u64, identifier: &str) {
        self.service.remove(identifier);
        self.respond(origin, id, MethodResult::Success(Value::Bool(true)));

        if self.registry.untrack(identifier) {
            info!("Notification {} closed", identifier);
            self.emit(BridgeEvent::Closed {
                notification_id: identifier.to_string(),
            });
        } else {
            debug!("Close for untracked notification {}", identifier);
        }
    }

    fn handle_interaction(&mut self, interaction: Interaction) {
        let Interaction { identifier, action } = interaction;
        let actions = self.registry.take_actions(&identifier);
        let event = classify(&identifier, &action, actions.as_ref());
        self.registry.untrack(&identifier);

        match event {
            Some(event) => self.emit(event),
            None => debug!("No event for {:?} on {}", action, identifier),
        }
    }

    fn respond(&self, origin: u64, id: u64, result: MethodResult) {
        if self.outbound.send(Outbound::Response { origin, id, result }).is_err() {
            debug!("Outbound channel closed, dropping response {}", id);
        }
    }

    fn emit(&self, event: BridgeEvent) {
        debug!("Emitting {} for {}", event.method_name(), event.notification_id());
        if self.outbound.send(Outbound::Event(event)).is_err() {
            debug!("Outbound channel closed, dropping event");
        }
    }
}
