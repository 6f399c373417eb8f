//! Notifications about remote-system changes.
//!
//! Events are best-effort: a failure to publish is logged and never changes
//! the outcome of a reconciliation.

use k8s_openapi::api::core::v1::ObjectReference;
use kube::Client;
use kube::runtime::events::{Event, EventType, Recorder, Reporter};
use std::fmt;
use tracing::warn;

/// Reporting controller name attached to published events
pub const CONTROLLER_NAME: &str = "platform-network-controller";

/// Why a notification was emitted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventReason {
    ResourceCreated,
    ResourceUpdated,
    ResourceDeleted,
}

impl EventReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventReason::ResourceCreated => "ResourceCreated",
            EventReason::ResourceUpdated => "ResourceUpdated",
            EventReason::ResourceDeleted => "ResourceDeleted",
        }
    }

    fn action(&self) -> &'static str {
        match self {
            EventReason::ResourceCreated => "Create",
            EventReason::ResourceUpdated => "Update",
            EventReason::ResourceDeleted => "Delete",
        }
    }
}

impl fmt::Display for EventReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Fire-and-forget notification sink
#[async_trait::async_trait]
pub trait EventSink: Send + Sync {
    async fn notify(&self, object: &ObjectReference, reason: EventReason, message: String);
}

/// Publishes Normal Kubernetes events
pub struct KubeEventSink {
    recorder: Recorder,
}

impl KubeEventSink {
    pub fn new(client: Client) -> Self {
        let reporter = Reporter::from(CONTROLLER_NAME);
        Self { recorder: Recorder::new(client, reporter) }
    }
}

#[async_trait::async_trait]
impl EventSink for KubeEventSink {
    async fn notify(&self, object: &ObjectReference, reason: EventReason, message: String) {
        let event = Event {
            type_: EventType::Normal,
            reason: reason.as_str().into(),
            note: Some(message),
            action: reason.action().into(),
            secondary: None,
        };
        if let Err(e) = self.recorder.publish(&event, object).await {
            warn!(
                "Failed to publish {} event for {}: {}",
                reason,
                object.name.as_deref().unwrap_or("<unnamed>"),
                e
            );
        }
    }
}
