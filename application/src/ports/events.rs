//! Discussion events and the event bus
//!
//! The session loop publishes a [`DiscussionEvent`] for every status change
//! and every appended message. Subscribers register per [`EventKind`] or for
//! everything; the engine knows nothing about what consumes the events.
//!
//! Delivery is synchronous, on the publishing task, in registration order.
//! Subscribers that need to do slow work should forward into a channel
//! ([`ChannelSubscriber`]).

use roundtable_domain::{
    AgentId, AgentMessage, BudgetCause, DiscussionId, DiscussionReport, HumanIntervention,
    MessageRange, Summary,
};
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock};
use tokio::sync::mpsc;

/// Events published by the session controller
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum DiscussionEvent {
    DiscussionStarted {
        discussion_id: DiscussionId,
        topic: String,
        participants: Vec<AgentId>,
    },
    DiscussionPaused {
        discussion_id: DiscussionId,
    },
    DiscussionResumed {
        discussion_id: DiscussionId,
    },
    /// Natural end: round limit, decision, or an explicit stop
    DiscussionCompleted {
        discussion_id: DiscussionId,
        report: Box<DiscussionReport>,
    },
    /// Auto-stop on the token budget or the quality threshold
    DiscussionAutoStopped {
        discussion_id: DiscussionId,
        report: Box<DiscussionReport>,
    },
    /// Auto-stop on the time budget
    DiscussionTimeout {
        discussion_id: DiscussionId,
        report: Box<DiscussionReport>,
    },
    /// The discussion aborted, or a control operation on it was rejected
    DiscussionError {
        discussion_id: DiscussionId,
        error: String,
    },
    AgentSpoke {
        discussion_id: DiscussionId,
        message: AgentMessage,
    },
    AgentError {
        discussion_id: DiscussionId,
        agent_id: AgentId,
        error: String,
        /// The agent takes no further turns.
        fatal: bool,
    },
    HumanIntervention {
        discussion_id: DiscussionId,
        intervention: HumanIntervention,
    },
    SummarizationStarted {
        discussion_id: DiscussionId,
        range: MessageRange,
    },
    SummarizationCompleted {
        discussion_id: DiscussionId,
        range: MessageRange,
        summary: Summary,
    },
    SummarizationError {
        discussion_id: DiscussionId,
        range: MessageRange,
        error: String,
    },
    /// A budget ran out while auto-stop is off
    BudgetWarning {
        discussion_id: DiscussionId,
        cause: BudgetCause,
    },
    RoundCompleted {
        discussion_id: DiscussionId,
        round: u32,
    },
}

/// Event names used for subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    DiscussionStarted,
    DiscussionPaused,
    DiscussionResumed,
    DiscussionCompleted,
    DiscussionAutoStopped,
    DiscussionTimeout,
    DiscussionError,
    AgentSpoke,
    AgentError,
    HumanIntervention,
    SummarizationStarted,
    SummarizationCompleted,
    SummarizationError,
    BudgetWarning,
    RoundCompleted,
}

impl EventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::DiscussionStarted => "discussionStarted",
            EventKind::DiscussionPaused => "discussionPaused",
            EventKind::DiscussionResumed => "discussionResumed",
            EventKind::DiscussionCompleted => "discussionCompleted",
            EventKind::DiscussionAutoStopped => "discussionAutoStopped",
            EventKind::DiscussionTimeout => "discussionTimeout",
            EventKind::DiscussionError => "discussionError",
            EventKind::AgentSpoke => "agentSpoke",
            EventKind::AgentError => "agentError",
            EventKind::HumanIntervention => "humanIntervention",
            EventKind::SummarizationStarted => "summarizationStarted",
            EventKind::SummarizationCompleted => "summarizationCompleted",
            EventKind::SummarizationError => "summarizationError",
            EventKind::BudgetWarning => "budgetWarning",
            EventKind::RoundCompleted => "roundCompleted",
        }
    }
}

impl std::fmt::Display for EventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl DiscussionEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            DiscussionEvent::DiscussionStarted { .. } => EventKind::DiscussionStarted,
            DiscussionEvent::DiscussionPaused { .. } => EventKind::DiscussionPaused,
            DiscussionEvent::DiscussionResumed { .. } => EventKind::DiscussionResumed,
            DiscussionEvent::DiscussionCompleted { .. } => EventKind::DiscussionCompleted,
            DiscussionEvent::DiscussionAutoStopped { .. } => EventKind::DiscussionAutoStopped,
            DiscussionEvent::DiscussionTimeout { .. } => EventKind::DiscussionTimeout,
            DiscussionEvent::DiscussionError { .. } => EventKind::DiscussionError,
            DiscussionEvent::AgentSpoke { .. } => EventKind::AgentSpoke,
            DiscussionEvent::AgentError { .. } => EventKind::AgentError,
            DiscussionEvent::HumanIntervention { .. } => EventKind::HumanIntervention,
            DiscussionEvent::SummarizationStarted { .. } => EventKind::SummarizationStarted,
            DiscussionEvent::SummarizationCompleted { .. } => EventKind::SummarizationCompleted,
            DiscussionEvent::SummarizationError { .. } => EventKind::SummarizationError,
            DiscussionEvent::BudgetWarning { .. } => EventKind::BudgetWarning,
            DiscussionEvent::RoundCompleted { .. } => EventKind::RoundCompleted,
        }
    }

    pub fn discussion_id(&self) -> &DiscussionId {
        match self {
            DiscussionEvent::DiscussionStarted { discussion_id, .. }
            | DiscussionEvent::DiscussionPaused { discussion_id }
            | DiscussionEvent::DiscussionResumed { discussion_id }
            | DiscussionEvent::DiscussionCompleted { discussion_id, .. }
            | DiscussionEvent::DiscussionAutoStopped { discussion_id, .. }
            | DiscussionEvent::DiscussionTimeout { discussion_id, .. }
            | DiscussionEvent::DiscussionError { discussion_id, .. }
            | DiscussionEvent::AgentSpoke { discussion_id, .. }
            | DiscussionEvent::AgentError { discussion_id, .. }
            | DiscussionEvent::HumanIntervention { discussion_id, .. }
            | DiscussionEvent::SummarizationStarted { discussion_id, .. }
            | DiscussionEvent::SummarizationCompleted { discussion_id, .. }
            | DiscussionEvent::SummarizationError { discussion_id, .. }
            | DiscussionEvent::BudgetWarning { discussion_id, .. }
            | DiscussionEvent::RoundCompleted { discussion_id, .. } => discussion_id,
        }
    }

    /// Final report, for the three terminal events.
    pub fn report(&self) -> Option<&DiscussionReport> {
        match self {
            DiscussionEvent::DiscussionCompleted { report, .. }
            | DiscussionEvent::DiscussionAutoStopped { report, .. }
            | DiscussionEvent::DiscussionTimeout { report, .. } => Some(report.as_ref()),
            _ => None,
        }
    }
}

/// Receives published events.
///
/// Implemented for any `Fn(&DiscussionEvent) + Send + Sync` closure.
pub trait EventSubscriber: Send + Sync {
    fn on_event(&self, event: &DiscussionEvent);
}

impl<F> EventSubscriber for F
where
    F: Fn(&DiscussionEvent) + Send + Sync,
{
    fn on_event(&self, event: &DiscussionEvent) {
        self(event)
    }
}

/// Forwards events into an unbounded channel.
pub struct ChannelSubscriber {
    tx: mpsc::UnboundedSender<DiscussionEvent>,
}

impl ChannelSubscriber {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<DiscussionEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl EventSubscriber for ChannelSubscriber {
    fn on_event(&self, event: &DiscussionEvent) {
        // Receiver gone: nobody is listening any more
        let _ = self.tx.send(event.clone());
    }
}

/// Handle returned by subscription, used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

struct Subscription {
    id: SubscriptionId,
    /// `None` receives every event.
    kind: Option<EventKind>,
    subscriber: Arc<dyn EventSubscriber>,
}

/// Registry of subscribers keyed by event kind.
pub struct EventBus {
    next_id: AtomicU64,
    subscriptions: RwLock<Vec<Subscription>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self {
            next_id: AtomicU64::new(1),
            subscriptions: RwLock::new(Vec::new()),
        }
    }

    /// Register for one kind of event.
    pub fn subscribe<S>(&self, kind: EventKind, subscriber: S) -> SubscriptionId
    where
        S: EventSubscriber + 'static,
    {
        self.register(Some(kind), Arc::new(subscriber))
    }

    /// Register for every event.
    pub fn subscribe_all<S>(&self, subscriber: S) -> SubscriptionId
    where
        S: EventSubscriber + 'static,
    {
        self.register(None, Arc::new(subscriber))
    }

    /// Register an already shared subscriber.
    pub fn subscribe_shared(
        &self,
        kind: Option<EventKind>,
        subscriber: Arc<dyn EventSubscriber>,
    ) -> SubscriptionId {
        self.register(kind, subscriber)
    }

    /// Remove a subscription. Returns `false` if it was already gone.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut subscriptions = self
            .subscriptions
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        let before = subscriptions.len();
        subscriptions.retain(|s| s.id != id);
        subscriptions.len() != before
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscriptions
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Deliver `event` to every matching subscriber in registration order.
    ///
    /// Subscribers may subscribe or unsubscribe from inside the callback;
    /// the change applies from the next event.
    pub fn publish(&self, event: &DiscussionEvent) {
        let kind = event.kind();
        let listeners: Vec<Arc<dyn EventSubscriber>> = self
            .subscriptions
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|s| s.kind.is_none_or(|k| k == kind))
            .map(|s| Arc::clone(&s.subscriber))
            .collect();

        for listener in listeners {
            listener.on_event(event);
        }
    }

    fn register(
        &self,
        kind: Option<EventKind>,
        subscriber: Arc<dyn EventSubscriber>,
    ) -> SubscriptionId {
        let id = SubscriptionId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.subscriptions
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(Subscription {
                id,
                kind,
                subscriber,
            });
        id
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}
