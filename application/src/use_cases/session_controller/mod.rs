//! Session controller
//!
//! Owns the agent registry and the discussion history, and exposes the
//! control surface for the one discussion that may be running at a time.
//! The running discussion is driven by a [`TurnLoop`](turn_loop::TurnLoop)
//! task; control operations only set flags or enqueue interventions
//! ([`ControlState`]) and never touch the discussion directly.

pub mod control;
mod turn_loop;

pub use control::ControlState;

use crate::config::DiscussionOptions;
use crate::ports::clock::{Clock, SystemClock};
use crate::ports::discussion_store::{DiscussionStore, NoDiscussionStore};
use crate::ports::events::{DiscussionEvent, EventBus};
use crate::use_cases::agent_runtime::AgentRuntime;
use crate::use_cases::summarize::SummarizationEngine;
use roundtable_domain::{
    AgentId, AgentPersona, BudgetMonitor, Discussion, DiscussionId, DiscussionStatus,
    HumanIntervention, ImpactLevel, InterventionId, NoQualityScore, QualityScorer,
    SummarizationConfig, TokenUsageStats, TurnScheduler,
};
use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use thiserror::Error;
use tokio::sync::watch;
use tracing::{info, warn};
use turn_loop::TurnLoop;

/// Errors returned synchronously by control operations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ControllerError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Discussion {0} is already running")]
    Busy(DiscussionId),

    #[error("No active discussion")]
    NoActiveDiscussion,

    #[error("Cannot {operation} a discussion that is {status}")]
    InvalidState {
        operation: &'static str,
        status: DiscussionStatus,
    },

    #[error("Human intervention is disabled for this discussion")]
    InterventionsDisabled,

    #[error("Discussion not found: {0}")]
    NotFound(DiscussionId),
}

// ==================== Shared state ====================

pub(crate) fn read<T>(lock: &RwLock<T>) -> RwLockReadGuard<'_, T> {
    lock.read().unwrap_or_else(PoisonError::into_inner)
}

pub(crate) fn write<T>(lock: &RwLock<T>) -> RwLockWriteGuard<'_, T> {
    lock.write().unwrap_or_else(PoisonError::into_inner)
}

pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

struct DiscussionEntry {
    discussion: Arc<RwLock<Discussion>>,
    status_tx: Arc<watch::Sender<DiscussionStatus>>,
}

pub(crate) struct ActiveSession {
    pub discussion_id: DiscussionId,
    discussion: Arc<RwLock<Discussion>>,
    control: Arc<ControlState>,
    human_intervention_enabled: bool,
}

pub(crate) struct Shared {
    agents: RwLock<Vec<Arc<AgentPersona>>>,
    pub summarization: RwLock<SummarizationConfig>,
    /// History in start order.
    discussions: RwLock<Vec<(DiscussionId, DiscussionEntry)>>,
    pub active: Mutex<Option<ActiveSession>>,
    pub usage: Mutex<TokenUsageStats>,
    pub events: EventBus,
}

/// Public control surface for discussions.
///
/// Cheap to clone; clones share the registry, history and event bus.
#[derive(Clone)]
pub struct SessionController {
    shared: Arc<Shared>,
    runtime: Arc<AgentRuntime>,
    summarizer: Arc<SummarizationEngine>,
    store: Arc<dyn DiscussionStore>,
    clock: Arc<dyn Clock>,
    quality: Arc<dyn QualityScorer>,
}

impl SessionController {
    pub fn new(runtime: AgentRuntime, summarizer: SummarizationEngine) -> Self {
        Self {
            shared: Arc::new(Shared {
                agents: RwLock::new(Vec::new()),
                summarization: RwLock::new(SummarizationConfig::default()),
                discussions: RwLock::new(Vec::new()),
                active: Mutex::new(None),
                usage: Mutex::new(TokenUsageStats::default()),
                events: EventBus::new(),
            }),
            runtime: Arc::new(runtime),
            summarizer: Arc::new(summarizer),
            store: Arc::new(NoDiscussionStore),
            clock: Arc::new(SystemClock),
            quality: Arc::new(NoQualityScore),
        }
    }

    pub fn with_store(mut self, store: Arc<dyn DiscussionStore>) -> Self {
        self.store = store;
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_quality_scorer(mut self, scorer: Arc<dyn QualityScorer>) -> Self {
        self.quality = scorer;
        self
    }

    // ==================== Lifecycle ====================

    /// Start a discussion and spawn its turn loop on the current tokio
    /// runtime. Returns the new discussion's id.
    pub fn start_discussion(
        &self,
        topic: &str,
        context: Option<&str>,
        options: DiscussionOptions,
    ) -> Result<DiscussionId, ControllerError> {
        let topic = topic.trim();
        if topic.is_empty() {
            return Err(ControllerError::Validation("topic is empty".to_string()));
        }
        options.validate().map_err(ControllerError::Validation)?;
        let personas = self.resolve_participants(&options.participant_ids)?;

        let mut active = lock(&self.shared.active);
        if let Some(current) = active.as_ref()
            && read(&current.discussion).status().is_live()
        {
            return Err(ControllerError::Busy(current.discussion_id.clone()));
        }

        let mut discussion = Discussion::new(topic, personas.iter().map(|p| p.id.clone()).collect())
            .with_scope(options.scope.clone());
        if let Some(context) = context.map(str::trim).filter(|c| !c.is_empty()) {
            discussion = discussion.with_background(context);
        }
        discussion
            .transition(DiscussionStatus::Active)
            .map_err(|e| ControllerError::Validation(e.to_string()))?;

        let id = discussion.id.clone();
        let participants = discussion.participants().to_vec();
        let discussion = Arc::new(RwLock::new(discussion));
        let (status_tx, _) = watch::channel(DiscussionStatus::Active);
        let status_tx = Arc::new(status_tx);
        let control = Arc::new(ControlState::new());

        write(&self.shared.discussions).push((
            id.clone(),
            DiscussionEntry {
                discussion: Arc::clone(&discussion),
                status_tx: Arc::clone(&status_tx),
            },
        ));
        *active = Some(ActiveSession {
            discussion_id: id.clone(),
            discussion: Arc::clone(&discussion),
            control: Arc::clone(&control),
            human_intervention_enabled: options.human_intervention_enabled,
        });
        drop(active);
        *lock(&self.shared.usage) = TokenUsageStats::default();

        info!(
            discussion = %id,
            topic,
            participants = participants.len(),
            max_rounds = options.max_rounds,
            "Discussion started"
        );
        self.shared.events.publish(&DiscussionEvent::DiscussionStarted {
            discussion_id: id.clone(),
            topic: topic.to_string(),
            participants,
        });

        let scheduler = TurnScheduler::new(personas.iter().map(|p| p.as_ref()), options.max_rounds)
            .with_stop_on_decision(options.stop_on_decision);
        let turn_loop = TurnLoop {
            shared: Arc::clone(&self.shared),
            runtime: Arc::clone(&self.runtime),
            summarizer: Arc::clone(&self.summarizer),
            store: Arc::clone(&self.store),
            clock: Arc::clone(&self.clock),
            quality: Arc::clone(&self.quality),
            discussion,
            status_tx,
            control,
            monitor: BudgetMonitor::new(options.budget_limits()),
            options,
            personas,
            scheduler,
            id: id.clone(),
        };
        tokio::spawn(turn_loop.run());

        Ok(id)
    }

    /// Request a pause at the next turn boundary.
    pub fn pause_discussion(&self) -> Result<(), ControllerError> {
        let (discussion_id, control, status) = self.active_control()?;
        match status {
            DiscussionStatus::Active => {
                control.request_pause();
                Ok(())
            }
            status => self.reject(
                discussion_id,
                ControllerError::InvalidState {
                    operation: "pause",
                    status,
                },
            ),
        }
    }

    /// Resume a paused discussion, or cancel a pause not yet honored.
    pub fn resume_discussion(&self) -> Result<(), ControllerError> {
        let (discussion_id, control, status) = self.active_control()?;
        match status {
            DiscussionStatus::Paused => {
                control.clear_pause();
                Ok(())
            }
            DiscussionStatus::Active if control.is_pause_requested() => {
                control.clear_pause();
                Ok(())
            }
            status => self.reject(
                discussion_id,
                ControllerError::InvalidState {
                    operation: "resume",
                    status,
                },
            ),
        }
    }

    /// End the discussion at the next turn boundary. An in-flight model
    /// call is allowed to finish and its message is kept.
    pub fn stop_discussion(&self) -> Result<(), ControllerError> {
        let (discussion_id, control, status) = self.active_control()?;
        if !status.is_live() {
            return self.reject(
                discussion_id,
                ControllerError::InvalidState {
                    operation: "stop",
                    status,
                },
            );
        }
        control.request_stop();
        Ok(())
    }

    /// Queue human input for the next turn boundary. Accepted while the
    /// discussion is active or paused.
    pub fn add_human_intervention(
        &self,
        content: &str,
        impact: Option<ImpactLevel>,
    ) -> Result<InterventionId, ControllerError> {
        let content = content.trim();
        if content.is_empty() {
            return Err(ControllerError::Validation(
                "intervention is empty".to_string(),
            ));
        }

        let (discussion_id, error) = {
            let active = lock(&self.shared.active);
            let session = active.as_ref().ok_or(ControllerError::NoActiveDiscussion)?;
            let status = read(&session.discussion).status();
            let error = if !session.human_intervention_enabled {
                ControllerError::InterventionsDisabled
            } else if !status.is_live() {
                ControllerError::InvalidState {
                    operation: "intervene in",
                    status,
                }
            } else {
                let intervention =
                    HumanIntervention::new(content).with_impact(impact.unwrap_or_default());
                let id = intervention.id.clone();
                session.control.enqueue(intervention);
                return Ok(id);
            };
            (session.discussion_id.clone(), error)
        };
        self.reject(discussion_id, error)
    }

    /// Wait until discussion `id` is Completed or Aborted and return its
    /// final state.
    pub async fn wait_for_completion(&self, id: &DiscussionId) -> Result<Discussion, ControllerError> {
        let (discussion, mut status_rx) = {
            let discussions = read(&self.shared.discussions);
            let (_, entry) = discussions
                .iter()
                .find(|(entry_id, _)| entry_id == id)
                .ok_or_else(|| ControllerError::NotFound(id.clone()))?;
            (Arc::clone(&entry.discussion), entry.status_tx.subscribe())
        };
        // The sender lives in the history entry, so this only ends on a
        // terminal status.
        let _ = status_rx.wait_for(|status| status.is_terminal()).await;
        Ok(read(&discussion).clone())
    }

    // ==================== Queries ====================

    pub fn get_discussion(&self, id: &DiscussionId) -> Result<Discussion, ControllerError> {
        read(&self.shared.discussions)
            .iter()
            .find(|(entry_id, _)| entry_id == id)
            .map(|(_, entry)| read(&entry.discussion).clone())
            .ok_or_else(|| ControllerError::NotFound(id.clone()))
    }

    /// Snapshot of the running (Active or Paused) discussion.
    pub fn get_active_discussion(&self) -> Option<Discussion> {
        let active = lock(&self.shared.active);
        let snapshot = read(&active.as_ref()?.discussion).clone();
        snapshot.status().is_live().then_some(snapshot)
    }

    /// Every discussion this controller has run, oldest first.
    pub fn list_discussions(&self) -> Vec<Discussion> {
        read(&self.shared.discussions)
            .iter()
            .map(|(_, entry)| read(&entry.discussion).clone())
            .collect()
    }

    /// Token totals of the running or most recent discussion.
    pub fn get_token_usage_stats(&self) -> TokenUsageStats {
        *lock(&self.shared.usage)
    }

    pub fn events(&self) -> &EventBus {
        &self.shared.events
    }

    // ==================== Agents ====================

    /// Add a persona, replacing one with the same id. Running discussions
    /// keep the persona they started with.
    pub fn register_agent(&self, persona: AgentPersona) -> Result<(), ControllerError> {
        persona
            .validate()
            .map_err(|e| ControllerError::Validation(e.to_string()))?;
        let persona = Arc::new(persona);
        let mut agents = write(&self.shared.agents);
        match agents.iter_mut().find(|p| p.id == persona.id) {
            Some(existing) => *existing = persona,
            None => agents.push(persona),
        }
        Ok(())
    }

    pub fn get_agents(&self) -> Vec<Arc<AgentPersona>> {
        read(&self.shared.agents).clone()
    }

    pub fn get_agent(&self, id: &AgentId) -> Option<Arc<AgentPersona>> {
        read(&self.shared.agents).iter().find(|p| p.id == *id).cloned()
    }

    // ==================== Summarization ====================

    pub fn get_summarization_config(&self) -> SummarizationConfig {
        read(&self.shared.summarization).clone()
    }

    /// Replace the summarization settings; applies from the next boundary.
    pub fn update_summarization_config(
        &self,
        config: SummarizationConfig,
    ) -> Result<(), ControllerError> {
        config
            .validate()
            .map_err(|e| ControllerError::Validation(e.to_string()))?;
        *write(&self.shared.summarization) = config;
        Ok(())
    }

    // ==================== Helpers ====================

    fn resolve_participants(
        &self,
        ids: &[AgentId],
    ) -> Result<Vec<Arc<AgentPersona>>, ControllerError> {
        let agents = read(&self.shared.agents);
        let personas: Vec<Arc<AgentPersona>> = if ids.is_empty() {
            agents.clone()
        } else {
            let mut seen = HashSet::new();
            ids.iter()
                .map(|id| {
                    if !seen.insert(id) {
                        return Err(ControllerError::Validation(format!(
                            "persona '{}' listed twice",
                            id
                        )));
                    }
                    agents
                        .iter()
                        .find(|p| p.id == *id)
                        .cloned()
                        .ok_or_else(|| {
                            ControllerError::Validation(format!("unknown persona '{}'", id))
                        })
                })
                .collect::<Result<_, _>>()?
        };

        if personas.len() < 2 {
            return Err(ControllerError::Validation(format!(
                "a discussion needs at least 2 participants ({} available)",
                personas.len()
            )));
        }
        Ok(personas)
    }

    fn active_control(
        &self,
    ) -> Result<(DiscussionId, Arc<ControlState>, DiscussionStatus), ControllerError> {
        let active = lock(&self.shared.active);
        let session = active.as_ref().ok_or(ControllerError::NoActiveDiscussion)?;
        let status = read(&session.discussion).status();
        Ok((
            session.discussion_id.clone(),
            Arc::clone(&session.control),
            status,
        ))
    }

    /// Report a control operation refused by the running discussion, both
    /// on the bus and to the caller. Must be called without the active lock
    /// held, since subscribers may call back into the controller.
    fn reject<T>(
        &self,
        discussion_id: DiscussionId,
        error: ControllerError,
    ) -> Result<T, ControllerError> {
        warn!(discussion = %discussion_id, error = %error, "Control operation rejected");
        self.shared.events.publish(&DiscussionEvent::DiscussionError {
            discussion_id,
            error: error.to_string(),
        });
        Err(error)
    }
}
