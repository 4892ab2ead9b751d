//! The per-discussion turn loop
//!
//! Runs on its own task and is the only writer of its discussion. Each
//! iteration is one turn boundary:
//!
//! stop -> pause -> one human intervention -> budget -> round limit /
//! decision -> summarization -> next speaker -> append and publish ->
//! round bookkeeping.

use super::control::ControlState;
use super::{Shared, lock, read, write};
use crate::config::DiscussionOptions;
use crate::ports::clock::Clock;
use crate::ports::discussion_store::{DiscussionRow, DiscussionStore, MessageRow};
use crate::ports::events::DiscussionEvent;
use crate::use_cases::agent_runtime::AgentRuntime;
use crate::use_cases::summarize::SummarizationEngine;
use roundtable_domain::{
    AgentMessage, AgentPersona, BudgetCause, BudgetMonitor, CompletionReason, Discussion,
    DiscussionId, DiscussionReport, DiscussionStatus, MessageMetadata, QualityScorer,
    TurnScheduler,
};
use std::sync::{Arc, RwLock};
use tokio::sync::watch;
use tracing::{debug, error, info, warn};

/// How a finished discussion is announced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Ending {
    Completed,
    AutoStopped,
    Timeout,
    Aborted,
}

enum Boundary {
    Continue,
    Finish(Ending, CompletionReason),
}

pub(super) struct TurnLoop {
    pub shared: Arc<Shared>,
    pub runtime: Arc<AgentRuntime>,
    pub summarizer: Arc<SummarizationEngine>,
    pub store: Arc<dyn DiscussionStore>,
    pub clock: Arc<dyn Clock>,
    pub quality: Arc<dyn QualityScorer>,
    pub discussion: Arc<RwLock<Discussion>>,
    pub status_tx: Arc<watch::Sender<DiscussionStatus>>,
    pub control: Arc<ControlState>,
    pub options: DiscussionOptions,
    pub personas: Vec<Arc<AgentPersona>>,
    pub scheduler: TurnScheduler,
    pub monitor: BudgetMonitor,
    pub id: DiscussionId,
}

impl TurnLoop {
    pub async fn run(mut self) {
        self.monitor.start(self.clock.now());
        if self.options.save_to_database {
            let row = DiscussionRow::from_discussion(&self.snapshot());
            if let Err(e) = self.store.save_discussion(row).await {
                warn!(discussion = %self.id, error = %e, "Failed to persist discussion");
            }
        }

        let (ending, reason) = loop {
            match self.boundary().await {
                Boundary::Continue => continue,
                Boundary::Finish(ending, reason) => break (ending, reason),
            }
        };
        self.finish(ending, reason).await;
    }

    async fn boundary(&mut self) -> Boundary {
        if self.control.is_stop_requested() {
            info!(discussion = %self.id, "Stop requested");
            return Boundary::Finish(Ending::Completed, CompletionReason::Stopped);
        }

        if self.control.is_pause_requested() {
            return self.pause().await;
        }

        if let Some(intervention) = self.control.dequeue() {
            let message = AgentMessage::from_intervention(&intervention);
            if let Err(ending) = self.append(message.clone()) {
                return ending;
            }
            self.publish(DiscussionEvent::HumanIntervention {
                discussion_id: self.id.clone(),
                intervention,
            });
            self.persist_message(&message).await;
            return Boundary::Continue;
        }

        if let Some(finish) = self.check_budget() {
            return finish;
        }

        let decided = read(&self.discussion).has_decision();
        if let Some(reason) = self.scheduler.should_stop(decided) {
            return Boundary::Finish(Ending::Completed, reason);
        }

        // Control requests may arrive while the summary call is in flight.
        if self.summarize_if_needed().await
            && (self.control.is_stop_requested() || self.control.is_pause_requested())
        {
            return Boundary::Continue;
        }

        self.take_turn().await
    }

    // ==================== Pause ====================

    async fn pause(&mut self) -> Boundary {
        if let Err(ending) = self.set_status(DiscussionStatus::Paused).await {
            return ending;
        }
        self.monitor.pause(self.clock.now());
        info!(discussion = %self.id, "Discussion paused");
        self.publish(DiscussionEvent::DiscussionPaused {
            discussion_id: self.id.clone(),
        });

        self.control.wait_while_paused().await;

        if self.control.is_stop_requested() {
            // Paused -> Completed directly
            return Boundary::Finish(Ending::Completed, CompletionReason::Stopped);
        }

        if let Err(ending) = self.set_status(DiscussionStatus::Active).await {
            return ending;
        }
        self.monitor.resume(self.clock.now());
        info!(discussion = %self.id, "Discussion resumed");
        self.publish(DiscussionEvent::DiscussionResumed {
            discussion_id: self.id.clone(),
        });
        Boundary::Continue
    }

    // ==================== Budget ====================

    fn check_budget(&mut self) -> Option<Boundary> {
        let now = self.clock.now();
        if self.options.auto_stop {
            return self.monitor.check(now).map(|cause| match cause {
                BudgetCause::TimeLimit => {
                    Boundary::Finish(Ending::Timeout, CompletionReason::TimeLimit)
                }
                BudgetCause::TokenLimit => {
                    Boundary::Finish(Ending::AutoStopped, CompletionReason::TokenLimit)
                }
            });
        }
        for cause in self.monitor.new_warnings(now) {
            warn!(discussion = %self.id, %cause, "Budget exhausted, continuing without auto-stop");
            self.publish(DiscussionEvent::BudgetWarning {
                discussion_id: self.id.clone(),
                cause,
            });
        }
        None
    }

    // ==================== Summarization ====================

    /// Summarize the next window if one is due. Returns whether a summary
    /// call was made.
    async fn summarize_if_needed(&mut self) -> bool {
        let config = read(&self.shared.summarization).clone();
        let snapshot = self.snapshot();
        let Some(range) = config.next_window(&snapshot) else {
            return false;
        };

        self.publish(DiscussionEvent::SummarizationStarted {
            discussion_id: self.id.clone(),
            range,
        });

        let outcome = self.summarizer.summarize(&snapshot, range, &config).await;
        let error = match outcome {
            Ok(outcome) => {
                self.monitor.record_summarization_usage(&outcome.usage);
                self.sync_usage();
                let added = write(&self.discussion).add_summary(outcome.summary.clone());
                match added {
                    Ok(()) => {
                        self.publish(DiscussionEvent::SummarizationCompleted {
                            discussion_id: self.id.clone(),
                            range,
                            summary: outcome.summary,
                        });
                        return true;
                    }
                    Err(e) => e.to_string(),
                }
            }
            Err(e) => e.to_string(),
        };

        warn!(discussion = %self.id, %range, error = %error, "Summarization failed");
        self.publish(DiscussionEvent::SummarizationError {
            discussion_id: self.id.clone(),
            range,
            error,
        });
        true
    }

    // ==================== Turns ====================

    async fn take_turn(&mut self) -> Boundary {
        if !self.scheduler.has_rotation_participants() {
            return self.abort_all_failed();
        }
        let Some(persona) = self
            .scheduler
            .next_speaker()
            .and_then(|id| self.personas.iter().find(|p| p.id == *id))
            .cloned()
        else {
            return self.abort_all_failed();
        };

        let snapshot = self.snapshot();
        debug!(discussion = %self.id, agent = %persona.id, round = self.scheduler.round() + 1, "Next turn");

        match self.runtime.produce_turn(&persona, &snapshot).await {
            Ok(turn) => {
                let message = AgentMessage::from_agent(&persona, turn.content).with_metadata(
                    MessageMetadata {
                        thinking_time_ms: Some(turn.duration.as_millis() as u64),
                        token_usage: Some(turn.usage),
                        ..Default::default()
                    },
                );
                if let Err(ending) = self.append(message.clone()) {
                    return ending;
                }
                self.monitor.record_agent_usage(&turn.usage);
                self.sync_usage();
                self.publish(DiscussionEvent::AgentSpoke {
                    discussion_id: self.id.clone(),
                    message: message.clone(),
                });
                self.persist_message(&message).await;
            }
            Err(e) => {
                let fatal = e.is_fatal();
                if fatal {
                    error!(discussion = %self.id, agent = %persona.id, error = %e, "Agent disabled");
                    self.scheduler.disable(&persona.id);
                } else {
                    warn!(discussion = %self.id, agent = %persona.id, error = %e, "Turn skipped");
                }
                self.publish(DiscussionEvent::AgentError {
                    discussion_id: self.id.clone(),
                    agent_id: persona.id.clone(),
                    error: e.to_string(),
                    fatal,
                });
            }
        }

        if self.scheduler.complete_turn() {
            return self.end_round();
        }
        Boundary::Continue
    }

    fn end_round(&mut self) -> Boundary {
        let round = self.scheduler.round();
        self.monitor.set_rounds(round);

        let score = {
            let mut discussion = write(&self.discussion);
            discussion.rounds_completed = round;
            let score = self.quality.score(&discussion);
            if score.is_some() {
                discussion.quality_score = score;
            }
            score
        };

        info!(discussion = %self.id, round, ?score, "Round completed");
        self.publish(DiscussionEvent::RoundCompleted {
            discussion_id: self.id.clone(),
            round,
        });

        if let (Some(score), Some(threshold)) = (score, self.options.quality_threshold)
            && self.options.auto_stop
            && score >= threshold
        {
            return Boundary::Finish(Ending::AutoStopped, CompletionReason::QualityThreshold);
        }
        Boundary::Continue
    }

    fn abort_all_failed(&self) -> Boundary {
        Boundary::Finish(Ending::Aborted, CompletionReason::AllAgentsFailed)
    }

    // ==================== State helpers ====================

    fn snapshot(&self) -> Discussion {
        read(&self.discussion).clone()
    }

    fn publish(&self, event: DiscussionEvent) {
        self.shared.events.publish(&event);
    }

    fn sync_usage(&self) {
        *lock(&self.shared.usage) = self.monitor.usage();
    }

    /// Append to the log; a refusal means the loop's view of the status is
    /// broken and the discussion is aborted.
    fn append(&self, message: AgentMessage) -> Result<(), Boundary> {
        let appended = write(&self.discussion).append_message(message);
        appended.map(|_| ()).map_err(|e| {
            error!(discussion = %self.id, error = %e, "Append rejected");
            Boundary::Finish(Ending::Aborted, CompletionReason::Stopped)
        })
    }

    async fn set_status(&self, status: DiscussionStatus) -> Result<(), Boundary> {
        let moved = write(&self.discussion).transition(status);
        if let Err(e) = moved {
            error!(discussion = %self.id, error = %e, "Status change rejected");
            return Err(Boundary::Finish(Ending::Aborted, CompletionReason::Stopped));
        }
        self.status_tx.send_replace(status);
        self.persist_status(status).await;
        Ok(())
    }

    async fn persist_message(&self, message: &AgentMessage) {
        if !self.options.save_to_database {
            return;
        }
        let row = MessageRow::from_message(self.id.as_str(), message);
        if let Err(e) = self.store.append_message(row).await {
            warn!(discussion = %self.id, error = %e, "Failed to persist message");
        }
    }

    async fn persist_status(&self, status: DiscussionStatus) {
        if !self.options.save_to_database {
            return;
        }
        if let Err(e) = self.store.update_status(self.id.as_str(), status).await {
            warn!(discussion = %self.id, error = %e, "Failed to persist status");
        }
    }

    // ==================== Finish ====================

    async fn finish(self, ending: Ending, reason: CompletionReason) {
        let status = match ending {
            Ending::Aborted => DiscussionStatus::Aborted,
            _ => DiscussionStatus::Completed,
        };
        let now = self.clock.now();

        let report = {
            let mut discussion = write(&self.discussion);
            if let Err(e) = discussion.finish(status, reason) {
                error!(discussion = %self.id, error = %e, "Could not finish discussion");
            }
            DiscussionReport::from_discussion(&discussion, self.monitor.usage(), self.monitor.elapsed(now))
        };
        let final_status = report.status;

        info!(
            discussion = %self.id,
            status = %final_status,
            %reason,
            rounds = report.rounds_completed,
            messages = report.message_count,
            tokens = report.token_usage.total_tokens,
            "Discussion finished"
        );

        let discussion_id = self.id.clone();
        let report = Box::new(report);
        self.publish(match ending {
            Ending::Completed => DiscussionEvent::DiscussionCompleted {
                discussion_id,
                report,
            },
            Ending::AutoStopped => DiscussionEvent::DiscussionAutoStopped {
                discussion_id,
                report,
            },
            Ending::Timeout => DiscussionEvent::DiscussionTimeout {
                discussion_id,
                report,
            },
            Ending::Aborted => DiscussionEvent::DiscussionError {
                discussion_id,
                error: match reason {
                    CompletionReason::AllAgentsFailed => {
                        "no participant can take further turns".to_string()
                    }
                    other => format!("discussion aborted ({})", other),
                },
            },
        });

        self.persist_status(final_status).await;
        self.status_tx.send_replace(final_status);

        let mut active = lock(&self.shared.active);
        if active.as_ref().is_some_and(|a| a.discussion_id == self.id) {
            *active = None;
        }
    }
}
