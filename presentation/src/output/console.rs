//! Console presenter for discussion events

use colored::Colorize;
use roundtable_application::{DiscussionEvent, EventSubscriber};
use roundtable_domain::{AgentMessage, DiscussionReport};
use std::time::Duration;

/// Prints discussion events to stdout as they happen.
pub struct ConsolePresenter {
    quiet: bool,
}

impl ConsolePresenter {
    pub fn new() -> Self {
        Self { quiet: false }
    }

    /// Only messages, errors and the final report.
    pub fn quiet(mut self, quiet: bool) -> Self {
        self.quiet = quiet;
        self
    }

    /// Render one event, or `None` if it is not shown at this verbosity.
    pub fn render(&self, event: &DiscussionEvent) -> Option<String> {
        match event {
            DiscussionEvent::DiscussionStarted {
                topic,
                participants,
                ..
            } => Some(format!(
                "{}\n{} {}\n{} {}\n",
                Self::header("Roundtable"),
                "Topic:".cyan().bold(),
                topic,
                "Participants:".cyan().bold(),
                participants
                    .iter()
                    .map(|p| p.as_str())
                    .collect::<Vec<_>>()
                    .join(", ")
            )),
            DiscussionEvent::AgentSpoke { message, .. } => Some(Self::message(message)),
            DiscussionEvent::HumanIntervention { intervention, .. } => Some(format!(
                "\n{}\n{}\n",
                format!("── You ({} impact) ──", intervention.impact)
                    .green()
                    .bold(),
                intervention.content
            )),
            DiscussionEvent::DiscussionPaused { .. } => Some(
                "Discussion paused. Type /resume to continue."
                    .yellow()
                    .to_string(),
            ),
            DiscussionEvent::DiscussionResumed { .. } => {
                (!self.quiet).then(|| "Discussion resumed.".dimmed().to_string())
            }
            DiscussionEvent::RoundCompleted { round, .. } => {
                (!self.quiet).then(|| format!("Round {} complete", round).dimmed().to_string())
            }
            DiscussionEvent::SummarizationStarted { range, .. } => (!self.quiet)
                .then(|| format!("Summarizing {}...", range).dimmed().to_string()),
            DiscussionEvent::SummarizationCompleted { range, .. } => (!self.quiet)
                .then(|| format!("Summarized {}", range).dimmed().to_string()),
            DiscussionEvent::SummarizationError { range, error, .. } => Some(format!(
                "{} {}",
                format!("Could not summarize {}:", range).yellow(),
                error
            )),
            DiscussionEvent::AgentError {
                agent_id,
                error,
                fatal,
                ..
            } => Some(if *fatal {
                format!(
                    "{} {}",
                    format!("{} left the discussion:", agent_id).red().bold(),
                    error
                )
            } else {
                format!(
                    "{} {}",
                    format!("{} skipped a turn:", agent_id).yellow(),
                    error
                )
            }),
            DiscussionEvent::BudgetWarning { cause, .. } => Some(
                format!("Budget exhausted ({}), continuing because auto-stop is off", cause)
                    .yellow()
                    .to_string(),
            ),
            DiscussionEvent::DiscussionCompleted { report, .. }
            | DiscussionEvent::DiscussionAutoStopped { report, .. }
            | DiscussionEvent::DiscussionTimeout { report, .. } => Some(Self::report(report)),
            DiscussionEvent::DiscussionError { error, .. } => Some(format!(
                "{} {}",
                "Discussion error:".red().bold(),
                error
            )),
        }
    }

    fn message(message: &AgentMessage) -> String {
        format!(
            "\n{}\n{}\n",
            format!("── {} ({}) ──", message.author_name, message.role)
                .yellow()
                .bold(),
            message.content.trim()
        )
    }

    /// Final report block.
    pub fn report(report: &DiscussionReport) -> String {
        let mut output = String::new();
        output.push_str(&format!("\n{}\n", Self::header("Discussion finished")));
        output.push_str(&format!(
            "{} {}",
            "Status:".cyan().bold(),
            report.status
        ));
        if let Some(reason) = report.reason {
            output.push_str(&format!(" ({})", reason));
        }
        output.push('\n');
        output.push_str(&format!(
            "{} {}   {} {} ({} from you)   {} {}\n",
            "Rounds:".cyan().bold(),
            report.rounds_completed,
            "Messages:".cyan().bold(),
            report.message_count,
            report.human_message_count,
            "Summaries:".cyan().bold(),
            report.summary_count
        ));
        let usage = &report.token_usage;
        output.push_str(&format!(
            "{} {} ({} prompt / {} completion, {} calls)",
            "Tokens:".cyan().bold(),
            usage.total_tokens,
            usage.prompt_tokens,
            usage.completion_tokens,
            usage.agent_calls
        ));
        if usage.summarization_tokens > 0 {
            output.push_str(&format!(" + {} for summaries", usage.summarization_tokens));
        }
        output.push('\n');
        output.push_str(&format!(
            "{} {}\n",
            "Elapsed:".cyan().bold(),
            format_duration(report.elapsed())
        ));
        if let Some(score) = report.quality_score {
            output.push_str(&format!("{} {:.2}\n", "Quality:".cyan().bold(), score));
        }
        if !report.decisions.is_empty() {
            output.push_str(&format!("\n{}\n", "Decisions:".green().bold()));
            for decision in &report.decisions {
                output.push_str(&format!("  * {}\n", decision));
            }
        }
        output.push_str(&format!("{}\n", "=".repeat(60).cyan()));
        output
    }

    fn header(title: &str) -> String {
        let line = "=".repeat(60);
        format!("{}\n{:^60}\n{}", line.cyan(), title.bold(), line.cyan())
    }
}

impl Default for ConsolePresenter {
    fn default() -> Self {
        Self::new()
    }
}

impl EventSubscriber for ConsolePresenter {
    fn on_event(&self, event: &DiscussionEvent) {
        if let Some(text) = self.render(event) {
            println!("{}", text);
        }
    }
}

/// `1m 05s` style.
pub fn format_duration(duration: Duration) -> String {
    let secs = duration.as_secs();
    if secs >= 60 {
        format!("{}m {:02}s", secs / 60, secs % 60)
    } else {
        format!("{}.{}s", secs, duration.subsec_millis() / 100)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use roundtable_domain::{
        CompletionReason, DiscussionId, DiscussionStatus, HumanIntervention, ImpactLevel,
        TokenUsageStats,
    };

    fn plain() {
        colored::control::set_override(false);
    }

    fn report() -> DiscussionReport {
        DiscussionReport {
            discussion_id: DiscussionId::new("d1"),
            topic: "Glacier port".to_string(),
            status: DiscussionStatus::Completed,
            reason: Some(CompletionReason::Decision),
            rounds_completed: 2,
            message_count: 5,
            human_message_count: 1,
            summary_count: 0,
            decisions: vec!["The port is frozen half the year".to_string()],
            quality_score: None,
            token_usage: TokenUsageStats {
                prompt_tokens: 400,
                completion_tokens: 100,
                total_tokens: 500,
                agent_calls: 4,
                summarization_tokens: 0,
            },
            elapsed_ms: 65_000,
        }
    }

    #[test]
    fn test_report_lists_outcome_and_decisions() {
        plain();
        let text = ConsolePresenter::report(&report());
        assert!(text.contains("Status: completed (decision)"));
        assert!(text.contains("Messages: 5 (1 from you)"));
        assert!(text.contains("Tokens: 500"));
        assert!(text.contains("Elapsed: 1m 05s"));
        assert!(text.contains("* The port is frozen half the year"));
        assert!(!text.contains("for summaries"));
    }

    #[test]
    fn test_quiet_hides_progress_only() {
        plain();
        let presenter = ConsolePresenter::new().quiet(true);
        let id = DiscussionId::new("d1");
        assert!(presenter
            .render(&DiscussionEvent::RoundCompleted {
                discussion_id: id.clone(),
                round: 1
            })
            .is_none());

        let intervention = HumanIntervention::new("Colder").with_impact(ImpactLevel::High);
        let text = presenter
            .render(&DiscussionEvent::HumanIntervention {
                discussion_id: id,
                intervention,
            })
            .unwrap();
        assert!(text.contains("You (high impact)"));
        assert!(text.contains("Colder"));
    }

    #[test]
    fn test_fatal_agent_error_wording() {
        plain();
        let text = ConsolePresenter::new()
            .render(&DiscussionEvent::AgentError {
                discussion_id: DiscussionId::new("d1"),
                agent_id: "editor".into(),
                error: "Authentication failed: revoked".to_string(),
                fatal: true,
            })
            .unwrap();
        assert!(text.starts_with("editor left the discussion:"));
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(Duration::from_millis(4_250)), "4.2s");
        assert_eq!(format_duration(Duration::from_secs(125)), "2m 05s");
    }
}
