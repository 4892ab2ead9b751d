//! Interactive session control from stdin.
//!
//! While a discussion runs, each input line is either a control command or
//! a human intervention:
//!
//! | Input | Effect |
//! |-------|--------|
//! | `/pause`, `/p` | Pause at the next turn boundary |
//! | `/resume`, `/r` | Resume (or cancel a pending pause) |
//! | `/stop`, `/q` | End the discussion |
//! | `/status`, `/s` | Print status and token usage |
//! | `/help`, `/?` | List commands |
//! | `!high <text>` / `!low <text>` | Intervention with that impact |
//! | anything else | Intervention with medium impact |

use colored::Colorize;
use roundtable_application::{ControllerError, SessionController};
use roundtable_domain::{DiscussionId, ImpactLevel};
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tracing::debug;

/// One parsed input line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ControlCommand {
    Pause,
    Resume,
    Stop,
    Status,
    Help,
    Intervene {
        content: String,
        impact: Option<ImpactLevel>,
    },
    Empty,
    Unknown(String),
}

impl ControlCommand {
    pub fn parse(line: &str) -> Self {
        let line = line.trim();
        if line.is_empty() {
            return ControlCommand::Empty;
        }

        if line.starts_with('/') {
            return match line.to_lowercase().as_str() {
                "/pause" | "/p" => ControlCommand::Pause,
                "/resume" | "/r" => ControlCommand::Resume,
                "/stop" | "/q" | "/quit" => ControlCommand::Stop,
                "/status" | "/s" => ControlCommand::Status,
                "/help" | "/?" => ControlCommand::Help,
                _ => ControlCommand::Unknown(line.to_string()),
            };
        }

        for (prefix, impact) in [("!high ", ImpactLevel::High), ("!low ", ImpactLevel::Low)] {
            if let Some(rest) = line.strip_prefix(prefix) {
                return ControlCommand::Intervene {
                    content: rest.trim().to_string(),
                    impact: Some(impact),
                };
            }
        }

        ControlCommand::Intervene {
            content: line.to_string(),
            impact: None,
        }
    }
}

/// Carry out `command` and return the line to show the user, if any.
pub fn apply(controller: &SessionController, command: ControlCommand) -> Option<String> {
    let result = match command {
        ControlCommand::Empty => return None,
        ControlCommand::Help => return Some(help()),
        ControlCommand::Unknown(input) => {
            return Some(format!(
                "{} Unknown command: {} (type /help)",
                "!".yellow(),
                input.red()
            ));
        }
        ControlCommand::Status => return Some(status(controller)),
        ControlCommand::Pause => controller
            .pause_discussion()
            .map(|_| "Pausing after the current turn...".to_string()),
        ControlCommand::Resume => controller
            .resume_discussion()
            .map(|_| "Resuming...".to_string()),
        ControlCommand::Stop => controller
            .stop_discussion()
            .map(|_| "Stopping after the current turn...".to_string()),
        ControlCommand::Intervene { content, impact } => controller
            .add_human_intervention(&content, impact)
            .map(|_| "Your message will be added at the next turn.".to_string()),
    };

    match result {
        Ok(text) => Some(text.dimmed().to_string()),
        // Published as discussionError; the console presenter shows it
        Err(ControllerError::InvalidState { .. } | ControllerError::InterventionsDisabled) => None,
        Err(e) => Some(format!("{} {}", "!".yellow(), e)),
    }
}

fn status(controller: &SessionController) -> String {
    let usage = controller.get_token_usage_stats();
    match controller.get_active_discussion() {
        Some(discussion) => format!(
            "{} {} | rounds {} | messages {} | summaries {} | tokens {}",
            "Status:".cyan().bold(),
            discussion.status(),
            discussion.rounds_completed,
            discussion.messages().len(),
            discussion.summaries().len(),
            usage.total_tokens
        ),
        None => format!("{} no discussion running", "Status:".cyan().bold()),
    }
}

fn help() -> String {
    [
        format!("  {}   pause at the next turn", "/pause".green()),
        format!("  {}  resume", "/resume".green()),
        format!("  {}    end the discussion", "/stop".red()),
        format!("  {}  show progress", "/status".cyan()),
        "  <text>   add your own message (prefix !high or !low to set impact)".to_string(),
    ]
    .join("\n")
}

/// Read commands from `input` until discussion `id` finishes.
///
/// End of input stops reading but keeps waiting for the discussion.
pub async fn run_control_prompt<R>(controller: SessionController, input: R, id: DiscussionId)
where
    R: AsyncBufRead + Unpin,
{
    let mut lines = input.lines();
    let mut input_open = true;
    let done = controller.wait_for_completion(&id);
    tokio::pin!(done);

    loop {
        tokio::select! {
            _ = &mut done => break,
            line = lines.next_line(), if input_open => match line {
                Ok(Some(line)) => {
                    if let Some(feedback) = apply(&controller, ControlCommand::parse(&line)) {
                        println!("{}", feedback);
                    }
                }
                Ok(None) => input_open = false,
                Err(e) => {
                    debug!(error = %e, "Control input closed");
                    input_open = false;
                }
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use roundtable_application::{
        AgentRuntime, CompletionRequest, DiscussionOptions, LlmClient, LlmError,
        SummarizationEngine,
    };
    use roundtable_domain::{
        AgentPersona, Completion, CompletionReason, PersonaRole, RoleProfile, TokenUsage,
    };
    use std::sync::Arc;
    use std::time::Duration;

    struct EchoClient;

    #[async_trait]
    impl LlmClient for EchoClient {
        fn provider(&self) -> &str {
            "echo"
        }

        async fn complete(&self, request: CompletionRequest) -> Result<Completion, LlmError> {
            tokio::task::yield_now().await;
            Ok(Completion::new(
                format!("echo {}", request.messages.len()),
                TokenUsage::new(4, 2),
            ))
        }
    }

    fn controller() -> SessionController {
        let client = Arc::new(EchoClient);
        let controller =
            SessionController::new(AgentRuntime::new(client.clone()), SummarizationEngine::new(client));
        for (id, role) in [("writer", PersonaRole::Writer), ("editor", PersonaRole::Editor)] {
            controller
                .register_agent(AgentPersona::new(id, id, RoleProfile::for_role(role), "p"))
                .unwrap();
        }
        controller
    }

    #[test]
    fn test_parse_commands() {
        assert_eq!(ControlCommand::parse("  /PAUSE "), ControlCommand::Pause);
        assert_eq!(ControlCommand::parse("/r"), ControlCommand::Resume);
        assert_eq!(ControlCommand::parse("/quit"), ControlCommand::Stop);
        assert_eq!(ControlCommand::parse(""), ControlCommand::Empty);
        assert_eq!(
            ControlCommand::parse("/dance"),
            ControlCommand::Unknown("/dance".to_string())
        );
    }

    #[test]
    fn test_parse_interventions() {
        assert_eq!(
            ControlCommand::parse("What if it rains?"),
            ControlCommand::Intervene {
                content: "What if it rains?".to_string(),
                impact: None
            }
        );
        assert_eq!(
            ControlCommand::parse("!high Kill the mentor"),
            ControlCommand::Intervene {
                content: "Kill the mentor".to_string(),
                impact: Some(ImpactLevel::High)
            }
        );
        assert_eq!(
            ControlCommand::parse("!low maybe a cat"),
            ControlCommand::Intervene {
                content: "maybe a cat".to_string(),
                impact: Some(ImpactLevel::Low)
            }
        );
    }

    #[test]
    fn test_apply_without_discussion_reports_error() {
        colored::control::set_override(false);
        let controller = controller();
        let feedback = apply(&controller, ControlCommand::Pause).unwrap();
        assert!(feedback.contains("No active discussion"));
        assert!(apply(&controller, ControlCommand::Empty).is_none());
        assert!(
            apply(&controller, ControlCommand::Status)
                .unwrap()
                .contains("no discussion running")
        );
    }

    #[tokio::test]
    async fn test_stop_from_input_ends_discussion() {
        let controller = controller();
        let id = controller
            .start_discussion(
                "Glacier port",
                None,
                DiscussionOptions::default().with_max_rounds(1000),
            )
            .unwrap();

        let input = tokio::io::BufReader::new(&b"!high colder\n/stop\n"[..]);
        tokio::time::timeout(
            Duration::from_secs(10),
            run_control_prompt(controller.clone(), input, id.clone()),
        )
        .await
        .unwrap();

        let discussion = controller.get_discussion(&id).unwrap();
        assert_eq!(discussion.completion_reason, Some(CompletionReason::Stopped));
        assert!(discussion.messages().len() < 2000);
    }
}
