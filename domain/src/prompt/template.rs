//! Prompt templates for discussion turns and summaries

use crate::discussion::entities::Discussion;
use crate::discussion::message::AgentMessage;
use crate::discussion::summary::MessageRange;
use crate::llm::chat::ChatMessage;
use crate::persona::entities::AgentPersona;

/// Templates for generating prompts
pub struct PromptTemplate;

impl PromptTemplate {
    /// System prompt for one persona: its own prompt, traits, tone, role
    /// instructions, goals and constraints.
    pub fn persona_system(persona: &AgentPersona) -> String {
        let mut prompt = persona.system_prompt.trim().to_string();

        prompt.push_str(&format!(
            "\n\nYour name is {}. Your role in this writers' room is {}. {} Keep a {} tone.",
            persona.name,
            persona.role(),
            persona.traits.describe_all(),
            persona.tone.as_str()
        ));

        let instructions = persona.profile.instructions();
        if !instructions.is_empty() {
            prompt.push_str("\n\nHow you contribute:");
            for line in instructions {
                prompt.push_str(&format!("\n- {}", line));
            }
        }
        if !persona.goals.is_empty() {
            prompt.push_str("\n\nYour goals:");
            for goal in &persona.goals {
                prompt.push_str(&format!("\n- {}", goal));
            }
        }
        if !persona.constraints.is_empty() {
            prompt.push_str("\n\nYou must respect these constraints:");
            for constraint in &persona.constraints {
                prompt.push_str(&format!("\n- {}", constraint));
            }
        }
        prompt
    }

    /// Topic block shown at the top of every turn.
    pub fn topic_brief(discussion: &Discussion) -> String {
        let mut brief = format!("Discussion topic: {}", discussion.topic);
        if let Some(background) = discussion.background.as_deref().filter(|b| !b.trim().is_empty())
        {
            brief.push_str(&format!("\n\nBackground:\n{}", background.trim()));
        }
        brief
    }

    /// Chat messages for `persona`'s next turn.
    ///
    /// Summarized messages are represented only by their summaries; at most
    /// `context_window` of the later raw messages follow. The persona's own
    /// messages are sent as assistant turns, everyone else's as user turns
    /// prefixed with the speaker's name.
    pub fn turn_messages(
        persona: &AgentPersona,
        discussion: &Discussion,
        context_window: usize,
    ) -> Vec<ChatMessage> {
        let mut messages = vec![
            ChatMessage::system(Self::persona_system(persona)),
            ChatMessage::user(Self::topic_brief(discussion)),
        ];

        if !discussion.summaries().is_empty() {
            let mut text = String::from("Summary of the earlier discussion:");
            for summary in discussion.summaries() {
                text.push_str(&format!("\n\n({})\n{}", summary.range, summary.text.trim()));
            }
            messages.push(ChatMessage::user(text));
        }

        let tail = discussion.unsummarized_messages();
        let recent = &tail[tail.len().saturating_sub(context_window)..];
        for message in recent {
            if message.author == persona.id {
                messages.push(ChatMessage::assistant(message.content.clone()));
            } else {
                messages.push(ChatMessage::user(Self::attributed(message)));
            }
        }

        messages.push(ChatMessage::user(format!(
            "It is your turn, {}. Respond as the {} in a few paragraphs. \
             Build on what was said rather than repeating it. \
             If the group has agreed on something, state it on its own line as `DECISION: <what was decided>`.",
            persona.name,
            persona.role()
        )));
        messages
    }

    /// System prompt for history summarization
    pub fn summary_system() -> &'static str {
        r#"You condense the transcript of a writers' room discussion.
Preserve every proposal, objection and decision, and who made it.
Drop greetings, repetition and filler. Write plain prose, no headings."#
    }

    /// Chat messages asking for a summary of `range`.
    pub fn summary_messages(
        discussion: &Discussion,
        range: MessageRange,
        target_length: usize,
    ) -> Vec<ChatMessage> {
        let end = range.end.min(discussion.messages().len());
        let start = range.start.min(end);

        let mut transcript = format!("{}\n\nTranscript ({}):\n", Self::topic_brief(discussion), range);
        for message in &discussion.messages()[start..end] {
            transcript.push_str(&format!("\n{}\n", Self::attributed(message)));
        }
        transcript.push_str(&format!(
            "\nSummarize this part of the discussion in at most {} words.",
            target_length
        ));

        vec![
            ChatMessage::system(Self::summary_system()),
            ChatMessage::user(transcript),
        ]
    }

    fn attributed(message: &AgentMessage) -> String {
        format!("[{}]: {}", message.author_name, message.content)
    }
}
