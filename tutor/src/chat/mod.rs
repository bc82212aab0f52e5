//! Chat with the MentorIA assistant.
//!
//! [`ChatResponder`] answers one message given an already-windowed history.
//! [`ChatSession`] owns a full display log, forwards only the recent window to the
//! model and runs its sends one at a time. [`ChatSessionStore`] keeps sessions by id.

pub mod session;
pub mod store;

pub use session::ChatSession;
pub use store::{ChatSessionStore, ChatSessionStoreRef, InMemoryChatSessionStore};

use chrono::Utc;
use mentoria_core::ModelGatewayRef;
use tracing::debug;

use crate::error::TutorResult;
use crate::model::{ChatReply, ChatRole, HistoryTurn};
use crate::prompts::{CHAT_MODEL_LABEL, CHAT_PERSONA, CHAT_USER_LABEL};
use crate::validation::{window, ChatParams};

#[derive(Clone)]
pub struct ChatResponder {
    gateway: ModelGatewayRef,
}

impl ChatResponder {
    pub fn new(gateway: ModelGatewayRef) -> Self {
        Self { gateway }
    }

    /// Persona, optional context, transcript of `history` and the new message.
    pub fn build_prompt(context: Option<&str>, history: &[HistoryTurn], message: &str) -> String {
        let mut prompt = CHAT_PERSONA.to_string();
        if let Some(context) = context {
            prompt.push_str(&format!("\n\nContexto de la conversación: {}", context));
        }

        if !history.is_empty() {
            prompt.push_str("\n\nHistorial de conversación:");
            for turn in history {
                let label = match turn.role {
                    ChatRole::User => CHAT_USER_LABEL,
                    ChatRole::Model => CHAT_MODEL_LABEL,
                };
                prompt.push_str(&format!("\n{}: {}", label, turn.content));
            }
        }

        prompt.push_str(&format!(
            "\n\n{}: {}\n\n{}:",
            CHAT_USER_LABEL, message, CHAT_MODEL_LABEL
        ));
        prompt
    }

    /// Sends one turn to the model. Only the last window of `history` is forwarded.
    pub async fn complete_turn(
        &self,
        context: Option<&str>,
        history: &[HistoryTurn],
        message: &str,
    ) -> TutorResult<String> {
        let history = window(history);
        let prompt = Self::build_prompt(context, history, message);
        debug!(
            history_len = history.len(),
            prompt_len = prompt.len(),
            "Sending chat turn"
        );
        Ok(self.gateway.complete(&prompt).await?)
    }

    /// Stateless reply for a validated request that carries its own history.
    pub async fn reply(&self, params: &ChatParams) -> TutorResult<ChatReply> {
        let message = self
            .complete_turn(params.context.as_deref(), &params.history, &params.message)
            .await?;
        Ok(ChatReply {
            message,
            timestamp: Utc::now(),
        })
    }
}

/// Lines of a rendered prompt that are transcript turns (`Usuario: …` / `MentorIA: …`).
#[cfg(test)]
pub(crate) fn transcript_lines(prompt: &str) -> Vec<&str> {
    let user = format!("{}: ", CHAT_USER_LABEL);
    let model = format!("{}: ", CHAT_MODEL_LABEL);
    prompt
        .lines()
        .filter(|line| line.starts_with(&user) || line.starts_with(&model))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::ScriptedGateway;

    fn turn(role: ChatRole, content: &str) -> HistoryTurn {
        HistoryTurn {
            role,
            content: content.to_string(),
        }
    }

    #[test]
    fn test_prompt_without_history() {
        let prompt = ChatResponder::build_prompt(None, &[], "¿Qué es un átomo?");
        assert!(prompt.starts_with(CHAT_PERSONA));
        assert!(!prompt.contains("Historial"));
        assert!(!prompt.contains("Contexto"));
        assert!(prompt.ends_with("Usuario: ¿Qué es un átomo?\n\nMentorIA:"));
    }

    #[test]
    fn test_prompt_with_context_and_history() {
        let history = vec![
            turn(ChatRole::User, "hola"),
            turn(ChatRole::Model, "¡Hola! ¿En qué te ayudo?"),
        ];
        let prompt = ChatResponder::build_prompt(
            Some("química básica"),
            &history,
            "explícame los enlaces",
        );

        assert!(prompt.contains("Contexto de la conversación: química básica"));
        assert!(prompt.contains(
            "Historial de conversación:\nUsuario: hola\nMentorIA: ¡Hola! ¿En qué te ayudo?"
        ));
        assert_eq!(transcript_lines(&prompt).len(), 3);
    }

    #[tokio::test]
    async fn test_reply_windows_oversized_history() {
        let gateway = ScriptedGateway::replying(&["claro"]);
        let responder = ChatResponder::new(gateway.clone());
        let history: Vec<HistoryTurn> = (0..14)
            .map(|i| turn(ChatRole::User, &format!("mensaje {:02}", i)))
            .collect();

        let reply = responder
            .reply(&ChatParams {
                message: "última".to_string(),
                context: None,
                history,
            })
            .await
            .unwrap();

        assert_eq!(reply.message, "claro");
        let prompt = gateway.last_prompt();
        assert_eq!(transcript_lines(&prompt).len(), 11);
        assert!(!prompt.contains("mensaje 03"));
        assert!(prompt.contains("mensaje 04"));
    }
}
