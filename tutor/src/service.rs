use mentoria_core::{ModelGatewayRef, RetryPolicy, RetryingGateway};
use std::sync::Arc;
use tracing::{debug, info};

use crate::analyzer::TextAnalyzer;
use crate::chat::{ChatResponder, ChatSession};
use crate::error::{TutorError, TutorResult};
use crate::generator::ContentGenerator;
use crate::model::{Analysis, ChatMessage, ChatReply, GeneratedContent, Quiz};
use crate::quiz::QuizSynthesizer;
use crate::validation::{AnalyzeRequest, ChatRequest, GenerateRequest, QuizRequest};

/// The four tutor operations behind their boundary validators.
///
/// Stateless and cheap to clone; every component shares one gateway.
#[derive(Clone)]
pub struct TutorService {
    generator: ContentGenerator,
    quiz: QuizSynthesizer,
    chat: ChatResponder,
    analyzer: TextAnalyzer,
}

impl TutorService {
    pub fn new(gateway: ModelGatewayRef) -> Self {
        info!(model = %gateway.model_name(), "Initializing tutor service");
        Self {
            generator: ContentGenerator::new(gateway.clone()),
            quiz: QuizSynthesizer::new(gateway.clone()),
            chat: ChatResponder::new(gateway.clone()),
            analyzer: TextAnalyzer::new(gateway),
        }
    }

    /// Wraps the gateway so transient failures are retried according to `policy`.
    pub fn with_retry(gateway: ModelGatewayRef, policy: RetryPolicy) -> Self {
        Self::new(Arc::new(RetryingGateway::new(gateway, policy)))
    }

    pub fn chat_responder(&self) -> &ChatResponder {
        &self.chat
    }

    pub async fn generate(&self, request: GenerateRequest) -> TutorResult<GeneratedContent> {
        let params = request.validate().map_err(rejected)?;
        self.generator.generate(&params).await
    }

    pub async fn generate_quiz(&self, request: QuizRequest) -> TutorResult<Quiz> {
        let params = request.validate().map_err(rejected)?;
        self.quiz.generate_quiz(&params).await
    }

    /// Stateless chat: the caller supplies the history with each request.
    pub async fn chat(&self, request: ChatRequest) -> TutorResult<ChatReply> {
        let params = request.validate().map_err(rejected)?;
        self.chat.reply(&params).await
    }

    /// Chat against a server-held session.
    pub async fn send_in_session(
        &self,
        session: &ChatSession,
        message: &str,
        context: Option<&str>,
    ) -> TutorResult<ChatMessage> {
        session.send(&self.chat, message, context).await
    }

    pub async fn analyze(&self, request: AnalyzeRequest) -> TutorResult<Analysis> {
        let params = request.validate().map_err(rejected)?;
        self.analyzer.analyze(&params).await
    }
}

fn rejected(e: crate::validation::ValidationError) -> TutorError {
    debug!(error = %e, "Request rejected by validation");
    e.into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ContentKind;
    use crate::testing::ScriptedGateway;
    use crate::validation::ValidationError;
    use mentoria_core::GeminiError;
    use serde_json::json;

    #[tokio::test]
    async fn test_bogus_analysis_type_never_reaches_model() {
        let gateway = ScriptedGateway::new();
        let service = TutorService::new(gateway.clone());

        let result = service
            .analyze(AnalyzeRequest {
                text: Some("un texto".into()),
                analysis_type: Some("bogus".into()),
            })
            .await;

        assert_eq!(
            result,
            Err(TutorError::Validation(ValidationError::InvalidAnalysisKind("bogus".into())))
        );
        assert_eq!(gateway.calls(), 0);
    }

    #[tokio::test]
    async fn test_quiz_request_is_clamped_before_prompting() {
        let gateway = ScriptedGateway::replying(&["no es json"]);
        let service = TutorService::new(gateway.clone());

        let result = service
            .generate_quiz(QuizRequest {
                topic: Some("células".into()),
                num_questions: Some(json!(999)),
                difficulty: Some(json!("imposible")),
                language: None,
            })
            .await;

        assert!(matches!(result, Err(TutorError::QuizFormat(_))));
        let prompt = gateway.last_prompt();
        assert!(prompt.contains("Número de preguntas: 20"));
        assert!(prompt.contains("Dificultad: variada"));
        assert!(prompt.contains("Idioma: Español"));
    }

    #[tokio::test]
    async fn test_retry_policy_is_applied() {
        let gateway = ScriptedGateway::new();
        gateway.push_error(GeminiError::HttpError {
            status_code: 500,
            message: "internal".into(),
        });
        gateway.push_reply("resumen");
        let policy = RetryPolicy {
            max_attempts: 2,
            initial_backoff_ms: 1,
            backoff_multiplier: 1.0,
            max_backoff_ms: 1,
        };
        let service = TutorService::with_retry(gateway.clone(), policy);

        let content = service
            .generate(GenerateRequest::new(ContentKind::Summary, "la luna"))
            .await
            .unwrap();
        assert_eq!(content.content, "resumen");
        assert_eq!(gateway.calls(), 2);
    }

    #[tokio::test]
    async fn test_stateless_chat_uses_supplied_history() {
        let gateway = ScriptedGateway::replying(&["¡Claro!"]);
        let service = TutorService::new(gateway.clone());

        let reply = service
            .chat(ChatRequest {
                message: Some("¿y los neutrones?".into()),
                context: Some("física".into()),
                history: Some(json!([
                    {"role": "user", "content": "¿qué es un protón?"},
                    {"role": "model", "content": "Una partícula."}
                ])),
            })
            .await
            .unwrap();

        assert_eq!(reply.message, "¡Claro!");
        let prompt = gateway.last_prompt();
        assert!(prompt.contains("Usuario: ¿qué es un protón?\nMentorIA: Una partícula."));
        assert!(prompt.contains("Contexto de la conversación: física"));
    }
}
