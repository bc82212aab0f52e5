//! Client-facing façade: one [`Operation`] per operation kind for a single caller.

use crate::chat::ChatSession;
use crate::error::TutorResult;
use crate::model::{Analysis, AnalysisKind, ChatMessage, ContentKind, GeneratedContent, Quiz};
use crate::operation::Operation;
use crate::service::TutorService;
use crate::validation::{AnalyzeRequest, GenerateRequest, QuizRequest};

pub struct Orchestrator {
    service: TutorService,
    generation: Operation<GeneratedContent>,
    quiz: Operation<Quiz>,
    chat: Operation<ChatMessage>,
    analysis: Operation<Analysis>,
    session: ChatSession,
}

impl Orchestrator {
    pub fn new(service: TutorService) -> Self {
        Self {
            service,
            generation: Operation::new(),
            quiz: Operation::new(),
            chat: Operation::new(),
            analysis: Operation::new(),
            session: ChatSession::new(),
        }
    }

    pub fn generation(&self) -> &Operation<GeneratedContent> {
        &self.generation
    }

    pub fn quiz(&self) -> &Operation<Quiz> {
        &self.quiz
    }

    pub fn chat(&self) -> &Operation<ChatMessage> {
        &self.chat
    }

    pub fn analysis(&self) -> &Operation<Analysis> {
        &self.analysis
    }

    /// Full chat log, including turns no longer forwarded to the model.
    pub fn messages(&self) -> Vec<ChatMessage> {
        self.session.messages()
    }

    pub async fn generate(&self, request: GenerateRequest) -> TutorResult<GeneratedContent> {
        self.generation.run(self.service.generate(request)).await
    }

    pub async fn generate_summary(
        &self,
        topic: &str,
        context: Option<&str>,
        language: Option<&str>,
    ) -> TutorResult<GeneratedContent> {
        self.generate(shortcut(ContentKind::Summary, topic, context, language)).await
    }

    pub async fn generate_material(
        &self,
        topic: &str,
        context: Option<&str>,
        language: Option<&str>,
    ) -> TutorResult<GeneratedContent> {
        self.generate(shortcut(ContentKind::Material, topic, context, language)).await
    }

    pub async fn generate_explanation(
        &self,
        topic: &str,
        context: Option<&str>,
        language: Option<&str>,
    ) -> TutorResult<GeneratedContent> {
        self.generate(shortcut(ContentKind::Explanation, topic, context, language)).await
    }

    pub async fn generate_exercises(
        &self,
        topic: &str,
        context: Option<&str>,
        language: Option<&str>,
    ) -> TutorResult<GeneratedContent> {
        self.generate(shortcut(ContentKind::Exercises, topic, context, language)).await
    }

    pub async fn generate_quiz(&self, request: QuizRequest) -> TutorResult<Quiz> {
        self.quiz.run(self.service.generate_quiz(request)).await
    }

    pub async fn send_message(
        &self,
        message: &str,
        context: Option<&str>,
    ) -> TutorResult<ChatMessage> {
        self.chat
            .run(self.service.send_in_session(&self.session, message, context))
            .await
    }

    pub async fn analyze(&self, request: AnalyzeRequest) -> TutorResult<Analysis> {
        self.analysis.run(self.service.analyze(request)).await
    }

    pub async fn analyze_key_points(&self, text: &str) -> TutorResult<Analysis> {
        self.analyze(AnalyzeRequest::new(text, AnalysisKind::KeyPoints)).await
    }

    pub async fn analyze_difficulty(&self, text: &str) -> TutorResult<Analysis> {
        self.analyze(AnalyzeRequest::new(text, AnalysisKind::Difficulty)).await
    }

    pub async fn analyze_topics(&self, text: &str) -> TutorResult<Analysis> {
        self.analyze(AnalyzeRequest::new(text, AnalysisKind::Topics)).await
    }

    pub async fn generate_questions(&self, text: &str) -> TutorResult<Analysis> {
        self.analyze(AnalyzeRequest::new(text, AnalysisKind::Questions)).await
    }

    /// Empties the chat log and returns the chat operation to `Idle`.
    pub fn clear_chat(&self) {
        self.session.clear();
        self.chat.reset();
    }

    pub fn reset_all(&self) {
        self.generation.reset();
        self.quiz.reset();
        self.analysis.reset();
        self.clear_chat();
    }
}

fn shortcut(
    kind: ContentKind,
    topic: &str,
    context: Option<&str>,
    language: Option<&str>,
) -> GenerateRequest {
    GenerateRequest {
        additional_context: context.map(str::to_string),
        language: language.map(str::to_string),
        ..GenerateRequest::new(kind, topic)
    }
}
