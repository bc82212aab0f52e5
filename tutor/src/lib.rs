//! AI content orchestration for the MentorIA tutor.
//!
//! Turns free-form requests into validated parameters, builds prompts per content kind,
//! sends them through a [`mentoria_core::ModelGateway`] and shapes the raw output into
//! prose, a validated quiz, a chat reply or a text analysis.

pub mod analyzer;
pub mod chat;
pub mod error;
pub mod generator;
pub mod model;
pub mod operation;
pub mod orchestrator;
pub mod prompts;
pub mod quiz;
pub mod service;
pub mod validation;

#[cfg(any(test, feature = "test-util"))]
pub mod testing;

pub use chat::{
    ChatResponder, ChatSession, ChatSessionStore, ChatSessionStoreRef, InMemoryChatSessionStore,
};
pub use error::{TutorError, TutorResult};
pub use model::*;
pub use operation::{Operation, OperationState};
pub use orchestrator::Orchestrator;
pub use service::TutorService;
pub use validation::{AnalyzeRequest, ChatRequest, GenerateRequest, QuizRequest, ValidationError};
