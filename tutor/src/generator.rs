use mentoria_core::ModelGatewayRef;
use tracing::{debug, error};

use crate::error::TutorResult;
use crate::model::GeneratedContent;
use crate::prompts;
use crate::validation::GenerateParams;

/// Produces prose content (summary, material, explanation, exercises) for a topic.
#[derive(Clone)]
pub struct ContentGenerator {
    gateway: ModelGatewayRef,
}

impl ContentGenerator {
    pub fn new(gateway: ModelGatewayRef) -> Self {
        Self { gateway }
    }

    /// Instruction, language directive, topic and optional context in one prompt.
    pub fn build_prompt(params: &GenerateParams) -> String {
        let mut prompt = format!(
            "{}\n\n{}\n\nTema: {}\n",
            prompts::template(params.kind),
            prompts::language_directive(&params.language),
            params.topic
        );
        if let Some(context) = &params.additional_context {
            prompt.push_str(&format!("\nContexto adicional: {}\n", context));
        }
        prompt.push_str("\nPor favor, genera el contenido solicitado:");
        prompt
    }

    /// Returns the model's text verbatim.
    pub async fn generate(&self, params: &GenerateParams) -> TutorResult<GeneratedContent> {
        let prompt = Self::build_prompt(params);
        debug!(kind = %params.kind, prompt_len = prompt.len(), "Generating content");

        let content = self.gateway.complete(&prompt).await.map_err(|e| {
            error!(error = %e, kind = %params.kind, "Content generation failed");
            e
        })?;

        Ok(GeneratedContent {
            kind: params.kind,
            topic: params.topic.clone(),
            content,
        })
    }
}
