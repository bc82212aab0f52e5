use mentoria_core::ModelGatewayRef;
use tracing::debug;

use crate::error::TutorResult;
use crate::model::Analysis;
use crate::prompts;
use crate::validation::AnalyzeParams;

/// Runs one of the fixed analysis directives over a user-supplied passage.
#[derive(Clone)]
pub struct TextAnalyzer {
    gateway: ModelGatewayRef,
}

impl TextAnalyzer {
    pub fn new(gateway: ModelGatewayRef) -> Self {
        Self { gateway }
    }

    pub fn build_prompt(params: &AnalyzeParams) -> String {
        format!(
            "{}\n\nTexto a analizar:\n\"\"\"\n{}\n\"\"\"\n\n{}",
            prompts::analysis_directive(params.kind),
            params.text,
            prompts::ANALYSIS_CLOSING
        )
    }

    pub async fn analyze(&self, params: &AnalyzeParams) -> TutorResult<Analysis> {
        let text_length = params.text.chars().count();
        debug!(kind = %params.kind, text_length, "Analyzing text");

        let analysis = self.gateway.complete(&Self::build_prompt(params)).await?;
        Ok(Analysis {
            analysis,
            analysis_type: params.kind,
            text_length,
        })
    }
}
