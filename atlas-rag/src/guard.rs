//! Grounded prompt construction.
//!
//! [`AnswerGuard`] packages the retrieved context with a strict instruction:
//! answer only from the context, copy numbers verbatim, and say so when the
//! fact is missing. This narrows what the model is asked to do. It does not
//! check what the model actually answers.

use serde::{Deserialize, Serialize};
use tracing::{error, info};

use crate::completion::{Completer, PromptPayload};
use crate::context::{GroundedContext, Source};
use crate::error::{RagError, Result};
use crate::pipeline::{Evidence, Retrieval};

/// Fixed reply used when retrieval found no evidence.
pub const NO_EVIDENCE_ANSWER: &str = "Dokümanda bulunamadı.";

/// The grounding instruction sent as the system message.
pub const SYSTEM_INSTRUCTION: &str = "\
Sen deneyimli bir Kıdemli ERP Yazılım ve Finans Danışmanısın. Türk işletme finansmanı, \
ERP sistemleri, vergi mevzuatı ve muhasebe konularında uzmansın.

MUTLAK KURALLAR:
1. SADECE Türkçe yanıt ver.
2. SADECE sana verilen bağlam (BAĞLAM) içindeki bilgileri kullan.
3. Sayıları ASLA tahmin etme, yuvarlama, birim dönüştürme veya yeniden hesaplama yapma. \
Sayıları metinde tam olarak göründüğü şekilde aktar.
4. Eğer sorunun cevabı bağlamda yoksa, yalnızca \"Dokümanda bulunamadı.\" de.
5. Finansal oranlar, limitler veya tutarlar için kaynak metni birebir alıntıla ve \
[Kaynak n] etiketiyle kaynağını belirt.

YANITLAMA FORMATI:
- Senden aksi istenmediği sürece kısa, öz ve net cevaplar ver.
- Mümkünse madde işaretleri kullan.
- Rakamları ve tarihleri vurgula.";

/// A generated answer with its citations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Answer {
    /// Answer text.
    pub text: String,
    /// The passages the answer was grounded on.
    pub sources: Vec<Source>,
    /// `false` when the answer is the fixed no-evidence reply.
    pub grounded: bool,
}

/// Builds grounded prompts and validates completion responses.
#[derive(Debug, Clone)]
pub struct AnswerGuard {
    instruction: String,
}

impl Default for AnswerGuard {
    fn default() -> Self {
        Self { instruction: SYSTEM_INSTRUCTION.to_string() }
    }
}

impl AnswerGuard {
    /// Create a guard with the default Turkish instruction.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the system instruction.
    pub fn with_instruction(mut self, instruction: impl Into<String>) -> Self {
        self.instruction = instruction.into();
        self
    }

    /// The system instruction in use.
    pub fn instruction(&self) -> &str {
        &self.instruction
    }

    /// Package the query and context for the completion model.
    pub fn build_prompt(&self, query: &str, context: &GroundedContext) -> PromptPayload {
        PromptPayload {
            system_instruction: self.instruction.clone(),
            context: context.render(),
            query: query.to_string(),
        }
    }

    /// Answer `query` from a retrieval result.
    ///
    /// Without evidence the completer is not called and the fixed
    /// [`NO_EVIDENCE_ANSWER`] is returned.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::Completion`] if the completer fails or returns an
    /// empty response.
    pub async fn answer(
        &self,
        completer: &dyn Completer,
        query: &str,
        retrieval: &Retrieval,
    ) -> Result<Answer> {
        let context = match &retrieval.evidence {
            Evidence::Found(context) => context,
            Evidence::NotFound => {
                info!("no evidence retrieved, skipping completion");
                return Ok(Answer {
                    text: NO_EVIDENCE_ANSWER.to_string(),
                    sources: Vec::new(),
                    grounded: false,
                });
            }
        };

        let prompt = self.build_prompt(query, context);
        let text = completer.complete(&prompt).await.map_err(|e| {
            error!(model = completer.name(), error = %e, "completion failed");
            e
        })?;
        if text.trim().is_empty() {
            return Err(RagError::Completion {
                provider: completer.name().to_string(),
                message: "empty response".into(),
            });
        }

        info!(model = completer.name(), sources = context.len(), "answer generated");
        Ok(Answer { text, sources: context.sources(), grounded: true })
    }
}
