//! # QA: Respostas Extrativas sobre um Contexto
//!
//! O resto do pipeline depende só do trait [`AnswerModel`]:
//!
//! ```text
//! AnswerModel::answer(question, context) -> Result<Answer>
//! ```
//!
//! | Implementação | Pesos | Estratégia |
//! |---------------|-------|------------|
//! | [`LexicalReader`] | nenhum | frase com maior sobreposição + maior trecho não coberto pela pergunta |
//! | [`BertReader`] | BERT QA (candle) | logits de início/fim, melhor trecho dentro do contexto |
//!
//! O [`QaEngine`] carrega o modelo uma vez e o reutiliza em lote.

pub mod benchmark;
pub mod bert;
pub mod lexical;

use std::time::Instant;

use serde::{Deserialize, Serialize};

use crate::config::QaConfig;
use crate::core::{Answer, Question, QuestionSet};
use crate::error::{PipelineError, Result};

pub use bert::BertReader;
pub use lexical::LexicalReader;

/// Versão do formato de `answers.json`.
pub const ANSWER_SET_SCHEMA_VERSION: u32 = 1;

/// Texto exibido quando nenhum trecho do contexto responde à pergunta.
pub const NO_ANSWER_MESSAGE: &str = "Unable to find answer in context.";

/// Modelo de pergunta-resposta extrativo.
pub trait AnswerModel {
    fn name(&self) -> &str;

    /// Resposta vazia com `confidence = 0` quando nada no contexto responde.
    fn answer(&self, question: &str, context: &str) -> Result<Answer>;
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum ModelKind {
    #[default]
    Lexical,
    Bert,
}

/// Carrega o modelo descrito por `config`.
///
/// `bert` exige `model_path`; a ausência é erro de carga, nunca um modelo vazio.
pub fn load_model(config: &QaConfig) -> Result<Box<dyn AnswerModel>> {
    match config.model_kind {
        ModelKind::Lexical => Ok(Box::new(LexicalReader::new())),
        ModelKind::Bert => {
            let location = config.model_path.as_deref().ok_or_else(|| {
                PipelineError::model_load("<não configurado>", "qa.model_path (ou --model) é obrigatório para bert")
            })?;
            Ok(Box::new(BertReader::load(location, config)?))
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AnswerRecord {
    pub question_id: String,
    pub question: String,
    pub context: String,
    pub answer: Answer,
    pub latency_ms: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AnswerSet {
    pub schema_version: u32,
    pub model: String,
    pub answers: Vec<AnswerRecord>,
}

/// Dono de um modelo carregado.
pub struct QaEngine {
    model: Box<dyn AnswerModel>,
}

impl QaEngine {
    pub fn new(model: Box<dyn AnswerModel>) -> Self {
        Self { model }
    }

    pub fn load(config: &QaConfig) -> Result<Self> {
        let started = Instant::now();
        let model = load_model(config)?;
        tracing::info!(
            model = model.name(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Modelo de QA carregado"
        );
        Ok(Self::new(model))
    }

    pub fn model(&self) -> &dyn AnswerModel {
        self.model.as_ref()
    }

    pub fn answer(&self, question: &str, context: &str) -> Result<Answer> {
        self.model.answer(question, context)
    }

    /// Responde cada pergunta contra o seu contexto.
    ///
    /// Perguntas sem contexto são puladas com aviso.
    pub fn answer_set(&self, questions: &QuestionSet) -> Result<AnswerSet> {
        let mut answers = Vec::with_capacity(questions.len());
        for question in &questions.questions {
            match self.answer_question(question)? {
                Some(record) => answers.push(record),
                None => tracing::warn!(question = %question.id, "Pergunta sem contexto, pulada"),
            }
        }
        let unanswered = answers.iter().filter(|r| r.answer.is_empty()).count();
        tracing::info!(
            answered = answers.len() - unanswered,
            unanswered,
            model = self.model.name(),
            "Perguntas respondidas"
        );
        Ok(AnswerSet {
            schema_version: ANSWER_SET_SCHEMA_VERSION,
            model: self.model.name().to_string(),
            answers,
        })
    }

    fn answer_question(&self, question: &Question) -> Result<Option<AnswerRecord>> {
        let Some(context) = question.context.as_deref().filter(|c| !c.trim().is_empty()) else {
            return Ok(None);
        };
        let started = Instant::now();
        let answer = self.model.answer(&question.text, context)?;
        Ok(Some(AnswerRecord {
            question_id: question.id.clone(),
            question: question.text.clone(),
            context: context.to_string(),
            answer,
            latency_ms: started.elapsed().as_secs_f64() * 1000.0,
        }))
    }
}
