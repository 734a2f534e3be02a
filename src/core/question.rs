//! # Question / QuestionSet / Answer
//!
//! Tipos trocados entre o Question Generator, o QA Engine e os arquivos
//! `questions.json` e `answers.json`.
//!
//! Toda [`Question`] aponta para um nó ou aresta do mapa de onde saiu
//! ([`QuestionTarget`]). [`QuestionSet::validate_against`] garante isso antes
//! da escrita.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use super::concept::ConceptId;
use super::concept_map::ConceptMap;
use super::edge::EdgeId;
use crate::error::{PipelineError, Result};

/// Versão do formato de `questions.json`.
pub const QUESTION_SET_SCHEMA_VERSION: u32 = 1;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "id", rename_all = "snake_case")]
pub enum QuestionTarget {
    Node(ConceptId),
    Edge(EdgeId),
}

/// Família de template que gerou a pergunta.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionKind {
    Definition,
    Causal,
    Composition,
    Action,
    General,
    Dependency,
    CoOccurrence,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Question {
    /// `q0001`, `q0002`, ... na ordem de geração.
    pub id: String,
    pub text: String,
    #[serde(default)]
    pub expected_answer: Option<String>,
    pub target: QuestionTarget,
    pub kind: QuestionKind,
    /// Frase usada como contexto pelo QA.
    #[serde(default)]
    pub context: Option<String>,
    /// Label do conceito de origem.
    pub source: String,
    #[serde(default)]
    pub verb: Option<String>,
    /// Label do conceito alvo, quando a pergunta vem de uma aresta.
    #[serde(default)]
    pub target_label: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct QuestionSet {
    pub schema_version: u32,
    /// Caminho do mapa de conceitos de onde as perguntas saíram.
    pub source_map: String,
    pub questions: Vec<Question>,
}

impl QuestionSet {
    pub fn new(source_map: impl Into<String>, questions: Vec<Question>) -> Self {
        Self {
            schema_version: QUESTION_SET_SCHEMA_VERSION,
            source_map: source_map.into(),
            questions,
        }
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    /// Versão do esquema e ids únicos.
    pub fn validate(&self) -> Result<()> {
        if self.schema_version != QUESTION_SET_SCHEMA_VERSION {
            return Err(PipelineError::MalformedQuestions(format!(
                "versão de esquema {} não suportada (esperado {})",
                self.schema_version, QUESTION_SET_SCHEMA_VERSION
            )));
        }
        let mut seen = HashSet::with_capacity(self.questions.len());
        for q in &self.questions {
            if !seen.insert(q.id.as_str()) {
                return Err(PipelineError::MalformedQuestions(format!(
                    "id de pergunta duplicado: {}",
                    q.id
                )));
            }
            if q.text.trim().is_empty() {
                return Err(PipelineError::MalformedQuestions(format!(
                    "pergunta {} sem texto",
                    q.id
                )));
            }
        }
        Ok(())
    }

    /// [`validate()`](Self::validate) mais: todo alvo existe em `map`.
    pub fn validate_against(&self, map: &ConceptMap) -> Result<()> {
        self.validate()?;
        for q in &self.questions {
            let exists = match q.target {
                QuestionTarget::Node(id) => map.contains_node(id),
                QuestionTarget::Edge(id) => map.contains_edge(id),
            };
            if !exists {
                return Err(PipelineError::MalformedQuestions(format!(
                    "pergunta {} referencia alvo inexistente {:?}",
                    q.id, q.target
                )));
            }
        }
        Ok(())
    }
}

/// Resposta de um [`AnswerModel`](crate::qa::AnswerModel).
///
/// `text` vazio com `confidence = 0` significa "nenhum trecho encontrado".
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Answer {
    pub text: String,
    pub confidence: f32,
    /// Intervalo em bytes dentro do contexto.
    #[serde(default)]
    pub span: Option<(usize, usize)>,
    pub model: String,
}

impl Answer {
    pub fn none(model: impl Into<String>) -> Self {
        Self {
            text: String::new(),
            confidence: 0.0,
            span: None,
            model: model.into(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.text.trim().is_empty()
    }
}
