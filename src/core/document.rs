//! # CurriculumDocument: Texto Curricular com Metadados
//!
//! Um [`CurriculumDocument`] é a unidade produzida pelo Collector e consumida
//! (nunca modificada) pelo Validator e pelo Extractor.
//!
//! ## Identidade
//!
//! O `id` é o SHA-256 (hex) do texto normalizado. Coletar o mesmo texto duas
//! vezes gera o mesmo id, e é isso que torna a coleta idempotente: se
//! `documents/<id>.json` já existe, o documento é duplicado.
//!
//! | Campo | Descrição |
//! |-------|-----------|
//! | `source` | origem (arquivo, URL, `seed`) e tipo de fonte |
//! | `subject` | disciplina (`science`, `computer_science`, ...) |
//! | `grade_level` | série/ano, quando conhecido |
//! | `record` | registro pergunta/resposta estruturado, se a fonte for de registros |

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Versão do formato de `documents/<id>.json`.
pub const DOCUMENT_SCHEMA_VERSION: u32 = 1;

/// SHA-256 hex do texto normalizado.
pub type DocumentId = String;

/// Tipo da fonte de onde o documento veio.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    Text,
    Pdf,
    Records,
    ScienceQa,
    OpenBookQa,
    Http,
    Seed,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SourceInfo {
    /// Caminho, URL ou `seed`.
    pub origin: String,
    pub kind: SourceKind,
}

/// Registro pergunta/resposta no formato do coletor curricular.
///
/// Todos os campos aceitam ausência na desserialização; campos vazios são
/// reportados pelo Validator como obrigatórios faltando.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CurriculumRecord {
    pub subject: String,
    pub topic: String,
    pub subtopic: String,
    pub question: String,
    pub answer: String,
    pub difficulty: String,
    #[serde(rename = "type")]
    pub question_type: String,
    pub concepts: Vec<String>,
    pub prerequisites: Vec<String>,
    pub learning_objective: String,
}

impl CurriculumRecord {
    /// Texto corrido usado para extração de conceitos.
    pub fn to_text(&self) -> String {
        let mut parts: Vec<&str> = Vec::with_capacity(3);
        for part in [&self.question, &self.answer, &self.learning_objective] {
            let trimmed = part.trim();
            if !trimmed.is_empty() {
                parts.push(trimmed);
            }
        }
        parts.join("\n")
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CurriculumDocument {
    pub schema_version: u32,
    pub id: DocumentId,
    pub source: SourceInfo,
    pub subject: String,
    #[serde(default)]
    pub grade_level: Option<String>,
    #[serde(default)]
    pub topic: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    pub text: String,
    #[serde(default)]
    pub record: Option<CurriculumRecord>,
    pub collected_at: DateTime<Utc>,
}

impl CurriculumDocument {
    pub fn new(source: SourceInfo, subject: impl Into<String>, text: impl Into<String>) -> Self {
        let text = text.into();
        Self {
            schema_version: DOCUMENT_SCHEMA_VERSION,
            id: content_id(&text),
            source,
            subject: subject.into(),
            grade_level: None,
            topic: None,
            title: None,
            text,
            record: None,
            collected_at: Utc::now(),
        }
    }

    /// Documento derivado de um registro; o texto é [`CurriculumRecord::to_text`].
    pub fn from_record(source: SourceInfo, record: CurriculumRecord) -> Self {
        let subject = if record.subject.trim().is_empty() {
            "unknown".to_string()
        } else {
            record.subject.clone()
        };
        let topic = Some(record.topic.clone()).filter(|t| !t.trim().is_empty());
        let mut doc = Self::new(source, subject, record.to_text());
        doc.topic = topic;
        doc.record = Some(record);
        doc
    }

    pub fn with_grade_level(mut self, grade_level: Option<String>) -> Self {
        self.grade_level = grade_level;
        self
    }

    pub fn with_topic(mut self, topic: Option<String>) -> Self {
        if topic.is_some() {
            self.topic = topic;
        }
        self
    }

    pub fn with_title(mut self, title: Option<String>) -> Self {
        self.title = title;
        self
    }
}

/// Normalização usada só para a identidade: espaços colapsados, sem bordas.
///
/// Diferenças de quebra de linha ou indentação não geram documentos novos.
pub fn normalize_for_id(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// SHA-256 hex de [`normalize_for_id`].
pub fn content_id(text: &str) -> DocumentId {
    let mut hasher = Sha256::new();
    hasher.update(normalize_for_id(text).as_bytes());
    format!("{:x}", hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn source() -> SourceInfo {
        SourceInfo {
            origin: "test".into(),
            kind: SourceKind::Text,
        }
    }

    #[test]
    fn test_id_ignores_whitespace_layout() {
        let a = CurriculumDocument::new(source(), "science", "Plants  need\nlight.");
        let b = CurriculumDocument::new(source(), "science", "  Plants need light.  ");
        assert_eq!(a.id, b.id);
        assert_eq!(a.id.len(), 64);
    }

    #[test]
    fn test_different_text_different_id() {
        assert_ne!(content_id("light"), content_id("heat"));
    }

    #[test]
    fn test_record_text_and_metadata() {
        let record = CurriculumRecord {
            subject: "science".into(),
            topic: "Biology".into(),
            question: "What is the function of mitochondria in a cell?".into(),
            answer: "Mitochondria produce energy for the cell.".into(),
            learning_objective: "Understand organelles".into(),
            ..Default::default()
        };
        let doc = CurriculumDocument::from_record(source(), record);
        assert_eq!(doc.subject, "science");
        assert_eq!(doc.topic.as_deref(), Some("Biology"));
        assert!(doc.text.starts_with("What is the function"));
        assert!(doc.text.contains("Understand organelles"));
        assert!(doc.record.is_some());
    }

    #[test]
    fn test_record_type_field_renamed() {
        let json = r#"{"question": "Is it?", "type": "true_false"}"#;
        let record: CurriculumRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.question_type, "true_false");
        assert!(record.answer.is_empty());
    }
}
