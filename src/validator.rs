//! # Validator: Aceite ou Rejeição de Documentos
//!
//! Cada documento em `documents/` passa pelas regras abaixo; todas as
//! violações são acumuladas, não só a primeira.
//!
//! | Regra | Aplica-se a |
//! |-------|-------------|
//! | origem, disciplina e texto preenchidos | todos |
//! | texto com pelo menos `min_text_chars` caracteres | todos |
//! | fração de palavras funcionais do inglês ≥ `min_english_ratio` | textos com ≥ `language_check_min_words` palavras |
//! | campos obrigatórios, dificuldade, tipo, pergunta, resposta, conceitos | documentos com registro |
//!
//! O relatório lista cada documento como `accepted` ou `rejected` com os
//! motivos. Documento ilegível é rejeitado, não interrompe a validação.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::ValidatorConfig;
use crate::core::{CurriculumDocument, CurriculumRecord, DocumentId};
use crate::error::{PipelineError, Result};
use crate::nlu::lexicon;
use crate::persistence::{self, DataDir};

pub const VALIDATION_REPORT_SCHEMA_VERSION: u32 = 1;

const VALID_DIFFICULTIES: &[&str] = &["easy", "medium", "hard"];
const VALID_TYPES: &[&str] = &["multiple_choice", "short_answer", "long_answer", "true_false"];

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationStatus {
    Accepted,
    Rejected,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ValidationEntry {
    pub document_id: DocumentId,
    pub origin: String,
    pub status: ValidationStatus,
    #[serde(default)]
    pub reasons: Vec<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ValidationReport {
    pub schema_version: u32,
    pub generated_at: DateTime<Utc>,
    pub entries: Vec<ValidationEntry>,
}

impl ValidationReport {
    /// Ids aceitos, na ordem do relatório.
    pub fn accepted_ids(&self) -> Vec<DocumentId> {
        self.entries
            .iter()
            .filter(|e| e.status == ValidationStatus::Accepted)
            .map(|e| e.document_id.clone())
            .collect()
    }

    pub fn accepted_count(&self) -> usize {
        self.entries.iter().filter(|e| e.status == ValidationStatus::Accepted).count()
    }

    pub fn rejected_count(&self) -> usize {
        self.entries.len() - self.accepted_count()
    }

    pub fn check_schema(&self) -> Result<()> {
        if self.schema_version != VALIDATION_REPORT_SCHEMA_VERSION {
            return Err(PipelineError::config(format!(
                "relatório de validação com schema_version {} não suportado",
                self.schema_version
            )));
        }
        Ok(())
    }
}

pub struct Validator {
    config: ValidatorConfig,
}

impl Validator {
    pub fn new(config: ValidatorConfig) -> Self {
        Self { config }
    }

    /// Valida todos os documentos do diretório de dados.
    ///
    /// Falha com [`PipelineError::NoInput`] se não houver nenhum documento.
    pub fn validate_dir(&self, data: &DataDir) -> Result<ValidationReport> {
        let paths = data.list_documents()?;
        if paths.is_empty() {
            return Err(PipelineError::NoInput(format!(
                "nenhum documento em {}",
                data.documents_dir().display()
            )));
        }

        let mut entries = Vec::with_capacity(paths.len());
        for path in &paths {
            let entry = match persistence::load_document(path) {
                Ok(doc) => self.entry_for(&doc),
                Err(e) => ValidationEntry {
                    document_id: path
                        .file_stem()
                        .map(|s| s.to_string_lossy().into_owned())
                        .unwrap_or_default(),
                    origin: path.display().to_string(),
                    status: ValidationStatus::Rejected,
                    reasons: vec![format!("documento ilegível: {e}")],
                },
            };
            if entry.status == ValidationStatus::Rejected {
                tracing::warn!(
                    document = %entry.document_id,
                    origin = %entry.origin,
                    reasons = ?entry.reasons,
                    "Documento rejeitado"
                );
            }
            entries.push(entry);
        }

        let report = ValidationReport {
            schema_version: VALIDATION_REPORT_SCHEMA_VERSION,
            generated_at: Utc::now(),
            entries,
        };
        tracing::info!(
            accepted = report.accepted_count(),
            rejected = report.rejected_count(),
            "Validação concluída"
        );
        Ok(report)
    }

    fn entry_for(&self, doc: &CurriculumDocument) -> ValidationEntry {
        let reasons = self.validate_document(doc);
        ValidationEntry {
            document_id: doc.id.clone(),
            origin: doc.source.origin.clone(),
            status: if reasons.is_empty() {
                ValidationStatus::Accepted
            } else {
                ValidationStatus::Rejected
            },
            reasons,
        }
    }

    /// Todos os motivos de rejeição de um documento (vazio = aceito).
    pub fn validate_document(&self, doc: &CurriculumDocument) -> Vec<String> {
        let mut reasons = Vec::new();
        if doc.source.origin.trim().is_empty() {
            reasons.push("origem ausente".to_string());
        }
        if doc.subject.trim().is_empty() {
            reasons.push("disciplina ausente".to_string());
        }

        let text = doc.text.trim();
        if text.is_empty() {
            reasons.push("texto vazio".to_string());
        } else if text.chars().count() < self.config.min_text_chars {
            reasons.push(format!(
                "texto curto demais ({} < {} caracteres)",
                text.chars().count(),
                self.config.min_text_chars
            ));
        }

        if let Some(ratio) = self.english_ratio(text) {
            if ratio < self.config.min_english_ratio {
                reasons.push(format!(
                    "texto não parece inglês (palavras funcionais {:.2} < {:.2})",
                    ratio, self.config.min_english_ratio
                ));
            }
        }

        if let Some(record) = &doc.record {
            reasons.extend(self.validate_record(record));
        }
        reasons
    }

    /// Fração de palavras funcionais; `None` quando o texto é curto demais
    /// para a checagem.
    fn english_ratio(&self, text: &str) -> Option<f64> {
        let words: Vec<String> = text
            .split_whitespace()
            .map(|w| w.trim_matches(|c: char| !c.is_alphanumeric()).to_lowercase())
            .filter(|w| !w.is_empty() && w.chars().all(|c| c.is_ascii_alphabetic()))
            .collect();
        if words.len() < self.config.language_check_min_words.max(1) {
            return None;
        }
        let function_words = words.iter().filter(|w| lexicon::is_stopword(w)).count();
        Some(function_words as f64 / words.len() as f64)
    }

    /// Regras do registro pergunta/resposta.
    pub fn validate_record(&self, record: &CurriculumRecord) -> Vec<String> {
        let mut reasons = Vec::new();

        let required = [
            ("subject", &record.subject),
            ("topic", &record.topic),
            ("subtopic", &record.subtopic),
            ("question", &record.question),
            ("answer", &record.answer),
            ("difficulty", &record.difficulty),
            ("type", &record.question_type),
        ];
        let missing: Vec<&str> = required
            .iter()
            .filter(|(_, value)| value.trim().is_empty())
            .map(|(name, _)| *name)
            .collect();
        if !missing.is_empty() {
            reasons.push(format!("campos obrigatórios ausentes: {}", missing.join(", ")));
        }

        if !record.difficulty.is_empty() && !VALID_DIFFICULTIES.contains(&record.difficulty.as_str()) {
            reasons.push(format!("dificuldade inválida: {}", record.difficulty));
        }
        if !record.question_type.is_empty() && !VALID_TYPES.contains(&record.question_type.as_str()) {
            reasons.push(format!("tipo de questão inválido: {}", record.question_type));
        }

        let question = record.question.trim();
        if !question.is_empty() {
            if question.chars().count() < self.config.min_question_chars {
                reasons.push("pergunta curta demais".to_string());
            }
            if !question.ends_with('?') {
                reasons.push("pergunta deve terminar com '?'".to_string());
            }
        }
        let answer = record.answer.trim();
        if !answer.is_empty() && answer.chars().count() < self.config.min_answer_chars {
            reasons.push("resposta curta demais".to_string());
        }
        if record.concepts.iter().all(|c| c.trim().is_empty()) {
            reasons.push("nenhum conceito especificado".to_string());
        }
        reasons
    }
}
