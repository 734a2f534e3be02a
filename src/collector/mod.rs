//! # Collector: Fontes → `documents/<id>.json`
//!
//! ```text
//! SourceSpec ──► bytes (arquivo local | HTTP GET | registros semente)
//!            ──► formato (texto, PDF, registros, ScienceQA, OpenBookQA)
//!            ──► CurriculumDocument (id = SHA-256 do texto normalizado)
//!            ──► documents/<id>.json, se ainda não existir
//! ```
//!
//! Uma fonte que falha é pulada com `warn!` e a coleta continua. Coletar a
//! mesma fonte duas vezes não cria documentos novos.

pub mod pdf;
pub mod records;
pub mod source;

use std::collections::HashSet;
use std::time::Duration;

use serde::Serialize;

use crate::config::CollectorConfig;
use crate::core::{CurriculumDocument, CurriculumRecord, DocumentId, SourceInfo, SourceKind};
use crate::error::{PipelineError, Result};
use crate::persistence::{self, DataDir};

pub use source::{SourceFormat, SourceSpec, SEED_LOCATION};

const USER_AGENT: &str = concat!("curriculum-map/", env!("CARGO_PKG_VERSION"));

#[derive(Clone, Debug, Serialize)]
pub struct SkippedSource {
    pub source: String,
    pub reason: String,
}

/// Resultado de uma coleta.
#[derive(Clone, Debug, Default, Serialize)]
pub struct CollectionReport {
    /// Ids gravados nesta execução, na ordem de coleta.
    pub collected: Vec<DocumentId>,
    /// Documentos já presentes em `documents/` ou repetidos na execução.
    pub duplicates: usize,
    pub skipped: Vec<SkippedSource>,
}

pub struct Collector {
    client: reqwest::blocking::Client,
    data: DataDir,
}

impl Collector {
    pub fn new(config: &CollectorConfig, data: DataDir) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(config.http_timeout_secs))
            .build()
            .map_err(|e| PipelineError::config(format!("cliente HTTP: {e}")))?;
        Ok(Self { client, data })
    }

    /// Coleta todas as fontes, pulando as indisponíveis.
    ///
    /// Só falhas de escrita em `documents/` interrompem a coleta.
    pub fn collect(&self, sources: &[SourceSpec]) -> Result<CollectionReport> {
        let mut report = CollectionReport::default();
        let mut seen: HashSet<DocumentId> = HashSet::new();

        for spec in sources {
            let documents = match self.load_source(spec) {
                Ok(docs) => docs,
                Err(PipelineError::SourceUnavailable { source_name, reason }) => {
                    tracing::warn!(source = %source_name, %reason, "Fonte indisponível, pulada");
                    report.skipped.push(SkippedSource {
                        source: source_name,
                        reason,
                    });
                    continue;
                }
                Err(e) => return Err(e),
            };

            let mut written = 0usize;
            for doc in documents {
                let path = self.data.document_path(&doc.id);
                if !seen.insert(doc.id.clone()) || path.exists() {
                    report.duplicates += 1;
                    continue;
                }
                persistence::write_json(&path, &doc)?;
                tracing::debug!(id = %doc.id, source = spec.display_name(), "Documento gravado");
                report.collected.push(doc.id);
                written += 1;
            }
            tracing::info!(source = spec.display_name(), written, "Fonte coletada");
        }

        tracing::info!(
            collected = report.collected.len(),
            duplicates = report.duplicates,
            skipped = report.skipped.len(),
            "Coleta concluída"
        );
        Ok(report)
    }

    /// Lê uma fonte e a converte em documentos.
    ///
    /// Qualquer falha vira [`PipelineError::SourceUnavailable`].
    pub fn load_source(&self, spec: &SourceSpec) -> Result<Vec<CurriculumDocument>> {
        let name = spec.display_name();
        let kind = spec.kind();
        let info = SourceInfo {
            origin: spec.location.clone(),
            kind,
        };

        let documents = match kind {
            SourceKind::Seed => from_records(spec, &info, records::seed_records()),
            SourceKind::Records => {
                let bytes = self.read_bytes(spec)?;
                let recs = records::parse_records(&bytes).map_err(|e| PipelineError::source_unavailable(name, e))?;
                from_records(spec, &info, recs)
            }
            SourceKind::ScienceQa => {
                let bytes = self.read_bytes(spec)?;
                let recs = records::parse_scienceqa(&bytes).map_err(|e| PipelineError::source_unavailable(name, e))?;
                from_records(spec, &info, recs)
            }
            SourceKind::OpenBookQa => {
                let bytes = self.read_bytes(spec)?;
                from_records(spec, &info, records::parse_openbookqa(&bytes))
            }
            SourceKind::Pdf => {
                let bytes = self.read_bytes(spec)?;
                let text = pdf::extract_pdf_text(&bytes).map_err(|e| PipelineError::source_unavailable(name, e))?;
                vec![from_text(spec, &info, text)]
            }
            SourceKind::Text | SourceKind::Http => {
                let bytes = self.read_bytes(spec)?;
                let text = String::from_utf8(bytes).map_err(|e| PipelineError::source_unavailable(name, e))?;
                if text.trim().is_empty() {
                    return Err(PipelineError::source_unavailable(name, "fonte vazia"));
                }
                vec![from_text(spec, &info, text)]
            }
        };

        if documents.is_empty() {
            return Err(PipelineError::source_unavailable(name, "nenhum registro utilizável"));
        }
        Ok(documents)
    }

    fn read_bytes(&self, spec: &SourceSpec) -> Result<Vec<u8>> {
        let name = spec.display_name();
        if spec.is_remote() {
            tracing::info!(url = %spec.location, "Baixando fonte");
            let response = self
                .client
                .get(&spec.location)
                .send()
                .and_then(|r| r.error_for_status())
                .map_err(|e| PipelineError::source_unavailable(name, e))?;
            let bytes = response.bytes().map_err(|e| PipelineError::source_unavailable(name, e))?;
            Ok(bytes.to_vec())
        } else {
            std::fs::read(&spec.location).map_err(|e| PipelineError::source_unavailable(name, e))
        }
    }
}

fn from_text(spec: &SourceSpec, info: &SourceInfo, text: String) -> CurriculumDocument {
    let title = std::path::Path::new(spec.location.split('?').next().unwrap_or_default())
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned());
    CurriculumDocument::new(info.clone(), spec.subject.clone(), text)
        .with_grade_level(spec.grade_level.clone())
        .with_topic(spec.topic.clone())
        .with_title(spec.name.clone().or(title))
}

fn from_records(spec: &SourceSpec, info: &SourceInfo, records: Vec<CurriculumRecord>) -> Vec<CurriculumDocument> {
    records
        .into_iter()
        .filter(|r| !r.to_text().trim().is_empty())
        .map(|r| {
            let title = Some(r.question.clone()).filter(|q| !q.trim().is_empty());
            CurriculumDocument::from_record(info.clone(), r)
                .with_grade_level(spec.grade_level.clone())
                .with_topic(spec.topic.clone())
                .with_title(title)
        })
        .collect()
}
