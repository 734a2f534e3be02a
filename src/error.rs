//! # Erros do Pipeline
//!
//! Taxonomia única de falhas compartilhada por todos os estágios. O código de
//! biblioteca retorna [`Result<T>`](Result); o binário envolve os erros com
//! `anyhow::Context` e sai com status diferente de zero.
//!
//! | Variante | Estágio | Política |
//! |----------|---------|----------|
//! | [`SourceUnavailable`](PipelineError::SourceUnavailable) | Collector | fonte pulada, coleta continua |
//! | [`NoInput`](PipelineError::NoInput) | Validator / Extractor | fatal |
//! | [`ModelLoad`](PipelineError::ModelLoad) | QA | fatal para o estágio |
//! | [`MalformedMap`](PipelineError::MalformedMap) / [`MalformedQuestions`](PipelineError::MalformedQuestions) | Generator / Visualizer / QA | fatal |
//! | [`Io`](PipelineError::Io) / [`Json`](PipelineError::Json) / [`Config`](PipelineError::Config) | todos | fatal |

use std::path::{Path, PathBuf};

/// Erro tipado de qualquer estágio do pipeline.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("configuração inválida: {message}")]
    Config { message: String },

    #[error("fonte '{source_name}' indisponível: {reason}")]
    SourceUnavailable { source_name: String, reason: String },

    #[error("nenhuma entrada disponível: {0}")]
    NoInput(String),

    #[error("falha ao carregar modelo de {location}: {reason}")]
    ModelLoad { location: String, reason: String },

    #[error("falha na inferência do modelo: {0}")]
    Inference(String),

    #[error("mapa de conceitos malformado: {0}")]
    MalformedMap(String),

    #[error("conjunto de perguntas malformado: {0}")]
    MalformedQuestions(String),

    #[error("erro de I/O em {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("JSON inválido em {path:?}: {source}")]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },
}

impl PipelineError {
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    pub fn source_unavailable(source_name: impl Into<String>, reason: impl ToString) -> Self {
        Self::SourceUnavailable {
            source_name: source_name.into(),
            reason: reason.to_string(),
        }
    }

    pub fn model_load(location: impl Into<String>, reason: impl ToString) -> Self {
        Self::ModelLoad {
            location: location.into(),
            reason: reason.to_string(),
        }
    }

    pub fn io(path: impl AsRef<Path>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    pub fn json(path: impl AsRef<Path>, source: serde_json::Error) -> Self {
        Self::Json {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, PipelineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_model_load_names_location() {
        let err = PipelineError::model_load("models/qa", "config.json ausente");
        let msg = err.to_string();
        assert!(msg.contains("models/qa"));
        assert!(msg.contains("config.json"));
    }

    #[test]
    fn test_io_error_keeps_path() {
        let err = PipelineError::io(
            "data/concept_map.json",
            std::io::Error::new(std::io::ErrorKind::NotFound, "missing"),
        );
        assert!(err.to_string().contains("concept_map.json"));
        assert!(std::error::Error::source(&err).is_some());
    }
}
