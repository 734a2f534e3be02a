//! # Configuração do Pipeline
//!
//! Um único [`PipelineConfig`] é carregado no início do processo e passado
//! explicitamente para cada estágio. Não há estado global.
//!
//! Ordem de precedência: flags da CLI > arquivo TOML > defaults.
//!
//! ```toml
//! data_dir = "data"
//!
//! [collector]
//! http_timeout_secs = 30
//!
//! [[collector.sources]]
//! location = "seed"
//!
//! [[collector.sources]]
//! location = "curriculum/biology.txt"
//! subject = "science"
//! grade_level = "8"
//!
//! [extractor]
//! max_phrase_words = 4
//! min_frequency = 1
//!
//! [visualizer]
//! max_nodes = 30
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::collector::SourceSpec;
use crate::error::{PipelineError, Result};
use crate::qa::ModelKind;

/// Nome do arquivo procurado no diretório corrente quando `--config` não é dado.
pub const DEFAULT_CONFIG_FILE: &str = "curriculum-map.toml";

// ─── Estrutura principal ────────────────────────────────────────

/// Configuração completa, desserializada do TOML.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Raiz dos artefatos (`documents/`, `concept_map.json`, ...).
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    #[serde(default)]
    pub collector: CollectorConfig,

    #[serde(default)]
    pub validator: ValidatorConfig,

    #[serde(default)]
    pub extractor: ExtractorConfig,

    #[serde(default)]
    pub questions: QuestionConfig,

    #[serde(default)]
    pub qa: QaConfig,

    #[serde(default)]
    pub visualizer: VisualizerConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            collector: CollectorConfig::default(),
            validator: ValidatorConfig::default(),
            extractor: ExtractorConfig::default(),
            questions: QuestionConfig::default(),
            qa: QaConfig::default(),
            visualizer: VisualizerConfig::default(),
        }
    }
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("data")
}

// ─── Seções ─────────────────────────────────────────────────────

/// `[collector]`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollectorConfig {
    /// Fontes usadas quando `collect` é chamado sem `--source`.
    #[serde(default)]
    pub sources: Vec<SourceSpec>,

    /// Timeout por requisição HTTP.
    #[serde(default = "default_http_timeout_secs")]
    pub http_timeout_secs: u64,
}

impl Default for CollectorConfig {
    fn default() -> Self {
        Self {
            sources: Vec::new(),
            http_timeout_secs: default_http_timeout_secs(),
        }
    }
}

fn default_http_timeout_secs() -> u64 {
    30
}

/// `[validator]`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidatorConfig {
    #[serde(default = "default_min_text_chars")]
    pub min_text_chars: usize,

    /// Fração mínima de palavras funcionais do inglês.
    #[serde(default = "default_min_english_ratio")]
    pub min_english_ratio: f64,

    /// Textos menores que isso não passam pela checagem de idioma.
    #[serde(default = "default_language_check_min_words")]
    pub language_check_min_words: usize,

    #[serde(default = "default_min_question_chars")]
    pub min_question_chars: usize,

    #[serde(default = "default_min_answer_chars")]
    pub min_answer_chars: usize,
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        Self {
            min_text_chars: default_min_text_chars(),
            min_english_ratio: default_min_english_ratio(),
            language_check_min_words: default_language_check_min_words(),
            min_question_chars: default_min_question_chars(),
            min_answer_chars: default_min_answer_chars(),
        }
    }
}

fn default_min_text_chars() -> usize {
    20
}
fn default_min_english_ratio() -> f64 {
    0.05
}
fn default_language_check_min_words() -> usize {
    8
}
fn default_min_question_chars() -> usize {
    10
}
fn default_min_answer_chars() -> usize {
    20
}

/// `[extractor]`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractorConfig {
    #[serde(default = "default_max_phrase_words")]
    pub max_phrase_words: usize,

    /// Comprimento mínimo de um conceito de uma palavra só.
    #[serde(default = "default_min_concept_chars")]
    pub min_concept_chars: usize,

    #[serde(default = "default_min_frequency")]
    pub min_frequency: u32,

    /// Frases extras a ignorar, somadas às embutidas ("chapter", "figure", ...).
    #[serde(default)]
    pub extra_stop_phrases: Vec<String>,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            max_phrase_words: default_max_phrase_words(),
            min_concept_chars: default_min_concept_chars(),
            min_frequency: default_min_frequency(),
            extra_stop_phrases: Vec::new(),
        }
    }
}

fn default_max_phrase_words() -> usize {
    4
}
fn default_min_concept_chars() -> usize {
    4
}
fn default_min_frequency() -> u32 {
    1
}

/// `[questions]`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuestionConfig {
    #[serde(default)]
    pub max_questions: Option<usize>,

    #[serde(default = "default_min_cooccurrence_weight")]
    pub min_cooccurrence_weight: f64,

    #[serde(default = "default_true")]
    pub include_cooccurrence: bool,

    #[serde(default = "default_true")]
    pub include_definitions: bool,
}

impl Default for QuestionConfig {
    fn default() -> Self {
        Self {
            max_questions: None,
            min_cooccurrence_weight: default_min_cooccurrence_weight(),
            include_cooccurrence: true,
            include_definitions: true,
        }
    }
}

fn default_min_cooccurrence_weight() -> f64 {
    0.5
}
fn default_true() -> bool {
    true
}

/// `[qa]`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QaConfig {
    #[serde(default)]
    pub model_kind: ModelKind,

    /// Diretório local ou repo id do Hugging Face (apenas para `bert`).
    #[serde(default)]
    pub model_path: Option<String>,

    #[serde(default = "default_max_seq_len")]
    pub max_seq_len: usize,

    #[serde(default = "default_max_answer_tokens")]
    pub max_answer_tokens: usize,

    /// Usado apenas quando o diretório traz `vocab.txt` em vez de `tokenizer.json`.
    #[serde(default = "default_true")]
    pub lowercase: bool,
}

impl Default for QaConfig {
    fn default() -> Self {
        Self {
            model_kind: ModelKind::default(),
            model_path: None,
            max_seq_len: default_max_seq_len(),
            max_answer_tokens: default_max_answer_tokens(),
            lowercase: true,
        }
    }
}

fn default_max_seq_len() -> usize {
    384
}
fn default_max_answer_tokens() -> usize {
    30
}

/// `[visualizer]`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VisualizerConfig {
    #[serde(default = "default_max_nodes")]
    pub max_nodes: usize,

    #[serde(default = "default_width")]
    pub width: u32,

    #[serde(default = "default_height")]
    pub height: u32,

    /// Semente do layout; mesma semente, mesmo SVG.
    #[serde(default = "default_seed")]
    pub seed: u64,

    #[serde(default = "default_iterations")]
    pub iterations: usize,
}

impl Default for VisualizerConfig {
    fn default() -> Self {
        Self {
            max_nodes: default_max_nodes(),
            width: default_width(),
            height: default_height(),
            seed: default_seed(),
            iterations: default_iterations(),
        }
    }
}

fn default_max_nodes() -> usize {
    30
}
fn default_width() -> u32 {
    1200
}
fn default_height() -> u32 {
    800
}
fn default_seed() -> u64 {
    42
}
fn default_iterations() -> usize {
    200
}

// ─── Carregamento ───────────────────────────────────────────────

impl PipelineConfig {
    /// Carrega a configuração.
    ///
    /// Com `path`, o arquivo precisa existir. Sem `path`, usa
    /// [`DEFAULT_CONFIG_FILE`] se existir no diretório corrente e os defaults
    /// caso contrário.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load_from(path),
            None => {
                let fallback = Path::new(DEFAULT_CONFIG_FILE);
                if fallback.exists() {
                    Self::load_from(fallback)
                } else {
                    tracing::debug!("Nenhum {} encontrado, usando defaults", DEFAULT_CONFIG_FILE);
                    Ok(Self::default())
                }
            }
        }
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let content =
            std::fs::read_to_string(path).map_err(|e| PipelineError::io(path, e))?;
        let config = Self::from_toml(&content)
            .map_err(|e| PipelineError::config(format!("{}: {e}", path.display())))?;
        tracing::info!(path = %path.display(), "Configuração carregada");
        Ok(config)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Self =
            toml::from_str(content).map_err(|e| PipelineError::config(e.to_string()))?;
        config.check()?;
        Ok(config)
    }

    /// Rejeita combinações que nenhum estágio consegue usar.
    pub fn check(&self) -> Result<()> {
        if self.extractor.max_phrase_words == 0 {
            return Err(PipelineError::config("extractor.max_phrase_words deve ser > 0"));
        }
        if !(0.0..=1.0).contains(&self.validator.min_english_ratio) {
            return Err(PipelineError::config(
                "validator.min_english_ratio deve estar em [0, 1]",
            ));
        }
        if self.visualizer.width == 0 || self.visualizer.height == 0 {
            return Err(PipelineError::config("visualizer.width/height devem ser > 0"));
        }
        if self.qa.max_seq_len < 16 {
            return Err(PipelineError::config("qa.max_seq_len deve ser >= 16"));
        }
        Ok(())
    }
}
