//! # curriculum-map: Do Material Didático ao Mapa de Conceitos
//!
//! Pipeline sequencial, um estágio por subcomando, comunicando-se apenas por
//! arquivos no diretório de dados:
//!
//! ```text
//! fontes ─► Collector ─► documents/ ─► Validator ─► validation_report.json
//!                                                      │
//!          concept_map.svg ◄─ Visualizer ◄─ concept_map.json ◄─ Extractor
//!                                                      │
//!                               Question Generator ─► questions.{json,csv,txt}
//!                                                      │
//!                                      QA Engine ─► answers.json
//! ```
//!
//! A biblioteca expõe cada estágio isoladamente (ver [`pipeline`]); o
//! binário `curriculum-map` só faz o parsing da CLI e chama essas funções.

/// Módulo `collector`: fontes locais, HTTP e conjuntos de dados → documentos.
pub mod collector;

/// Módulo `config`: `PipelineConfig` lido de TOML.
pub mod config;

/// Módulo `core`: documentos, conceitos, arestas, mapa e perguntas.
pub mod core;

/// Módulo `error`: `PipelineError`, o erro tipado de todos os estágios.
pub mod error;

/// Módulo `metrics`: memória do processo para o benchmark.
pub mod metrics;

/// Módulo `nlu`: léxico, limpeza de texto, extração de conceitos e perguntas.
pub mod nlu;

/// Módulo `persistence`: layout do diretório de dados e escrita atômica.
pub mod persistence;

/// Módulo `pipeline`: uma função por estágio.
pub mod pipeline;

/// Módulo `qa`: modelos de pergunta-resposta extrativos.
pub mod qa;

/// Módulo `validator`: aceite e rejeição de documentos.
pub mod validator;

/// Módulo `visualizer`: mapa de conceitos → SVG.
pub mod visualizer;

pub use config::PipelineConfig;
pub use error::{PipelineError, Result};
pub use persistence::DataDir;
