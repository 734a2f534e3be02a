//! # Módulo Core: Tipos do Domínio
//!
//! Os tipos que circulam entre os estágios, todos serializáveis e versionados:
//!
//! - [`CurriculumDocument`]: texto coletado + metadados (+ [`CurriculumRecord`] opcional)
//! - [`ConceptNode`]: conceito canônico com id UUID v5 do label
//! - [`ConceptEdge`] / [`EdgeKind`]: co-ocorrência ou relação sujeito-verbo-objeto
//! - [`ConceptMap`]: o grafo, com índices reconstruídos após load
//! - [`Question`] / [`QuestionSet`] / [`Answer`]
//!
//! ```text
//! documents/*.json ──► ConceptMap ──► QuestionSet ──► answers.json
//!                          │
//!                          └──► concept_map.svg
//! ```

pub mod concept;
pub mod concept_map;
pub mod document;
pub mod edge;
pub mod question;

pub use concept::{ConceptId, ConceptNode, SourceSpan};
pub use concept_map::ConceptMap;
pub use document::{CurriculumDocument, CurriculumRecord, DocumentId, SourceInfo, SourceKind};
pub use edge::{ConceptEdge, EdgeId, EdgeKind};
pub use question::{Answer, Question, QuestionKind, QuestionSet, QuestionTarget};
