//! # Pipeline NLU: Do Texto Curricular ao Mapa e às Perguntas
//!
//! ## Fluxo de Processamento
//!
//! ```text
//! CurriculumDocument.text
//!   ├── 1. Limpeza + NFC (TextCleaner)
//!   ├── 2. Divisão em frases (split_sentences)
//!   ├── 3. Tokenização + etiquetagem por léxico (ConceptExtractor::tag)
//!   ├── 4. Conceitos = sequências de conteúdo ≤ max_phrase_words
//!   ├── 5. Arestas: co-ocorrência e sujeito-verbo-objeto
//!   └── 6. Poda por frequência, ordenação determinística
//!
//! ConceptMap
//!   └── QuestionGenerator → definições, relações, co-ocorrências
//! ```
//!
//! ## Sub-módulos
//!
//! | Módulo | Responsabilidade |
//! |--------|-----------------|
//! | [`lexicon`] | stopwords, verbos, listas negras, lematização |
//! | [`text`] | limpeza, frases e tokens com offsets |
//! | [`extractor`] | documentos → [`ConceptMap`](crate::core::ConceptMap) |
//! | [`question`] | mapa → perguntas, exportação TXT/CSV |

pub mod extractor;
pub mod lexicon;
pub mod question;
pub mod text;

pub use extractor::ConceptExtractor;
pub use question::QuestionGenerator;
