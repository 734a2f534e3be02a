//! # ConceptNode: Conceito Extraído do Currículo
//!
//! Um [`ConceptNode`] é um sintagma nominal canônico (minúsculo) visto em
//! pelo menos uma frase de um documento aceito.
//!
//! ## Identidade Determinística
//!
//! O id é um UUID v5 do label dentro de [`CONCEPT_NAMESPACE`]. O mesmo label
//! gera sempre o mesmo id, em qualquer execução e em qualquer máquina, o que
//! mantém `concept_map.json` idêntico byte a byte entre execuções.
//!
//! ```text
//! "chemical energy" ──v5──► 3f0c…  (sempre)
//! ```
//!
//! ## Ciclo de Vida
//!
//! 1. Primeira menção → [`ConceptNode::new`], `frequency = 1`, frase guardada
//! 2. Menções seguintes → [`ConceptNode::reinforce`], `frequency += 1`
//! 3. Após todos os documentos → nós abaixo de `min_frequency` são podados

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::document::DocumentId;

/// Identificador de um [`ConceptNode`] (UUID v5 do label).
pub type ConceptId = Uuid;

/// Namespace fixo para os UUIDs v5 de conceitos e arestas.
pub const CONCEPT_NAMESPACE: Uuid = Uuid::from_u128(0x6a1f_42c3_9b7e_4d0a_8c55_1e2f_7a9b_c3d4);

/// Primeira frase em que o conceito apareceu.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SourceSpan {
    pub document: DocumentId,
    pub sentence: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ConceptNode {
    pub id: ConceptId,

    /// Label canônico, minúsculo, espaços simples.
    pub label: String,

    /// Quantas menções foram vistas em todos os documentos.
    pub frequency: u32,

    /// Documentos em que apareceu, em ordem de primeira menção, sem repetição.
    pub documents: Vec<DocumentId>,

    #[serde(default)]
    pub source_span: Option<SourceSpan>,
}

impl ConceptNode {
    /// Cria um nó com a primeira menção já contabilizada.
    pub fn new(label: &str, document: &DocumentId, sentence: &str) -> Self {
        let label = canonical_label(label);
        Self {
            id: Self::id_for(&label),
            label,
            frequency: 1,
            documents: vec![document.clone()],
            source_span: Some(SourceSpan {
                document: document.clone(),
                sentence: sentence.trim().to_string(),
            }),
        }
    }

    /// Id determinístico para um label (após canonicalização).
    pub fn id_for(label: &str) -> ConceptId {
        Uuid::new_v5(&CONCEPT_NAMESPACE, canonical_label(label).as_bytes())
    }

    /// Registra mais uma menção.
    pub fn reinforce(&mut self, document: &DocumentId) {
        self.frequency = self.frequency.saturating_add(1);
        if !self.documents.iter().any(|d| d == document) {
            self.documents.push(document.clone());
        }
    }

    pub fn word_count(&self) -> usize {
        self.label.split_whitespace().count()
    }
}

/// Minúsculas e espaços simples.
pub fn canonical_label(label: &str) -> String {
    label
        .split_whitespace()
        .map(|w| w.to_lowercase())
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_is_deterministic_and_case_insensitive() {
        assert_eq!(ConceptNode::id_for("Chemical  Energy"), ConceptNode::id_for("chemical energy"));
        assert_ne!(ConceptNode::id_for("light"), ConceptNode::id_for("chemical energy"));
    }

    #[test]
    fn test_reinforce_tracks_documents_once() {
        let doc_a = "a".repeat(64);
        let doc_b = "b".repeat(64);
        let mut node = ConceptNode::new("Photosynthesis", &doc_a, " Photosynthesis converts light. ");
        assert_eq!(node.label, "photosynthesis");
        assert_eq!(node.source_span.as_ref().unwrap().sentence, "Photosynthesis converts light.");

        node.reinforce(&doc_a);
        node.reinforce(&doc_b);
        assert_eq!(node.frequency, 3);
        assert_eq!(node.documents, vec![doc_a, doc_b]);
    }
}
