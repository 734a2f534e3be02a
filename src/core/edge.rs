//! # ConceptEdge: Relação Entre Dois Conceitos
//!
//! | Tipo | Direção | Origem |
//! |------|---------|--------|
//! | `co_occurrence` | sem direção (guardada com origem antes do alvo na ordem dos nós) | dois conceitos na mesma frase |
//! | `relation` | sujeito → objeto, com o lema do verbo | padrão `<conceito> <verbo> <conceito>` |
//!
//! ## Peso
//!
//! `weight = count / (count + 1)`: estritamente crescente com `count`,
//! sempre em `(0, 1)`. Uma aresta vista uma vez pesa 0.5; dez vezes, ~0.91.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::concept::{ConceptId, CONCEPT_NAMESPACE};

pub type EdgeId = Uuid;

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EdgeKind {
    CoOccurrence,
    Relation { verb: String },
}

impl EdgeKind {
    pub fn relation(verb: impl Into<String>) -> Self {
        EdgeKind::Relation { verb: verb.into() }
    }

    /// Verbo da relação, se houver.
    pub fn verb(&self) -> Option<&str> {
        match self {
            EdgeKind::CoOccurrence => None,
            EdgeKind::Relation { verb } => Some(verb),
        }
    }

    /// Chave estável usada no id e na ordenação das arestas.
    pub fn sort_key(&self) -> (u8, &str) {
        match self {
            EdgeKind::CoOccurrence => (0, ""),
            EdgeKind::Relation { verb } => (1, verb),
        }
    }

    /// Rótulo exibido no SVG.
    pub fn label(&self) -> &str {
        match self {
            EdgeKind::CoOccurrence => "co-occurs",
            EdgeKind::Relation { verb } => verb,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ConceptEdge {
    pub id: EdgeId,
    pub source: ConceptId,
    pub target: ConceptId,
    pub relation: EdgeKind,
    pub count: u32,
    pub weight: f64,
    /// Uma frase onde a relação foi observada.
    #[serde(default)]
    pub context: Option<String>,
}

impl ConceptEdge {
    pub fn new(source: ConceptId, target: ConceptId, relation: EdgeKind, context: Option<String>) -> Self {
        Self {
            id: Self::id_for(source, target, &relation),
            source,
            target,
            relation,
            count: 1,
            weight: weight_for(1),
            context,
        }
    }

    /// Id determinístico para (origem, alvo, tipo).
    pub fn id_for(source: ConceptId, target: ConceptId, relation: &EdgeKind) -> EdgeId {
        let (_, verb) = relation.sort_key();
        let kind = match relation {
            EdgeKind::CoOccurrence => "co_occurrence",
            EdgeKind::Relation { .. } => "relation",
        };
        let name = format!("{source}|{target}|{kind}|{verb}");
        Uuid::new_v5(&CONCEPT_NAMESPACE, name.as_bytes())
    }

    /// Mais uma observação; o peso acompanha a contagem.
    pub fn observe(&mut self) {
        self.count = self.count.saturating_add(1);
        self.weight = weight_for(self.count);
    }

    pub fn involves(&self, concept: ConceptId) -> bool {
        self.source == concept || self.target == concept
    }
}

/// `count / (count + 1)`.
pub fn weight_for(count: u32) -> f64 {
    let c = f64::from(count);
    c / (c + 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_weight_strictly_monotonic() {
        let mut previous = 0.0;
        for count in 1..50 {
            let w = weight_for(count);
            assert!(w > previous);
            assert!(w < 1.0);
            previous = w;
        }
    }

    #[test]
    fn test_observe_updates_weight() {
        let a = Uuid::new_v5(&CONCEPT_NAMESPACE, b"a");
        let b = Uuid::new_v5(&CONCEPT_NAMESPACE, b"b");
        let mut edge = ConceptEdge::new(a, b, EdgeKind::CoOccurrence, None);
        assert_eq!(edge.weight, 0.5);
        edge.observe();
        assert_eq!(edge.count, 2);
        assert!((edge.weight - 2.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_id_depends_on_kind_and_verb() {
        let a = Uuid::new_v5(&CONCEPT_NAMESPACE, b"a");
        let b = Uuid::new_v5(&CONCEPT_NAMESPACE, b"b");
        let co = ConceptEdge::id_for(a, b, &EdgeKind::CoOccurrence);
        let conv = ConceptEdge::id_for(a, b, &EdgeKind::relation("convert"));
        let prod = ConceptEdge::id_for(a, b, &EdgeKind::relation("produce"));
        assert_ne!(co, conv);
        assert_ne!(conv, prod);
        assert_eq!(conv, ConceptEdge::id_for(a, b, &EdgeKind::relation("convert")));
    }

    #[test]
    fn test_relation_serializes_with_tag() {
        let json = serde_json::to_string(&EdgeKind::relation("convert")).unwrap();
        assert_eq!(json, r#"{"kind":"relation","verb":"convert"}"#);
        let json = serde_json::to_string(&EdgeKind::CoOccurrence).unwrap();
        assert_eq!(json, r#"{"kind":"co_occurrence"}"#);
    }
}
