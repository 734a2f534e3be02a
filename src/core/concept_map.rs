//! # ConceptMap: Grafo de Conceitos do Currículo
//!
//! O [`ConceptMap`] é o artefato central do pipeline: produzido pelo
//! Extractor, lido pelo Question Generator e pelo Visualizer.
//!
//! ## Armazenamento
//!
//! - **Nós**: `Vec<ConceptNode>` em ordem de primeira menção
//! - **Arestas**: `Vec<ConceptEdge>` ordenadas por (posição da origem, posição do alvo, tipo, verbo)
//! - **Índices**: `HashMap` id → posição, para nós e para arestas
//!
//! Os índices são `#[serde(skip)]` e precisam ser reconstruídos após a
//! desserialização via [`rebuild_index()`](ConceptMap::rebuild_index).
//! [`persistence::load_concept_map`](crate::persistence::load_concept_map)
//! já faz isso e em seguida chama [`validate()`](ConceptMap::validate).
//!
//! ## Integridade
//!
//! - ids de nós são únicos
//! - toda aresta aponta para nós existentes
//! - origem ≠ alvo
//! - peso em `(0, 1)`
//!
//! ```rust,ignore
//! let mut map = ConceptMap::new();
//! let doc = "d".repeat(64);
//! let p = map.add_mention("photosynthesis", &doc, "Photosynthesis converts light.");
//! let l = map.add_mention("light", &doc, "Photosynthesis converts light.");
//! map.observe_edge(p, l, EdgeKind::relation("convert"), None)?;
//! assert!(map.node_by_label("Photosynthesis").is_some());
//! ```

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use super::concept::{ConceptId, ConceptNode};
use super::document::DocumentId;
use super::edge::{ConceptEdge, EdgeId, EdgeKind};
use crate::error::{PipelineError, Result};

/// Versão do formato de `concept_map.json`.
pub const CONCEPT_MAP_SCHEMA_VERSION: u32 = 1;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ConceptMap {
    pub schema_version: u32,
    pub nodes: Vec<ConceptNode>,
    pub edges: Vec<ConceptEdge>,

    /// id do nó → posição em `nodes`. Não serializado.
    #[serde(skip, default)]
    node_index: HashMap<ConceptId, usize>,

    /// id da aresta → posição em `edges`. Não serializado.
    #[serde(skip, default)]
    edge_index: HashMap<EdgeId, usize>,
}

impl Default for ConceptMap {
    fn default() -> Self {
        Self::new()
    }
}

impl PartialEq for ConceptMap {
    fn eq(&self, other: &Self) -> bool {
        self.schema_version == other.schema_version
            && self.nodes == other.nodes
            && self.edges == other.edges
    }
}

impl ConceptMap {
    pub fn new() -> Self {
        Self {
            schema_version: CONCEPT_MAP_SCHEMA_VERSION,
            nodes: Vec::new(),
            edges: Vec::new(),
            node_index: HashMap::new(),
            edge_index: HashMap::new(),
        }
    }

    /// Reconstrói os índices a partir de `nodes` e `edges`.
    ///
    /// Em caso de ids repetidos vence a primeira posição; [`validate()`](Self::validate)
    /// é quem reporta a duplicata.
    pub fn rebuild_index(&mut self) {
        self.node_index.clear();
        for (pos, node) in self.nodes.iter().enumerate() {
            self.node_index.entry(node.id).or_insert(pos);
        }
        self.edge_index.clear();
        for (pos, edge) in self.edges.iter().enumerate() {
            self.edge_index.entry(edge.id).or_insert(pos);
        }
    }

    // ─── Nós ────────────────────────────────────────────────────

    /// Registra uma menção de `label`: cria o nó ou reforça o existente.
    pub fn add_mention(&mut self, label: &str, document: &DocumentId, sentence: &str) -> ConceptId {
        let id = ConceptNode::id_for(label);
        if let Some(&pos) = self.node_index.get(&id) {
            self.nodes[pos].reinforce(document);
        } else {
            let node = ConceptNode::new(label, document, sentence);
            tracing::debug!(label = %node.label, "Novo conceito");
            self.node_index.insert(id, self.nodes.len());
            self.nodes.push(node);
        }
        id
    }

    pub fn node(&self, id: ConceptId) -> Option<&ConceptNode> {
        self.node_index.get(&id).map(|&pos| &self.nodes[pos])
    }

    /// Busca por label (case-insensitive, espaços normalizados).
    pub fn node_by_label(&self, label: &str) -> Option<&ConceptNode> {
        self.node(ConceptNode::id_for(label))
    }

    /// Posição do nó na ordem de primeira menção.
    pub fn node_position(&self, id: ConceptId) -> Option<usize> {
        self.node_index.get(&id).copied()
    }

    pub fn contains_node(&self, id: ConceptId) -> bool {
        self.node_index.contains_key(&id)
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    // ─── Arestas ────────────────────────────────────────────────

    /// Registra uma observação de aresta entre dois nós existentes.
    ///
    /// Co-ocorrências são guardadas com a origem sendo o nó mais antigo.
    /// Retorna erro se algum extremo não existir ou se origem = alvo.
    pub fn observe_edge(
        &mut self,
        source: ConceptId,
        target: ConceptId,
        relation: EdgeKind,
        context: Option<&str>,
    ) -> Result<EdgeId> {
        let (Some(source_pos), Some(target_pos)) =
            (self.node_position(source), self.node_position(target))
        else {
            return Err(PipelineError::MalformedMap(format!(
                "aresta {source} -> {target} referencia conceito inexistente"
            )));
        };
        if source == target {
            return Err(PipelineError::MalformedMap(format!(
                "aresta reflexiva no conceito {source}"
            )));
        }

        let (source, target) = match relation {
            EdgeKind::CoOccurrence if target_pos < source_pos => (target, source),
            _ => (source, target),
        };

        let id = ConceptEdge::id_for(source, target, &relation);
        if let Some(&pos) = self.edge_index.get(&id) {
            self.edges[pos].observe();
        } else {
            let edge = ConceptEdge::new(source, target, relation, context.map(|c| c.trim().to_string()));
            tracing::debug!(edge = %self.describe_edge(&edge), "Nova aresta");
            self.edge_index.insert(id, self.edges.len());
            self.edges.push(edge);
        }
        Ok(id)
    }

    pub fn edge(&self, id: EdgeId) -> Option<&ConceptEdge> {
        self.edge_index.get(&id).map(|&pos| &self.edges[pos])
    }

    pub fn contains_edge(&self, id: EdgeId) -> bool {
        self.edge_index.contains_key(&id)
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn edges_for_node(&self, id: ConceptId) -> impl Iterator<Item = &ConceptEdge> {
        self.edges.iter().filter(move |e| e.involves(id))
    }

    /// `"photosynthesis -[convert]-> light"`
    pub fn describe_edge(&self, edge: &ConceptEdge) -> String {
        let label = |id| self.node(id).map(|n| n.label.as_str()).unwrap_or("?");
        match &edge.relation {
            EdgeKind::CoOccurrence => format!("{} -- {}", label(edge.source), label(edge.target)),
            EdgeKind::Relation { verb } => {
                format!("{} -[{}]-> {}", label(edge.source), verb, label(edge.target))
            }
        }
    }

    // ─── Manutenção ─────────────────────────────────────────────

    /// Remove nós com frequência abaixo de `min_frequency` e as arestas que os tocam.
    ///
    /// Retorna quantos nós foram removidos.
    pub fn prune(&mut self, min_frequency: u32) -> usize {
        let before = self.nodes.len();
        self.nodes.retain(|n| n.frequency >= min_frequency);
        let removed = before - self.nodes.len();
        if removed > 0 {
            let kept: HashSet<ConceptId> = self.nodes.iter().map(|n| n.id).collect();
            self.edges
                .retain(|e| kept.contains(&e.source) && kept.contains(&e.target));
            tracing::debug!(removed, min_frequency, "Conceitos podados por frequência");
        }
        self.rebuild_index();
        removed
    }

    /// Ordena as arestas por (posição da origem, posição do alvo, tipo, verbo).
    pub fn sort_edges(&mut self) {
        let positions = &self.node_index;
        self.edges.sort_by(|a, b| {
            let key = |e: &ConceptEdge| {
                (
                    positions.get(&e.source).copied().unwrap_or(usize::MAX),
                    positions.get(&e.target).copied().unwrap_or(usize::MAX),
                )
            };
            key(a)
                .cmp(&key(b))
                .then_with(|| a.relation.sort_key().cmp(&b.relation.sort_key()))
        });
        self.rebuild_index();
    }

    /// Checa a integridade referencial e a versão do esquema.
    pub fn validate(&self) -> Result<()> {
        if self.schema_version != CONCEPT_MAP_SCHEMA_VERSION {
            return Err(PipelineError::MalformedMap(format!(
                "versão de esquema {} não suportada (esperado {})",
                self.schema_version, CONCEPT_MAP_SCHEMA_VERSION
            )));
        }

        let mut node_ids = HashSet::with_capacity(self.nodes.len());
        for node in &self.nodes {
            if !node_ids.insert(node.id) {
                return Err(PipelineError::MalformedMap(format!(
                    "id de conceito duplicado: {} ('{}')",
                    node.id, node.label
                )));
            }
            if node.label.trim().is_empty() {
                return Err(PipelineError::MalformedMap(format!(
                    "conceito {} sem label",
                    node.id
                )));
            }
        }

        let mut edge_ids = HashSet::with_capacity(self.edges.len());
        for edge in &self.edges {
            if !edge_ids.insert(edge.id) {
                return Err(PipelineError::MalformedMap(format!(
                    "id de aresta duplicado: {}",
                    edge.id
                )));
            }
            for endpoint in [edge.source, edge.target] {
                if !node_ids.contains(&endpoint) {
                    return Err(PipelineError::MalformedMap(format!(
                        "aresta {} referencia conceito inexistente {}",
                        edge.id, endpoint
                    )));
                }
            }
            if edge.source == edge.target {
                return Err(PipelineError::MalformedMap(format!(
                    "aresta {} é reflexiva",
                    edge.id
                )));
            }
            if !(edge.weight > 0.0 && edge.weight < 1.0) {
                return Err(PipelineError::MalformedMap(format!(
                    "aresta {} com peso fora de (0, 1): {}",
                    edge.id, edge.weight
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn doc() -> DocumentId {
        "d".repeat(64)
    }

    fn sample() -> (ConceptMap, ConceptId, ConceptId, ConceptId) {
        let mut map = ConceptMap::new();
        let s = "Photosynthesis converts light into chemical energy.";
        let p = map.add_mention("photosynthesis", &doc(), s);
        let l = map.add_mention("light", &doc(), s);
        let c = map.add_mention("chemical energy", &doc(), s);
        (map, p, l, c)
    }

    #[test]
    fn test_add_mention_reinforces() {
        let (mut map, p, _, _) = sample();
        let again = map.add_mention("Photosynthesis", &doc(), "other");
        assert_eq!(again, p);
        assert_eq!(map.node_count(), 3);
        assert_eq!(map.node(p).unwrap().frequency, 2);
        assert_eq!(map.node_position(p), Some(0));
    }

    #[test]
    fn test_cooccurrence_normalizes_direction() {
        let (mut map, p, l, _) = sample();
        let e1 = map.observe_edge(l, p, EdgeKind::CoOccurrence, None).unwrap();
        let e2 = map.observe_edge(p, l, EdgeKind::CoOccurrence, None).unwrap();
        assert_eq!(e1, e2);
        let edge = map.edge(e1).unwrap();
        assert_eq!(edge.source, p);
        assert_eq!(edge.count, 2);
    }

    #[test]
    fn test_relation_keeps_direction() {
        let (mut map, p, l, _) = sample();
        let id = map.observe_edge(l, p, EdgeKind::relation("feed"), Some("x")).unwrap();
        assert_eq!(map.edge(id).unwrap().source, l);
        assert_eq!(map.describe_edge(map.edge(id).unwrap()), "light -[feed]-> photosynthesis");
    }

    #[test]
    fn test_observe_edge_rejects_unknown_and_reflexive() {
        let (mut map, p, _, _) = sample();
        let ghost = Uuid::nil();
        assert!(matches!(
            map.observe_edge(p, ghost, EdgeKind::CoOccurrence, None),
            Err(PipelineError::MalformedMap(_))
        ));
        assert!(map.observe_edge(p, p, EdgeKind::CoOccurrence, None).is_err());
    }

    #[test]
    fn test_prune_drops_dangling_edges() {
        let (mut map, p, l, c) = sample();
        map.add_mention("photosynthesis", &doc(), "again");
        map.observe_edge(p, l, EdgeKind::CoOccurrence, None).unwrap();
        map.observe_edge(l, c, EdgeKind::CoOccurrence, None).unwrap();

        let removed = map.prune(2);
        assert_eq!(removed, 2);
        assert_eq!(map.node_count(), 1);
        assert_eq!(map.edge_count(), 0);
        assert!(map.validate().is_ok());
    }

    #[test]
    fn test_sort_edges_by_node_position() {
        let (mut map, p, l, c) = sample();
        map.observe_edge(l, c, EdgeKind::CoOccurrence, None).unwrap();
        map.observe_edge(p, l, EdgeKind::relation("convert"), None).unwrap();
        map.observe_edge(p, l, EdgeKind::CoOccurrence, None).unwrap();
        map.sort_edges();

        assert_eq!(map.edges[0].relation, EdgeKind::CoOccurrence);
        assert_eq!(map.edges[0].source, p);
        assert_eq!(map.edges[1].relation, EdgeKind::relation("convert"));
        assert_eq!(map.edges[2].source, l);
        let first = map.edges[0].id;
        assert_eq!(map.edge(first).unwrap().id, first);
    }

    #[test]
    fn test_validate_detects_dangling_endpoint() {
        let (mut map, p, l, _) = sample();
        map.observe_edge(p, l, EdgeKind::CoOccurrence, None).unwrap();
        map.edges[0].target = Uuid::nil();
        assert!(matches!(map.validate(), Err(PipelineError::MalformedMap(_))));
    }

    #[test]
    fn test_validate_detects_duplicate_node_and_version() {
        let (mut map, _, _, _) = sample();
        let dup = map.nodes[0].clone();
        map.nodes.push(dup);
        assert!(map.validate().is_err());

        let (mut map, _, _, _) = sample();
        map.schema_version = 99;
        assert!(map.validate().is_err());
    }

    #[test]
    fn test_serde_skips_index() {
        let (mut map, p, l, _) = sample();
        map.observe_edge(p, l, EdgeKind::CoOccurrence, None).unwrap();
        let json = serde_json::to_string(&map).unwrap();
        assert!(!json.contains("node_index"));

        let mut loaded: ConceptMap = serde_json::from_str(&json).unwrap();
        assert!(loaded.node(p).is_none());
        loaded.rebuild_index();
        assert_eq!(loaded.node(p).unwrap().label, "photosynthesis");
        assert_eq!(loaded, map);
    }
}
