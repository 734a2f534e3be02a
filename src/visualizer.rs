//! # Visualizer: Mapa de Conceitos → SVG
//!
//! ```text
//! ConceptMap
//!   ├── 1. Seleção: mapa > max_nodes → maior componente fracamente conexo
//!   │            (petgraph, visão não direcionada), truncado a max_nodes
//!   ├── 2. Posições iniciais: splitmix64(seed ⊕ id do nó)
//!   ├── 3. Fruchterman-Reingold, `iterations` passos, resfriamento linear
//!   └── 4. Marcação SVG (maud): arestas, rótulos de verbo, nós, título
//! ```
//!
//! O layout não usa aleatoriedade global: mesmo mapa + mesma semente geram
//! o mesmo arquivo byte a byte.
//!
//! | Elemento | Estilo |
//! |----------|--------|
//! | nó | círculo azul-céu com rótulo |
//! | relação | linha cinza com seta e verbo em vermelho |
//! | co-ocorrência | linha tracejada clara, sem seta |

use std::collections::{HashMap, HashSet};
use std::path::Path;

use maud::{html, Markup};
use petgraph::graph::{NodeIndex, UnGraph};
use petgraph::unionfind::UnionFind;
use petgraph::visit::EdgeRef;

use crate::config::VisualizerConfig;
use crate::core::{ConceptEdge, ConceptId, ConceptMap, ConceptNode};
use crate::error::Result;
use crate::persistence;

const NODE_RADIUS: f64 = 26.0;
const MARGIN: f64 = 60.0;
const TITLE_HEIGHT: f64 = 40.0;

#[derive(Clone, Copy, Debug, PartialEq)]
struct Point {
    x: f64,
    y: f64,
}

/// Subgrafo efetivamente desenhado.
pub struct Selection<'a> {
    pub nodes: Vec<&'a ConceptNode>,
    pub edges: Vec<&'a ConceptEdge>,
}

pub struct Visualizer {
    config: VisualizerConfig,
}

impl Visualizer {
    pub fn new(config: VisualizerConfig) -> Self {
        Self { config }
    }

    /// Nós e arestas que cabem no desenho.
    pub fn select<'a>(&self, map: &'a ConceptMap) -> Selection<'a> {
        let max_nodes = self.config.max_nodes.max(1);
        let nodes: Vec<&ConceptNode> = if map.node_count() > max_nodes {
            largest_component(map).into_iter().take(max_nodes).collect()
        } else {
            map.nodes.iter().collect()
        };
        let keep: HashSet<ConceptId> = nodes.iter().map(|n| n.id).collect();
        let edges = map
            .edges
            .iter()
            .filter(|e| keep.contains(&e.source) && keep.contains(&e.target))
            .collect();
        Selection { nodes, edges }
    }

    /// Documento SVG completo, com cabeçalho XML.
    pub fn render(&self, map: &ConceptMap, title: &str) -> String {
        let selection = self.select(map);
        let positions = self.layout(&selection);
        let markup = self.markup(&selection, &positions, title);
        tracing::info!(
            nodes = selection.nodes.len(),
            edges = selection.edges.len(),
            total_nodes = map.node_count(),
            "Mapa renderizado"
        );
        format!("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n{}\n", markup.into_string())
    }

    pub fn render_to_file(&self, map: &ConceptMap, title: &str, output: &Path) -> Result<()> {
        let svg = self.render(map, title);
        persistence::write_text(output, &svg)?;
        tracing::info!(path = %output.display(), "SVG gravado");
        Ok(())
    }

    // ─── Layout ─────────────────────────────────────────────────

    fn layout(&self, selection: &Selection<'_>) -> Vec<Point> {
        let width = f64::from(self.config.width);
        let height = f64::from(self.config.height);
        let (min_x, max_x) = (MARGIN, (width - MARGIN).max(MARGIN));
        let (min_y, max_y) = (MARGIN + TITLE_HEIGHT, (height - MARGIN).max(MARGIN + TITLE_HEIGHT));
        let n = selection.nodes.len();
        match n {
            0 => return Vec::new(),
            1 => {
                return vec![Point {
                    x: (min_x + max_x) / 2.0,
                    y: (min_y + max_y) / 2.0,
                }]
            }
            _ => {}
        }

        let mut pos: Vec<Point> = selection
            .nodes
            .iter()
            .map(|node| {
                let id = node.id.as_u128();
                let mut state = self.config.seed ^ (id as u64) ^ ((id >> 64) as u64);
                let rx = unit(splitmix64(&mut state));
                let ry = unit(splitmix64(&mut state));
                Point {
                    x: min_x + rx * (max_x - min_x),
                    y: min_y + ry * (max_y - min_y),
                }
            })
            .collect();

        let graph = undirected_view(&selection.nodes, selection.edges.iter().copied());
        let links: Vec<(usize, usize)> = graph
            .edge_references()
            .map(|e| (e.source().index(), e.target().index()))
            .collect();

        let area = (max_x - min_x) * (max_y - min_y);
        let k = (area / n as f64).sqrt();
        let iterations = self.config.iterations.max(1);
        let start_temp = (max_x - min_x) / 10.0;

        for step in 0..iterations {
            let temp = start_temp * (1.0 - step as f64 / iterations as f64);
            let mut disp = vec![Point { x: 0.0, y: 0.0 }; n];

            for i in 0..n {
                for j in (i + 1)..n {
                    let (dx, dy, d) = delta(pos[i], pos[j], i, j);
                    let force = k * k / d;
                    disp[i].x += dx / d * force;
                    disp[i].y += dy / d * force;
                    disp[j].x -= dx / d * force;
                    disp[j].y -= dy / d * force;
                }
            }
            for &(a, b) in &links {
                let (dx, dy, d) = delta(pos[a], pos[b], a, b);
                let force = d * d / k;
                disp[a].x -= dx / d * force;
                disp[a].y -= dy / d * force;
                disp[b].x += dx / d * force;
                disp[b].y += dy / d * force;
            }

            for (p, d) in pos.iter_mut().zip(&disp) {
                let len = (d.x * d.x + d.y * d.y).sqrt();
                if len > 0.0 {
                    let capped = len.min(temp);
                    p.x += d.x / len * capped;
                    p.y += d.y / len * capped;
                }
                p.x = p.x.clamp(min_x, max_x);
                p.y = p.y.clamp(min_y, max_y);
            }
        }
        pos
    }

    // ─── Marcação ───────────────────────────────────────────────

    fn markup(&self, selection: &Selection<'_>, pos: &[Point], title: &str) -> Markup {
        let width = self.config.width;
        let height = self.config.height;
        let index: HashMap<ConceptId, usize> = selection.nodes.iter().enumerate().map(|(i, n)| (n.id, i)).collect();

        html! {
            svg xmlns="http://www.w3.org/2000/svg" width=(width) height=(height)
                viewBox=(format!("0 0 {width} {height}")) font-family="sans-serif" {
                defs {
                    marker id="arrow" viewBox="0 0 10 10" refX="10" refY="5"
                        markerWidth="8" markerHeight="8" orient="auto-start-reverse" {
                        path d="M 0 0 L 10 5 L 0 10 z" fill="gray" {}
                    }
                }
                rect width="100%" height="100%" fill="white" {}
                text x=(fmt(f64::from(width) / 2.0)) y="32" text-anchor="middle" font-size="20" {
                    (title)
                }
                @if selection.nodes.is_empty() {
                    text x=(fmt(f64::from(width) / 2.0)) y=(fmt(f64::from(height) / 2.0))
                        text-anchor="middle" font-size="16" fill="gray" {
                        "No concepts"
                    }
                }
                g class="edges" {
                    @for edge in &selection.edges {
                        @if let (Some(&a), Some(&b)) = (index.get(&edge.source), index.get(&edge.target)) {
                            (edge_markup(edge, pos[a], pos[b]))
                        }
                    }
                }
                g class="nodes" {
                    @for (node, p) in selection.nodes.iter().zip(pos) {
                        g class="node" {
                            title { (node.label) " (" (node.frequency) ")" }
                            circle cx=(fmt(p.x)) cy=(fmt(p.y)) r=(fmt(NODE_RADIUS))
                                fill="skyblue" stroke="steelblue" stroke-width="1.5" {}
                            text x=(fmt(p.x)) y=(fmt(p.y + 4.0)) text-anchor="middle" font-size="10" {
                                (node.label)
                            }
                        }
                    }
                }
            }
        }
    }
}

fn edge_markup(edge: &ConceptEdge, from: Point, to: Point) -> Markup {
    let dx = to.x - from.x;
    let dy = to.y - from.y;
    let d = (dx * dx + dy * dy).sqrt().max(1e-6);
    // Linha termina na borda dos círculos.
    let start = Point {
        x: from.x + dx / d * NODE_RADIUS,
        y: from.y + dy / d * NODE_RADIUS,
    };
    let end = Point {
        x: to.x - dx / d * NODE_RADIUS,
        y: to.y - dy / d * NODE_RADIUS,
    };
    let mid = Point {
        x: (from.x + to.x) / 2.0,
        y: (from.y + to.y) / 2.0,
    };

    html! {
        @if let Some(verb) = edge.relation.verb() {
            line x1=(fmt(start.x)) y1=(fmt(start.y)) x2=(fmt(end.x)) y2=(fmt(end.y))
                stroke="gray" stroke-width=(fmt(1.0 + 2.0 * edge.weight)) marker-end="url(#arrow)" {}
            text x=(fmt(mid.x)) y=(fmt(mid.y - 4.0)) text-anchor="middle" font-size="8" fill="red" {
                (verb)
            }
        } @else {
            line x1=(fmt(start.x)) y1=(fmt(start.y)) x2=(fmt(end.x)) y2=(fmt(end.y))
                stroke="lightgray" stroke-width="1" stroke-dasharray="4 3" {}
        }
    }
}

fn fmt(v: f64) -> String {
    format!("{v:.1}")
}

/// Vetor de `b` para `a` e distância, com desempate determinístico para
/// nós sobrepostos.
fn delta(a: Point, b: Point, i: usize, j: usize) -> (f64, f64, f64) {
    let mut dx = a.x - b.x;
    let mut dy = a.y - b.y;
    if dx.abs() < 1e-9 && dy.abs() < 1e-9 {
        dx = 0.01 * (i as f64 - j as f64);
        dy = 0.01;
    }
    (dx, dy, (dx * dx + dy * dy).sqrt().max(0.01))
}

fn splitmix64(state: &mut u64) -> u64 {
    *state = state.wrapping_add(0x9E37_79B9_7F4A_7C15);
    let mut z = *state;
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

/// `[0, 1)` a partir dos 53 bits altos.
fn unit(v: u64) -> f64 {
    (v >> 11) as f64 / (1u64 << 53) as f64
}

// ─── Componentes ────────────────────────────────────────────────

/// Grafo não direcionado sobre `nodes`; `NodeIndex(i)` é `nodes[i]`.
///
/// Arestas com extremidade fora de `nodes` ficam de fora.
fn undirected_view<'a>(
    nodes: &[&'a ConceptNode],
    edges: impl Iterator<Item = &'a ConceptEdge>,
) -> UnGraph<&'a ConceptNode, &'a ConceptEdge> {
    let mut graph = UnGraph::with_capacity(nodes.len(), 0);
    let mut index: HashMap<ConceptId, NodeIndex> = HashMap::with_capacity(nodes.len());
    for node in nodes {
        index.insert(node.id, graph.add_node(*node));
    }
    for edge in edges {
        if let (Some(&a), Some(&b)) = (index.get(&edge.source), index.get(&edge.target)) {
            graph.add_edge(a, b, edge);
        }
    }
    graph
}

/// Nós do maior componente fracamente conexo, na ordem do mapa.
///
/// Empate: vence o componente que contém o nó mais antigo.
fn largest_component(map: &ConceptMap) -> Vec<&ConceptNode> {
    let nodes: Vec<&ConceptNode> = map.nodes.iter().collect();
    let graph = undirected_view(&nodes, map.edges.iter());

    let mut components = UnionFind::<usize>::new(graph.node_count());
    for edge in graph.edge_references() {
        components.union(edge.source().index(), edge.target().index());
    }
    let labels = components.into_labeling();

    let mut sizes: HashMap<usize, usize> = HashMap::new();
    for &label in &labels {
        *sizes.entry(label).or_default() += 1;
    }
    // Percorre na ordem dos nós: o primeiro máximo é o componente mais antigo.
    let mut best: Option<(usize, usize)> = None;
    for &label in &labels {
        let size = sizes[&label];
        if best.map_or(true, |(_, s)| size > s) {
            best = Some((label, size));
        }
    }
    let Some((component, _)) = best else {
        return Vec::new();
    };
    graph
        .node_indices()
        .filter(|i| labels[i.index()] == component)
        .map(|i| graph[i])
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::EdgeKind;

    fn sample_map() -> ConceptMap {
        let mut map = ConceptMap::new();
        let doc = "doc".to_string();
        let p = map.add_mention("photosynthesis", &doc, "s");
        let l = map.add_mention("light", &doc, "s");
        let e = map.add_mention("chemical energy", &doc, "s");
        let x = map.add_mention("mitochondria", &doc, "s");
        let y = map.add_mention("cell", &doc, "s");
        map.observe_edge(p, l, EdgeKind::relation("convert"), Some("s")).unwrap();
        map.observe_edge(p, e, EdgeKind::CoOccurrence, Some("s")).unwrap();
        map.observe_edge(x, y, EdgeKind::CoOccurrence, Some("s")).unwrap();
        map
    }

    #[test]
    fn test_render_is_valid_deterministic_svg() {
        let v = Visualizer::new(VisualizerConfig::default());
        let map = sample_map();
        let a = v.render(&map, "biology");
        let b = v.render(&map, "biology");
        assert_eq!(a, b);
        assert!(a.starts_with("<?xml"));
        assert!(a.contains("<svg"));
        assert!(a.trim_end().ends_with("</svg>"));
        assert!(a.contains("marker-end=\"url(#arrow)\""));
        assert!(a.contains(">convert</text>"));
        assert!(a.contains(">biology</text>"));
        assert_eq!(a.matches("<circle").count(), 5);
    }

    #[test]
    fn test_empty_map_placeholder() {
        let svg = Visualizer::new(VisualizerConfig::default()).render(&ConceptMap::new(), "empty");
        assert!(svg.contains("No concepts"));
        assert!(!svg.contains("<circle"));
    }

    #[test]
    fn test_large_map_reduced_to_largest_component() {
        let config = VisualizerConfig {
            max_nodes: 2,
            ..Default::default()
        };
        let v = Visualizer::new(config);
        let map = sample_map();
        let selection = v.select(&map);
        let labels: Vec<_> = selection.nodes.iter().map(|n| n.label.as_str()).collect();
        assert_eq!(labels, vec!["photosynthesis", "light"]);
        assert_eq!(selection.edges.len(), 1);
    }

    #[test]
    fn test_component_tie_goes_to_earliest_node() {
        let mut map = ConceptMap::new();
        let doc = "doc".to_string();
        let a = map.add_mention("gravity", &doc, "s");
        let b = map.add_mention("mass", &doc, "s");
        let c = map.add_mention("enzymes", &doc, "s");
        let d = map.add_mention("proteins", &doc, "s");
        map.observe_edge(c, d, EdgeKind::CoOccurrence, Some("s")).unwrap();
        map.observe_edge(a, b, EdgeKind::relation("attract"), Some("s")).unwrap();

        let labels: Vec<_> = largest_component(&map).iter().map(|n| n.label.as_str()).collect();
        assert_eq!(labels, vec!["gravity", "mass"]);

        let e = map.add_mention("amino acids", &doc, "s");
        map.observe_edge(d, e, EdgeKind::CoOccurrence, Some("s")).unwrap();
        let labels: Vec<_> = largest_component(&map).iter().map(|n| n.label.as_str()).collect();
        assert_eq!(labels, vec!["enzymes", "proteins", "amino acids"]);
    }

    #[test]
    fn test_isolated_nodes_are_singleton_components() {
        let mut map = ConceptMap::new();
        let doc = "doc".to_string();
        map.add_mention("osmosis", &doc, "s");
        map.add_mention("diffusion", &doc, "s");
        let labels: Vec<_> = largest_component(&map).iter().map(|n| n.label.as_str()).collect();
        assert_eq!(labels, vec!["osmosis"]);
        assert!(largest_component(&ConceptMap::new()).is_empty());
    }

    #[test]
    fn test_positions_stay_inside_canvas() {
        let config = VisualizerConfig::default();
        let v = Visualizer::new(config.clone());
        let map = sample_map();
        let selection = v.select(&map);
        for p in v.layout(&selection) {
            assert!(p.x >= MARGIN && p.x <= f64::from(config.width) - MARGIN);
            assert!(p.y >= MARGIN && p.y <= f64::from(config.height) - MARGIN);
        }
    }

    #[test]
    fn test_seed_changes_layout() {
        let map = sample_map();
        let a = Visualizer::new(VisualizerConfig::default()).render(&map, "t");
        let b = Visualizer::new(VisualizerConfig {
            seed: 7,
            ..Default::default()
        })
        .render(&map, "t");
        assert_ne!(a, b);
    }
}
