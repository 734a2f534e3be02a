//! # Gerador de Perguntas a partir do Mapa de Conceitos
//!
//! O [`QuestionGenerator`] percorre o [`ConceptMap`] e produz perguntas de
//! quiz ligadas a um nó ou a uma aresta.
//!
//! ## Tipos de Perguntas
//!
//! | Método | Alvo | Templates |
//! |--------|------|-----------|
//! | `for_concept` | nó com frase de origem | "What is X?", "Define X." |
//! | `for_relation` | aresta `relation` | família do verbo + variantes de dependência |
//! | `for_cooccurrence` | aresta `co_occurrence` com peso mínimo | "How does A relate to B?" |
//!
//! ## Famílias de Verbo
//!
//! | Família | Lemas | Exemplo |
//! |---------|-------|---------|
//! | causal | cause, affect, lead, result, influence, trigger | "Why does heat cause expansion?" |
//! | composição | contain, include, have, consist, comprise | "List the components of a cell." |
//! | ação | use, connect, provide, follow, require | "Describe how a router connects networks." |
//! | geral | o resto | "How are photosynthesis and light related?" |
//!
//! Toda relação também recebe "Who or what {verbo} {alvo}?", "What {verbo} {alvo}?"
//! e "What does {origem} {verbo}?".
//!
//! ## Seleção Determinística
//!
//! A ordem é: definições (ordem dos nós), relações (ordem das arestas),
//! co-ocorrências (ordem das arestas). Perguntas repetidas ou incompletas
//! (menos de 5 palavras, preposição no fim) são descartadas.

use std::collections::HashSet;

use super::lexicon;
use crate::config::QuestionConfig;
use crate::core::{
    ConceptEdge, ConceptMap, ConceptNode, EdgeKind, Question, QuestionKind, QuestionTarget,
};
use crate::qa::AnswerModel;

/// Mínimo de palavras de uma pergunta de relação.
const MIN_RELATION_WORDS: usize = 5;

const CAUSAL_VERBS: &[&str] = &["cause", "affect", "lead", "result", "influence", "trigger"];
const COMPOSITION_VERBS: &[&str] = &["contain", "include", "have", "consist", "comprise"];
const ACTION_VERBS: &[&str] = &["use", "connect", "provide", "follow", "require"];

/// Pergunta ainda sem id, antes do filtro e do preenchimento de resposta.
#[derive(Clone, Debug, PartialEq)]
pub struct Draft {
    pub text: String,
    pub answer: String,
    pub kind: QuestionKind,
    pub target: QuestionTarget,
    pub context: Option<String>,
    pub source: String,
    pub verb: Option<String>,
    pub target_label: Option<String>,
}

pub struct QuestionGenerator<'a> {
    config: &'a QuestionConfig,
}

impl<'a> QuestionGenerator<'a> {
    pub fn new(config: &'a QuestionConfig) -> Self {
        Self { config }
    }

    /// Gera as perguntas do mapa.
    ///
    /// Com `answerer`, cada pergunta com contexto é respondida pelo modelo;
    /// a resposta do modelo substitui a do template quando não é vazia.
    pub fn generate(&self, map: &ConceptMap, answerer: Option<&dyn AnswerModel>) -> Vec<Question> {
        let mut drafts = Vec::new();
        if self.config.include_definitions {
            for node in &map.nodes {
                drafts.extend(self.for_concept(node));
            }
        }
        for edge in map.edges.iter().filter(|e| e.relation.verb().is_some()) {
            drafts.extend(self.for_relation(map, edge));
        }
        if self.config.include_cooccurrence {
            for edge in map.edges.iter().filter(|e| e.relation == EdgeKind::CoOccurrence) {
                drafts.extend(self.for_cooccurrence(map, edge));
            }
        }

        let total = drafts.len();
        let mut seen = HashSet::new();
        let mut questions: Vec<Question> = Vec::new();
        for draft in drafts {
            if self.config.max_questions.is_some_and(|max| questions.len() >= max) {
                break;
            }
            if !seen.insert(draft.text.to_lowercase()) {
                continue;
            }
            let id = format!("q{:04}", questions.len() + 1);
            let expected_answer = fill_answer(&draft, answerer);
            questions.push(Question {
                id,
                text: draft.text,
                expected_answer: Some(expected_answer),
                target: draft.target,
                kind: draft.kind,
                context: draft.context,
                source: draft.source,
                verb: draft.verb,
                target_label: draft.target_label,
            });
        }

        tracing::info!(
            candidates = total,
            questions = questions.len(),
            "Perguntas geradas"
        );
        questions
    }

    /// Definições para um nó com frase de origem.
    pub fn for_concept(&self, node: &ConceptNode) -> Vec<Draft> {
        let Some(label) = clean_concept(&node.label) else {
            tracing::debug!(label = %node.label, "Conceito ignorado: rótulo inválido");
            return Vec::new();
        };
        if lexicon::is_generic_concept(&label) {
            return Vec::new();
        }
        let Some(span) = &node.source_span else {
            tracing::debug!(label = %label, "Conceito ignorado: sem frase de origem");
            return Vec::new();
        };
        let sentence = span.sentence.clone();
        [format!("What is {label}?"), format!("Define {label}.")]
            .into_iter()
            .map(|text| Draft {
                text,
                answer: sentence.clone(),
                kind: QuestionKind::Definition,
                target: QuestionTarget::Node(node.id),
                context: Some(sentence.clone()),
                source: label.clone(),
                verb: None,
                target_label: None,
            })
            .collect()
    }

    /// Templates de uma aresta `relation`.
    pub fn for_relation(&self, map: &ConceptMap, edge: &ConceptEdge) -> Vec<Draft> {
        let Some(verb) = edge.relation.verb() else {
            return Vec::new();
        };
        let Some((source, target)) = self.edge_labels(map, edge) else {
            return Vec::new();
        };
        let verb = lexicon::lemmatize(verb);
        if lexicon::is_blacklisted_verb(&verb) {
            tracing::debug!(verb = %verb, "Relação ignorada: verbo na lista negra");
            return Vec::new();
        }
        if !lexicon::is_known_verb(&verb) {
            tracing::debug!(verb = %verb, "Relação ignorada: verbo desconhecido");
            return Vec::new();
        }

        let base = verb_phrase(&verb);
        let third = verb_phrase_third_person(&verb);
        let statement = capitalize(&format!("{source} {third} {target}."));
        let context = edge
            .context
            .clone()
            .unwrap_or_else(|| statement.clone());

        let mut pairs: Vec<(QuestionKind, String, String)> = Vec::new();
        if CAUSAL_VERBS.contains(&verb.as_str()) {
            pairs.push((QuestionKind::Causal, format!("Why does {source} {base} {target}?"), format!("Because {source} {third} {target}.")));
            pairs.push((QuestionKind::Causal, format!("How does {source} {base} {target}?"), statement.clone()));
            pairs.push((QuestionKind::Causal, format!("What effect does {source} have on {target}?"), statement.clone()));
        } else if COMPOSITION_VERBS.contains(&verb.as_str()) {
            pairs.push((QuestionKind::Composition, format!("What does {source} {base}?"), target.clone()));
            pairs.push((QuestionKind::Composition, format!("List the components of {source}."), statement.clone()));
            pairs.push((QuestionKind::Composition, format!("Describe what {source} {third}."), statement.clone()));
        } else if ACTION_VERBS.contains(&verb.as_str()) {
            pairs.push((QuestionKind::Action, format!("How does {source} {base} {target}?"), statement.clone()));
            pairs.push((QuestionKind::Action, format!("Describe how {source} {third} {target}."), statement.clone()));
            pairs.push((QuestionKind::Action, format!("What is the role of {source} in relation to {target}?"), statement.clone()));
        } else {
            pairs.push((QuestionKind::General, format!("What is the relationship between {source} and {target}?"), statement.clone()));
            pairs.push((QuestionKind::General, format!("Explain the connection between {source} and {target}."), statement.clone()));
            pairs.push((QuestionKind::General, format!("How are {source} and {target} related?"), statement.clone()));
        }
        pairs.push((QuestionKind::Dependency, format!("What {third} {target}?"), source.clone()));
        pairs.push((QuestionKind::Dependency, format!("What does {source} {base}?"), target.clone()));
        pairs.push((QuestionKind::Dependency, format!("Who or what {third} {target}?"), source.clone()));

        pairs
            .into_iter()
            .filter(|(_, text, _)| {
                let incomplete = is_incomplete_question(text, MIN_RELATION_WORDS);
                if incomplete {
                    tracing::debug!(question = %text, "Pergunta descartada: incompleta");
                }
                !incomplete
            })
            .map(|(kind, text, answer)| Draft {
                text,
                answer,
                kind,
                target: QuestionTarget::Edge(edge.id),
                context: Some(context.clone()),
                source: source.clone(),
                verb: Some(verb.clone()),
                target_label: Some(target.clone()),
            })
            .collect()
    }

    /// "How does A relate to B?" para co-ocorrências fortes o bastante.
    pub fn for_cooccurrence(&self, map: &ConceptMap, edge: &ConceptEdge) -> Vec<Draft> {
        if edge.weight < self.config.min_cooccurrence_weight {
            return Vec::new();
        }
        let Some((source, target)) = self.edge_labels(map, edge) else {
            return Vec::new();
        };
        let Some(context) = edge.context.clone() else {
            return Vec::new();
        };
        let text = format!("How does {source} relate to {target}?");
        if is_incomplete_question(&text, MIN_RELATION_WORDS) {
            return Vec::new();
        }
        vec![Draft {
            text,
            answer: context.clone(),
            kind: QuestionKind::CoOccurrence,
            target: QuestionTarget::Edge(edge.id),
            context: Some(context),
            source,
            verb: None,
            target_label: Some(target),
        }]
    }

    /// Labels limpos da origem e do alvo, ou `None` se a aresta não serve.
    fn edge_labels(&self, map: &ConceptMap, edge: &ConceptEdge) -> Option<(String, String)> {
        let source = clean_concept(&map.node(edge.source)?.label)?;
        let target = clean_concept(&map.node(edge.target)?.label)?;
        if lexicon::is_generic_concept(&source) || lexicon::is_generic_concept(&target) {
            tracing::debug!(source = %source, target = %target, "Aresta ignorada: conceito genérico");
            return None;
        }
        if is_tautology(&source, &target) {
            tracing::debug!(source = %source, target = %target, "Aresta ignorada: tautologia");
            return None;
        }
        Some((source, target))
    }
}

fn fill_answer(draft: &Draft, answerer: Option<&dyn AnswerModel>) -> String {
    let (Some(model), Some(context)) = (answerer, draft.context.as_deref()) else {
        return draft.answer.clone();
    };
    match model.answer(&draft.text, context) {
        Ok(answer) if !answer.is_empty() => answer.text,
        Ok(_) => draft.answer.clone(),
        Err(e) => {
            tracing::warn!(question = %draft.text, error = %e, "Falha ao responder, usando template");
            draft.answer.clone()
        }
    }
}

/// Verbos que pedem partícula: `lead` → `lead to`.
fn verb_phrase(verb: &str) -> String {
    match verb {
        "lead" => "lead to".to_string(),
        "result" => "result in".to_string(),
        "consist" => "consist of".to_string(),
        _ => verb.to_string(),
    }
}

fn verb_phrase_third_person(verb: &str) -> String {
    let conjugated = lexicon::third_person(verb);
    match verb {
        "lead" => format!("{conjugated} to"),
        "result" => format!("{conjugated} in"),
        "consist" => format!("{conjugated} of"),
        _ => conjugated,
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Limpa um label para uso em pergunta; `None` se não serve.
///
/// Rejeita: menos de 2 ou mais de 60 caracteres, só símbolos, só dígitos,
/// e fragmentos como `2s` ou `v 2`.
pub fn clean_concept(label: &str) -> Option<String> {
    let collapsed = label.split_whitespace().collect::<Vec<_>>().join(" ");
    let c = collapsed
        .trim_matches(|ch: char| ".,;:!?-\"'()[]{}".contains(ch))
        .to_string();
    let len = c.chars().count();
    if !(2..=60).contains(&len) {
        return None;
    }
    if !c.chars().any(|ch| ch.is_ascii_alphanumeric()) {
        return None;
    }
    if c.chars().all(|ch| ch.is_ascii_digit() || ch == ' ') {
        return None;
    }
    if is_letters_digits_fragment(&c) {
        return None;
    }
    Some(c)
}

/// `[a-zA-Z]* ?[0-9]+[a-zA-Z]*`
fn is_letters_digits_fragment(c: &str) -> bool {
    let bytes = c.as_bytes();
    let mut i = 0;
    while i < bytes.len() && bytes[i].is_ascii_alphabetic() {
        i += 1;
    }
    if i < bytes.len() && bytes[i] == b' ' {
        i += 1;
    }
    let digits_start = i;
    while i < bytes.len() && bytes[i].is_ascii_digit() {
        i += 1;
    }
    if i == digits_start {
        return false;
    }
    while i < bytes.len() && bytes[i].is_ascii_alphabetic() {
        i += 1;
    }
    i == bytes.len()
}

/// Mesmo conceito dos dois lados, ignorando caixa e espaços.
pub fn is_tautology(source: &str, target: &str) -> bool {
    let s = source.trim().to_lowercase();
    let t = target.trim().to_lowercase();
    s == t || s.replace(' ', "") == t.replace(' ', "")
}

/// Pergunta curta demais ou terminada em preposição.
pub fn is_incomplete_question(question: &str, min_words: usize) -> bool {
    let words: Vec<String> = question
        .split_whitespace()
        .map(|w| {
            w.trim_matches(|c: char| !c.is_alphanumeric())
                .to_lowercase()
        })
        .collect();
    if words.len() < min_words {
        return true;
    }
    words
        .last()
        .is_some_and(|last| lexicon::TRAILING_PREPOSITIONS.contains(&last.as_str()))
}

// ─── Exportação ─────────────────────────────────────────────────

/// Lista numerada, uma pergunta por linha.
pub fn to_numbered_text(questions: &[Question]) -> String {
    questions
        .iter()
        .enumerate()
        .map(|(i, q)| format!("{}. {}\n", i + 1, q.text))
        .collect()
}

/// CSV com cabeçalho `Question,Answer,Source,Verb,Target`.
pub fn to_csv(questions: &[Question]) -> String {
    let mut out = String::from("Question,Answer,Source,Verb,Target\r\n");
    for q in questions {
        let row = [
            q.text.as_str(),
            q.expected_answer.as_deref().unwrap_or(""),
            q.source.as_str(),
            q.verb.as_deref().unwrap_or(""),
            q.target_label.as_deref().unwrap_or(""),
        ];
        let fields: Vec<String> = row.iter().map(|f| csv_field(f)).collect();
        out.push_str(&fields.join(","));
        out.push_str("\r\n");
    }
    out
}

fn csv_field(value: &str) -> String {
    if value.contains(|c: char| matches!(c, ',' | '"' | '\n' | '\r')) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Answer, QuestionSet};
    use crate::error::Result;

    fn sample_map() -> ConceptMap {
        let mut map = ConceptMap::new();
        let doc = "d".repeat(64);
        let s = "Photosynthesis converts light into chemical energy.";
        let p = map.add_mention("photosynthesis", &doc, s);
        let l = map.add_mention("light", &doc, s);
        let c = map.add_mention("chemical energy", &doc, s);
        map.observe_edge(p, l, EdgeKind::CoOccurrence, Some(s)).unwrap();
        map.observe_edge(p, c, EdgeKind::CoOccurrence, Some(s)).unwrap();
        map.observe_edge(l, c, EdgeKind::CoOccurrence, Some(s)).unwrap();
        map.observe_edge(p, l, EdgeKind::relation("convert"), Some(s)).unwrap();
        map.sort_edges();
        map
    }

    struct FixedModel(&'static str);

    impl AnswerModel for FixedModel {
        fn name(&self) -> &str {
            "fixed"
        }

        fn answer(&self, _question: &str, _context: &str) -> Result<Answer> {
            Ok(Answer {
                text: self.0.to_string(),
                confidence: 1.0,
                span: None,
                model: "fixed".into(),
            })
        }
    }

    #[test]
    fn test_every_question_targets_the_map() {
        let config = QuestionConfig::default();
        let map = sample_map();
        let questions = QuestionGenerator::new(&config).generate(&map, None);
        assert!(!questions.is_empty());
        let set = QuestionSet::new("concept_map.json", questions);
        assert!(set.validate_against(&map).is_ok());
    }

    #[test]
    fn test_definitions_and_relations_present() {
        let config = QuestionConfig::default();
        let questions = QuestionGenerator::new(&config).generate(&sample_map(), None);
        let texts: Vec<&str> = questions.iter().map(|q| q.text.as_str()).collect();

        assert_eq!(texts[0], "What is photosynthesis?");
        assert!(texts.contains(&"What is the relationship between photosynthesis and light?"));
        assert!(texts.contains(&"Who or what converts light?"));
        assert!(texts.contains(&"How does light relate to chemical energy?"));
        // "What does photosynthesis convert?" tem só 4 palavras
        assert!(!texts.contains(&"What does photosynthesis convert?"));

        let who = questions
            .iter()
            .find(|q| q.text == "Who or what converts light?")
            .unwrap();
        assert_eq!(who.expected_answer.as_deref(), Some("photosynthesis"));
        assert_eq!(who.verb.as_deref(), Some("convert"));
        assert_eq!(who.target_label.as_deref(), Some("light"));
        assert_eq!(who.kind, QuestionKind::Dependency);
    }

    #[test]
    fn test_ids_are_sequential_and_cap_respected() {
        let config = QuestionConfig {
            max_questions: Some(3),
            ..Default::default()
        };
        let questions = QuestionGenerator::new(&config).generate(&sample_map(), None);
        let ids: Vec<&str> = questions.iter().map(|q| q.id.as_str()).collect();
        assert_eq!(ids, vec!["q0001", "q0002", "q0003"]);
    }

    #[test]
    fn test_generation_is_deterministic() {
        let config = QuestionConfig::default();
        let a = QuestionGenerator::new(&config).generate(&sample_map(), None);
        let b = QuestionGenerator::new(&config).generate(&sample_map(), None);
        assert_eq!(a, b);
    }

    #[test]
    fn test_model_answer_replaces_template() {
        let config = QuestionConfig {
            include_definitions: false,
            include_cooccurrence: false,
            ..Default::default()
        };
        let model = FixedModel("plants");
        let questions = QuestionGenerator::new(&config).generate(&sample_map(), Some(&model));
        assert!(questions
            .iter()
            .all(|q| q.expected_answer.as_deref() == Some("plants")));

        let empty = FixedModel("");
        let questions = QuestionGenerator::new(&config).generate(&sample_map(), Some(&empty));
        assert!(questions
            .iter()
            .all(|q| q.expected_answer.as_deref() != Some("")));
    }

    #[test]
    fn test_causal_family_uses_particles() {
        let mut map = ConceptMap::new();
        let doc = "d".repeat(64);
        let h = map.add_mention("heat", &doc, "s");
        let e = map.add_mention("thermal expansion", &doc, "s");
        map.observe_edge(h, e, EdgeKind::relation("lead"), None).unwrap();

        let config = QuestionConfig::default();
        let drafts = QuestionGenerator::new(&config).for_relation(&map, &map.edges[0]);
        let texts: Vec<&str> = drafts.iter().map(|d| d.text.as_str()).collect();
        assert!(texts.contains(&"Why does heat lead to thermal expansion?"));
        assert!(texts.contains(&"Who or what leads to thermal expansion?"));
        assert_eq!(drafts[0].answer, "Because heat leads to thermal expansion.");
    }

    #[test]
    fn test_blacklisted_and_generic_edges_skipped() {
        let mut map = ConceptMap::new();
        let doc = "d".repeat(64);
        let a = map.add_mention("newton", &doc, "s");
        let b = map.add_mention("motion", &doc, "s");
        let t = map.add_mention("thing", &doc, "s");
        map.observe_edge(a, b, EdgeKind::relation("law"), None).unwrap();
        map.observe_edge(a, t, EdgeKind::relation("describe"), None).unwrap();

        let config = QuestionConfig::default();
        let generator = QuestionGenerator::new(&config);
        assert!(generator.for_relation(&map, &map.edges[0]).is_empty());
        assert!(generator.for_relation(&map, &map.edges[1]).is_empty());
    }

    // ─── filtros ───────────────────────────────────────────────

    #[test]
    fn test_clean_concept_rules() {
        assert_eq!(clean_concept("  cell   wall. "), Some("cell wall".into()));
        assert_eq!(clean_concept("x"), None);
        assert_eq!(clean_concept("!!!"), None);
        assert_eq!(clean_concept("12 34"), None);
        assert_eq!(clean_concept("2s"), None);
        assert_eq!(clean_concept("v 2"), None);
        assert_eq!(clean_concept("h2o"), None);
        assert_eq!(clean_concept(&"a".repeat(61)), None);
    }

    #[test]
    fn test_tautology_and_incomplete() {
        assert!(is_tautology("Data Base", "database"));
        assert!(!is_tautology("data", "database"));
        assert!(is_incomplete_question("What is it?", 5));
        assert!(is_incomplete_question("What does light travel into?", 5));
        assert!(!is_incomplete_question("Who or what converts light?", 5));
    }

    // ─── exportação ────────────────────────────────────────────

    #[test]
    fn test_csv_and_text_exports() {
        let config = QuestionConfig::default();
        let questions = QuestionGenerator::new(&config).generate(&sample_map(), None);
        let text = to_numbered_text(&questions);
        assert!(text.starts_with("1. What is photosynthesis?\n"));

        let csv = to_csv(&questions);
        let mut lines = csv.lines();
        assert_eq!(lines.next(), Some("Question,Answer,Source,Verb,Target"));
        assert_eq!(csv.lines().count(), questions.len() + 1);
        assert_eq!(csv_field("a, \"b\""), "\"a, \"\"b\"\"\"");
    }
}
