//! # Extrator de Conceitos: Heurísticas Linguísticas para o Inglês Didático
//!
//! O [`ConceptExtractor`] transforma os documentos aceitos em um
//! [`ConceptMap`]. Não há parser de dependências: a análise é feita sobre
//! tokens etiquetados por léxico.
//!
//! ## Etiquetagem
//!
//! | Classe | Regra | Exemplo |
//! |--------|-------|---------|
//! | `Number` | só dígitos | `1998` |
//! | `Stopword` | [`lexicon::STOPWORDS`] ou palavra interrogativa | `the`, `into` |
//! | `Verb` | lema em [`lexicon::COMMON_VERBS`], sem determinante antes | `converts` |
//! | `Content` | o resto | `photosynthesis`, `chemical` |
//!
//! Correções pelo contexto, depois da etiqueta do léxico:
//!
//! | Situação | Resultado | Exemplo |
//! |----------|-----------|---------|
//! | verbo do léxico após adjetivo ou verbo, antes de conteúdo | `Content` | `solar power plants` |
//! | verbo do léxico no início, antes de conteúdo, com outro verbo adiante | `Content` | `Heat energy flows` |
//! | frase sem verbo: `-s`/`-ed` entre dois trechos de conteúdo | `Verb` | `energy flows from` |
//!
//! ## Estratégia de Extração
//!
//! ```text
//! "Photosynthesis converts light into chemical energy."
//!   Content  Verb  Content Stop Content Content
//!   └──┬──┘        └─┬─┘        └──────┬──────┘
//!   conceito     conceito           conceito
//!        └─[convert]─►┘
//! ```
//!
//! 1. **Conceitos**: sequências máximas de palavras de conteúdo, no máximo
//!    `max_phrase_words` (fica a cauda, onde está o núcleo do sintagma)
//! 2. **Co-ocorrência**: todo par de conceitos distintos da mesma frase
//! 3. **Relação**: `<conceito> <verbo> [partículas] <conceito>`, sem vírgula
//!    entre eles, sem negação, com verbo fora de [`lexicon::GENERIC_VERBS`].
//!    Voz passiva com `by` inverte a direção.
//!
//! ## Filtros de Qualidade
//!
//! - **Stop phrases**: `chapter`, `figure`, `table`, ... (palavra inteira, com plural)
//! - **Palavras interrogativas**: nunca são conceito
//! - **Comprimento mínimo**: conceito de uma palavra precisa de `min_concept_chars`
//! - **Números e fragmentos**: `1998`, `2s`, `v 2`
//! - **Genéricos**: `thing`, `something`, `it`, ...

use std::collections::HashSet;

use regex::Regex;

use super::lexicon;
use super::text::{self, TextCleaner, Token};
use crate::config::ExtractorConfig;
use crate::core::{ConceptId, ConceptMap, CurriculumDocument, DocumentId, EdgeKind};
use crate::error::Result;

/// Rótulo máximo aceito para um conceito, em caracteres.
const MAX_CONCEPT_CHARS: usize = 60;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TokenClass {
    Stopword,
    Verb,
    Number,
    Content,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TaggedToken {
    pub token: Token,
    pub class: TokenClass,
}

/// Conceito candidato: tokens `first..=last` da frase.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Phrase {
    pub label: String,
    pub first: usize,
    pub last: usize,
}

pub struct ConceptExtractor {
    config: ExtractorConfig,
    cleaner: TextCleaner,
    stop_phrases: Vec<String>,
    /// `2s`, `v 2`, `h2o`: letras coladas em números.
    fragment: Regex,
}

impl ConceptExtractor {
    pub fn new(config: ExtractorConfig) -> Self {
        let mut stop_phrases: Vec<String> =
            lexicon::STOP_PHRASES.iter().map(|s| s.to_string()).collect();
        stop_phrases.extend(config.extra_stop_phrases.iter().map(|s| s.trim().to_lowercase()));
        stop_phrases.retain(|s| !s.is_empty());

        Self {
            config,
            cleaner: TextCleaner::new(),
            stop_phrases,
            fragment: Regex::new(r"^[a-z]* ?[0-9]+[a-z]*$").expect("regex de fragmento válida"),
        }
    }

    /// Extrai o mapa de todos os documentos, em ordem crescente de id.
    ///
    /// Mesma entrada, mesmo mapa: não há aleatoriedade, nós ficam em ordem
    /// de primeira menção e arestas em ordem de posição dos nós.
    pub fn extract(&self, documents: &[CurriculumDocument]) -> Result<ConceptMap> {
        let mut ordered: Vec<&CurriculumDocument> = documents.iter().collect();
        ordered.sort_by(|a, b| a.id.cmp(&b.id));
        ordered.dedup_by(|a, b| a.id == b.id);

        let mut map = ConceptMap::new();
        for doc in &ordered {
            self.extract_document(&mut map, doc)?;
        }

        let pruned = map.prune(self.config.min_frequency);
        map.sort_edges();

        tracing::info!(
            documents = ordered.len(),
            concepts = map.node_count(),
            edges = map.edge_count(),
            pruned,
            "Extração concluída"
        );
        Ok(map)
    }

    pub fn extract_document(&self, map: &mut ConceptMap, doc: &CurriculumDocument) -> Result<()> {
        let cleaned = self.cleaner.clean(&doc.text);
        let mut sentences = 0usize;
        for sentence in text::split_sentences(&cleaned) {
            self.extract_sentence(map, &doc.id, sentence.text)?;
            sentences += 1;
        }
        tracing::debug!(document = %doc.id, sentences, "Documento processado");
        Ok(())
    }

    fn extract_sentence(&self, map: &mut ConceptMap, doc_id: &DocumentId, sentence: &str) -> Result<()> {
        let tagged = self.tag(sentence);
        let phrases = self.candidate_phrases(&tagged);
        if phrases.is_empty() {
            return Ok(());
        }

        let ids: Vec<ConceptId> = phrases
            .iter()
            .map(|p| map.add_mention(&p.label, doc_id, sentence))
            .collect();

        // Co-ocorrência: uma observação por par e por frase
        let mut unique: Vec<ConceptId> = Vec::with_capacity(ids.len());
        for id in &ids {
            if !unique.contains(id) {
                unique.push(*id);
            }
        }
        for (i, a) in unique.iter().enumerate() {
            for b in &unique[i + 1..] {
                map.observe_edge(*a, *b, EdgeKind::CoOccurrence, Some(sentence))?;
            }
        }

        // Relações sujeito-verbo-objeto entre conceitos vizinhos
        let mut seen = HashSet::new();
        for k in 0..phrases.len().saturating_sub(1) {
            let (left, right) = (&phrases[k], &phrases[k + 1]);
            let Some((verb, passive)) = self.relation_verb(sentence, &tagged, left, right) else {
                continue;
            };
            let (source, target) = if passive {
                (ids[k + 1], ids[k])
            } else {
                (ids[k], ids[k + 1])
            };
            if source == target || !seen.insert((source, target, verb.clone())) {
                continue;
            }
            map.observe_edge(source, target, EdgeKind::relation(verb), Some(sentence))?;
        }
        Ok(())
    }

    /// Etiqueta cada token da frase.
    ///
    /// Primeiro por léxico, depois corrigido pelo contexto:
    /// `demote_nominal_verbs` e `open_class_verb`.
    pub fn tag(&self, sentence: &str) -> Vec<TaggedToken> {
        let tokens = text::tokenize(sentence);
        let mut tagged: Vec<TaggedToken> = Vec::with_capacity(tokens.len());
        for token in tokens {
            let word = token.lower.as_str();
            let after_determiner = tagged
                .last()
                .is_some_and(|prev| lexicon::is_determiner(&prev.token.lower));
            let class = if text::is_number(word) {
                TokenClass::Number
            } else if lexicon::is_stopword(word) || lexicon::is_question_word(word) {
                TokenClass::Stopword
            } else if !after_determiner && lexicon::is_verb_form(word) {
                TokenClass::Verb
            } else {
                TokenClass::Content
            };
            tagged.push(TaggedToken { token, class });
        }

        demote_nominal_verbs(&mut tagged);
        if !tagged.iter().any(|t| t.class == TokenClass::Verb) {
            if let Some(i) = open_class_verb(&tagged) {
                tagged[i].class = TokenClass::Verb;
            }
        }
        tagged
    }

    /// Sequências máximas de conteúdo que passam em [`is_valid_concept`](Self::is_valid_concept).
    pub fn candidate_phrases(&self, tagged: &[TaggedToken]) -> Vec<Phrase> {
        let mut phrases = Vec::new();
        let mut i = 0;
        while i < tagged.len() {
            if tagged[i].class != TokenClass::Content {
                i += 1;
                continue;
            }
            let run_start = i;
            while i < tagged.len() && tagged[i].class == TokenClass::Content {
                i += 1;
            }
            let last = i - 1;
            let first = run_start.max((last + 1).saturating_sub(self.config.max_phrase_words));
            let label = tagged[first..=last]
                .iter()
                .map(|t| t.token.lower.as_str())
                .collect::<Vec<_>>()
                .join(" ");
            if self.is_valid_concept(&label) {
                phrases.push(Phrase { label, first, last });
            } else {
                tracing::trace!(label = %label, "Candidato descartado");
            }
        }
        phrases
    }

    pub fn is_valid_concept(&self, label: &str) -> bool {
        let label = label.trim().to_lowercase();
        if label.is_empty() || label.chars().count() > MAX_CONCEPT_CHARS {
            return false;
        }
        let words: Vec<&str> = label.split_whitespace().collect();
        if words.len() == 1 && label.chars().count() < self.config.min_concept_chars {
            return false;
        }
        if lexicon::is_question_word(&label) || lexicon::is_generic_concept(&label) {
            return false;
        }
        if text::is_number(&label) || self.fragment.is_match(&label) {
            return false;
        }
        if !label.chars().any(char::is_alphabetic) {
            return false;
        }
        !self.contains_stop_phrase(&label, &words)
    }

    fn contains_stop_phrase(&self, label: &str, words: &[&str]) -> bool {
        let padded = format!(" {label} ");
        self.stop_phrases.iter().any(|phrase| {
            if phrase.contains(' ') {
                padded.contains(&format!(" {phrase} "))
            } else {
                words
                    .iter()
                    .any(|w| *w == phrase || w.strip_suffix('s') == Some(phrase.as_str()))
            }
        })
    }

    /// Verbo que liga dois conceitos vizinhos, e se a construção é passiva.
    ///
    /// O trecho entre eles só pode ter stopwords e verbos, precisa ter ao
    /// menos um verbo e não pode ter vírgula, dois-pontos ou negação.
    fn relation_verb(
        &self,
        sentence: &str,
        tagged: &[TaggedToken],
        left: &Phrase,
        right: &Phrase,
    ) -> Option<(String, bool)> {
        let gap = &tagged[left.last + 1..right.first];
        if gap.is_empty() {
            return None;
        }
        let between = &sentence[tagged[left.last].token.end..tagged[right.first].token.start];
        if between.contains(|c: char| matches!(c, ',' | ':' | ';')) {
            return None;
        }
        if gap
            .iter()
            .any(|t| matches!(t.class, TokenClass::Number | TokenClass::Content))
        {
            return None;
        }
        if gap
            .iter()
            .any(|t| matches!(t.token.lower.as_str(), "not" | "no" | "never" | "and" | "or" | "but" | "which" | "that"))
        {
            return None;
        }

        let verb_pos = gap.iter().rposition(|t| t.class == TokenClass::Verb)?;
        let raw = gap[verb_pos].token.lower.as_str();
        let lemma = lexicon::lemmatize(raw);
        if lexicon::is_generic_verb(raw)
            || lexicon::is_generic_verb(&lemma)
            || lexicon::is_blacklisted_verb(&lemma)
        {
            return None;
        }
        let passive = gap[verb_pos + 1..].iter().any(|t| t.token.lower == "by");
        Some((lemma, passive))
    }
}

// ─── Correções de etiqueta ──────────────────────────────────────

/// Verbo do léxico usado como substantivo, seguido direto de conteúdo:
///
/// - depois de um adjetivo (`solar power plants`)
/// - depois de outro verbo (`release heat energy`)
/// - no início da frase, quando há outro verbo adiante (`Heat energy flows`)
fn demote_nominal_verbs(tagged: &mut [TaggedToken]) {
    for i in 0..tagged.len() {
        if tagged[i].class != TokenClass::Verb {
            continue;
        }
        if tagged.get(i + 1).map(|t| t.class) != Some(TokenClass::Content) {
            continue;
        }
        let nominal = match i.checked_sub(1).map(|p| &tagged[p]) {
            Some(prev) => match prev.class {
                TokenClass::Content => lexicon::is_adjective_like(&prev.token.lower),
                TokenClass::Verb => true,
                _ => false,
            },
            None => {
                tagged[i + 2..].iter().any(|t| t.class == TokenClass::Verb)
                    || open_class_verb(tagged).is_some_and(|v| v > i + 1)
            }
        };
        if nominal {
            tagged[i].class = TokenClass::Content;
        }
    }
}

/// Primeira forma em `-s`/`-ed` fora do léxico entre dois trechos de
/// conteúdo (só stopwords até o segundo): `energy flows from hot objects`.
fn open_class_verb(tagged: &[TaggedToken]) -> Option<usize> {
    (1..tagged.len()).find(|&i| {
        tagged[i].class == TokenClass::Content
            && tagged[i - 1].class == TokenClass::Content
            && lexicon::looks_inflected(&tagged[i].token.lower)
            && tagged[i + 1..]
                .iter()
                .find(|t| t.class != TokenClass::Stopword)
                .is_some_and(|t| t.class == TokenClass::Content)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{SourceInfo, SourceKind};

    fn extractor() -> ConceptExtractor {
        ConceptExtractor::new(ExtractorConfig::default())
    }

    fn doc(text: &str) -> CurriculumDocument {
        CurriculumDocument::new(
            SourceInfo {
                origin: "test".into(),
                kind: SourceKind::Text,
            },
            "science",
            text,
        )
    }

    fn labels(map: &ConceptMap) -> Vec<&str> {
        map.nodes.iter().map(|n| n.label.as_str()).collect()
    }

    // ─── etiquetagem e candidatos ──────────────────────────────

    #[test]
    fn test_tags_photosynthesis_sentence() {
        let tagged = extractor().tag("Photosynthesis converts light into chemical energy.");
        let classes: Vec<_> = tagged.iter().map(|t| t.class).collect();
        assert_eq!(
            classes,
            vec![
                TokenClass::Content,
                TokenClass::Verb,
                TokenClass::Content,
                TokenClass::Stopword,
                TokenClass::Content,
                TokenClass::Content,
            ]
        );
    }

    #[test]
    fn test_verb_after_determiner_is_noun() {
        let tagged = extractor().tag("The result surprised everyone");
        assert_eq!(tagged[1].class, TokenClass::Content);
    }

    #[test]
    fn test_long_runs_keep_the_tail() {
        let ex = extractor();
        let tagged = ex.tag("large green leafy tropical rainforest canopy");
        let phrases = ex.candidate_phrases(&tagged);
        assert_eq!(phrases.len(), 1);
        assert_eq!(phrases[0].label, "leafy tropical rainforest canopy");
    }

    // ─── filtros ───────────────────────────────────────────────

    #[test]
    fn test_rejects_stop_phrases_numbers_and_short_words() {
        let ex = extractor();
        assert!(!ex.is_valid_concept("chapter"));
        assert!(!ex.is_valid_concept("figures"));
        assert!(!ex.is_valid_concept("1998"));
        assert!(!ex.is_valid_concept("2s"));
        assert!(!ex.is_valid_concept("cat"));
        assert!(!ex.is_valid_concept("what"));
        assert!(!ex.is_valid_concept("something"));
        assert!(ex.is_valid_concept("community"));
        assert!(ex.is_valid_concept("cell wall"));
        assert!(ex.is_valid_concept("light"));
    }

    #[test]
    fn test_extra_stop_phrases_from_config() {
        let config = ExtractorConfig {
            extra_stop_phrases: vec!["learning objective".into()],
            ..Default::default()
        };
        let ex = ConceptExtractor::new(config);
        assert!(!ex.is_valid_concept("main learning objective"));
        assert!(ex.is_valid_concept("learning curve"));
    }

    // ─── mapa ──────────────────────────────────────────────────

    #[test]
    fn test_photosynthesis_map() {
        let map = extractor()
            .extract(&[doc("Photosynthesis converts light into chemical energy.")])
            .unwrap();
        assert_eq!(labels(&map), vec!["photosynthesis", "light", "chemical energy"]);

        let p = map.node_by_label("photosynthesis").unwrap().id;
        let l = map.node_by_label("light").unwrap().id;
        let relation = map
            .edges
            .iter()
            .find(|e| e.relation == EdgeKind::relation("convert"))
            .expect("relação convert");
        assert_eq!((relation.source, relation.target), (p, l));

        let co = map
            .edges
            .iter()
            .filter(|e| e.relation == EdgeKind::CoOccurrence)
            .count();
        assert_eq!(co, 3);
        assert!(map.validate().is_ok());
    }

    #[test]
    fn test_passive_voice_reverses_relation() {
        let map = extractor()
            .extract(&[doc("Sunlight is absorbed by chlorophyll.")])
            .unwrap();
        let edge = map
            .edges
            .iter()
            .find(|e| e.relation == EdgeKind::relation("absorb"))
            .expect("relação absorb");
        assert_eq!(map.node(edge.source).unwrap().label, "chlorophyll");
        assert_eq!(map.node(edge.target).unwrap().label, "sunlight");
    }

    #[test]
    fn test_generic_and_negated_verbs_make_no_relation() {
        let map = extractor()
            .extract(&[doc("Mitochondria contain ribosomes. Viruses do not produce energy.")])
            .unwrap();
        assert!(map.edges.iter().all(|e| e.relation == EdgeKind::CoOccurrence));
    }

    #[test]
    fn test_frequency_pruning_drops_rare_concepts() {
        let config = ExtractorConfig {
            min_frequency: 2,
            ..Default::default()
        };
        let map = ConceptExtractor::new(config)
            .extract(&[
                doc("Enzymes increase reaction rates."),
                doc("Enzymes reduce activation energy."),
            ])
            .unwrap();
        assert_eq!(labels(&map), vec!["enzymes"]);
        assert_eq!(map.edge_count(), 0);
    }

    #[test]
    fn test_repeated_sentences_raise_weight() {
        let map = extractor()
            .extract(&[doc("Plants absorb water. Plants absorb water from soil.")])
            .unwrap();
        let edge = map
            .edges
            .iter()
            .find(|e| e.relation == EdgeKind::relation("absorb"))
            .unwrap();
        assert_eq!(edge.count, 2);
        assert!(edge.weight > 0.5);
    }

    #[test]
    fn test_extraction_is_deterministic() {
        let docs = vec![
            doc("Newton's first law describes inertia. Inertia resists changes in motion."),
            doc("Exothermic reactions release heat energy to the surroundings."),
        ];
        let mut reversed = docs.clone();
        reversed.reverse();
        let a = serde_json::to_string_pretty(&extractor().extract(&docs).unwrap()).unwrap();
        let b = serde_json::to_string_pretty(&extractor().extract(&reversed).unwrap()).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_unlisted_inflection_becomes_the_verb() {
        let map = extractor()
            .extract(&[doc("Heat energy flows from hot objects to cold objects.")])
            .unwrap();
        assert_eq!(labels(&map), vec!["heat energy", "hot objects", "cold objects"]);
        let edge = map
            .edges
            .iter()
            .find(|e| e.relation == EdgeKind::relation("flow"))
            .expect("relação flow");
        assert_eq!(map.node(edge.source).unwrap().label, "heat energy");
        assert_eq!(map.node(edge.target).unwrap().label, "hot objects");
    }

    #[test]
    fn test_listed_verb_after_adjective_is_a_noun() {
        let map = extractor()
            .extract(&[doc("Solar power plants convert sunlight into electricity.")])
            .unwrap();
        assert_eq!(labels(&map), vec!["solar power plants", "sunlight", "electricity"]);
        assert!(map.edges.iter().all(|e| e.relation != EdgeKind::relation("power")));
        let edge = map
            .edges
            .iter()
            .find(|e| e.relation == EdgeKind::relation("convert"))
            .expect("relação convert");
        assert_eq!(map.node(edge.source).unwrap().label, "solar power plants");
    }

    #[test]
    fn test_short_clause_splits_into_subject_and_object() {
        let map = extractor().extract(&[doc("Plants need water.")]).unwrap();
        assert_eq!(labels(&map), vec!["plants", "water"]);
        assert!(map.edges.iter().any(|e| e.relation == EdgeKind::relation("need")));
    }

    #[test]
    fn test_verb_after_verb_is_a_noun() {
        let tagged = extractor().tag("Reactions release heat energy");
        let classes: Vec<_> = tagged.iter().map(|t| t.class).collect();
        assert_eq!(
            classes,
            vec![TokenClass::Content, TokenClass::Verb, TokenClass::Content, TokenClass::Content]
        );
    }

    #[test]
    fn test_imperative_without_second_verb_stays_a_verb() {
        let tagged = extractor().tag("Understand photosynthesis");
        assert_eq!(tagged[0].class, TokenClass::Verb);
    }

    #[test]
    fn test_empty_input_gives_empty_map() {
        let map = extractor().extract(&[]).unwrap();
        assert!(map.is_empty());
    }
}
