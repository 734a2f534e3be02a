//! # Leitor Léxico
//!
//! Modelo de QA sem pesos, sempre disponível:
//!
//! ```text
//! pergunta ──► lemas de conteúdo {photosynthesis, convert, light}
//! contexto ──► frases ──► frase com maior sobreposição de lemas
//!                           └─► tokens cobertos pela pergunta são marcados
//!                               └─► maior trecho não coberto = resposta
//! ```
//!
//! Perguntas de sujeito ("Who or what converts light?") preferem o trecho
//! antes do primeiro token coberto.

use std::collections::HashSet;

use crate::core::Answer;
use crate::error::Result;
use crate::nlu::lexicon;
use crate::nlu::text::{split_sentences, tokenize, Token};

use super::AnswerModel;

const MODEL_NAME: &str = "lexical";

#[derive(Clone, Debug, Default)]
pub struct LexicalReader;

impl LexicalReader {
    pub fn new() -> Self {
        Self
    }
}

/// Trecho candidato dentro de uma frase (índices de token, fim exclusivo).
struct Run {
    first: usize,
    end: usize,
    content: usize,
}

fn stem(word: &str) -> String {
    lexicon::lemmatize(word)
}

fn is_content(word: &str) -> bool {
    !lexicon::is_stopword(word) && !lexicon::is_question_word(word)
}

/// "Who or what converts X?": o primeiro token depois das palavras
/// interrogativas é um verbo lexical.
fn is_subject_question(tokens: &[Token]) -> bool {
    let mut rest = tokens
        .iter()
        .skip_while(|t| lexicon::is_question_word(&t.lower) || t.lower == "or");
    tokens.first().is_some_and(|t| lexicon::is_question_word(&t.lower))
        && rest
            .next()
            .is_some_and(|t| !lexicon::is_stopword(&t.lower) && lexicon::is_verb_form(&t.lower))
}

impl AnswerModel for LexicalReader {
    fn name(&self) -> &str {
        MODEL_NAME
    }

    fn answer(&self, question: &str, context: &str) -> Result<Answer> {
        let q_tokens = tokenize(question);
        let q_stems: HashSet<String> = q_tokens
            .iter()
            .filter(|t| is_content(&t.lower))
            .map(|t| stem(&t.lower))
            .collect();
        if q_stems.is_empty() {
            return Ok(Answer::none(MODEL_NAME));
        }

        // Frase com mais lemas da pergunta; empate fica com a primeira.
        let mut best: Option<(usize, usize, Vec<Token>)> = None;
        for sentence in split_sentences(context) {
            let tokens = tokenize(sentence.text);
            let stems: HashSet<String> = tokens.iter().map(|t| stem(&t.lower)).collect();
            let overlap = q_stems.intersection(&stems).count();
            if overlap > 0 && best.as_ref().map_or(true, |(o, _, _)| overlap > *o) {
                best = Some((overlap, sentence.start, tokens));
            }
        }
        let Some((overlap, offset, tokens)) = best else {
            return Ok(Answer::none(MODEL_NAME));
        };

        let covered: Vec<bool> = tokens.iter().map(|t| q_stems.contains(&stem(&t.lower))).collect();
        let runs = uncovered_runs(&tokens, &covered);
        let subject = is_subject_question(&q_tokens);
        let first_covered = covered.iter().position(|&c| c).unwrap_or(0);

        let chosen = if subject {
            runs.iter().find(|r| r.end <= first_covered).or_else(|| best_run(&runs))
        } else {
            best_run(&runs)
        };
        let Some(run) = chosen else {
            return Ok(Answer::none(MODEL_NAME));
        };

        let start = offset + tokens[run.first].start;
        let end = offset + tokens[run.end - 1].end;
        let confidence = overlap as f32 / q_stems.len() as f32;
        tracing::debug!(overlap, confidence, subject, "Trecho léxico escolhido");

        Ok(Answer {
            text: context[start..end].to_string(),
            confidence: confidence.clamp(0.0, 1.0),
            span: Some((start, end)),
            model: MODEL_NAME.to_string(),
        })
    }
}

/// Sequências maximais de tokens não cobertos, sem stopwords nas pontas.
fn uncovered_runs(tokens: &[Token], covered: &[bool]) -> Vec<Run> {
    let mut runs = Vec::new();
    let mut i = 0;
    while i < tokens.len() {
        if covered[i] {
            i += 1;
            continue;
        }
        let mut j = i;
        while j < tokens.len() && !covered[j] {
            j += 1;
        }
        let mut first = i;
        let mut end = j;
        while first < end && !is_content(&tokens[first].lower) {
            first += 1;
        }
        while end > first && !is_content(&tokens[end - 1].lower) {
            end -= 1;
        }
        if first < end {
            let content = tokens[first..end].iter().filter(|t| is_content(&t.lower)).count();
            runs.push(Run { first, end, content });
        }
        i = j;
    }
    runs
}

/// Trecho com mais tokens de conteúdo; empate fica com o primeiro.
fn best_run(runs: &[Run]) -> Option<&Run> {
    runs.iter().fold(None, |best: Option<&Run>, r| match best {
        Some(b) if b.content >= r.content => Some(b),
        _ => Some(r),
    })
}
