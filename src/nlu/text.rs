//! # Pré-processamento de Texto
//!
//! Limpeza, divisão em frases e tokenização. Todas as funções preservam
//! offsets em bytes no texto de entrada, para que o QA possa devolver o
//! trecho exato do contexto.

use regex::Regex;
use unicode_normalization::UnicodeNormalization;

/// Limpeza do texto bruto antes da extração.
///
/// 1. NFC
/// 2. remove linhas que são só número de página
/// 3. colapsa linhas em branco
/// 4. troca caracteres fora de `\w \s . , ; : ? ! - '` por espaço
pub struct TextCleaner {
    page_number: Regex,
    blank_lines: Regex,
    special_chars: Regex,
    hyphen_break: Regex,
}

impl Default for TextCleaner {
    fn default() -> Self {
        Self::new()
    }
}

impl TextCleaner {
    pub fn new() -> Self {
        Self {
            page_number: Regex::new(r"\n\s*\d+\s*\n").expect("regex de página válida"),
            blank_lines: Regex::new(r"\n\s*\n").expect("regex de linhas válida"),
            special_chars: Regex::new(r"[^\w\s.,;:?!'-]").expect("regex de caracteres válida"),
            hyphen_break: Regex::new(r"(\w)-\n\s*(\w)").expect("regex de hifenização válida"),
        }
    }

    pub fn clean(&self, text: &str) -> String {
        let text: String = text.nfc().collect();
        let text = text.replace("\r\n", "\n").replace(|c: char| c == '\u{2019}' || c == '\u{2018}', "'");
        let text = self.hyphen_break.replace_all(&text, "$1$2");
        let text = self.page_number.replace_all(&text, "\n");
        let text = self.blank_lines.replace_all(&text, "\n");
        let text = self.special_chars.replace_all(&text, " ");
        text.trim().to_string()
    }
}

/// Frase com offset em bytes no texto de origem.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Sentence<'a> {
    pub start: usize,
    pub text: &'a str,
}

/// Divide em frases nos limites `.`, `?`, `!`, `;` seguidos de espaço ou fim.
///
/// Quebras de linha também separam frases (títulos e listas raramente têm
/// pontuação). Pontos entre dígitos (`3.14`) não quebram.
pub fn split_sentences(text: &str) -> Vec<Sentence<'_>> {
    let mut sentences = Vec::new();
    let mut start = 0;
    let mut chars = text.char_indices().peekable();

    while let Some((i, c)) = chars.next() {
        let next = chars.peek().map(|&(_, n)| n);
        let boundary = match c {
            '\n' => true,
            '.' | '?' | '!' | ';' => next.map_or(true, char::is_whitespace),
            _ => false,
        };
        if boundary {
            let end = i + c.len_utf8();
            push_sentence(text, start, end, &mut sentences);
            start = end;
        }
    }
    push_sentence(text, start, text.len(), &mut sentences);
    sentences
}

fn push_sentence<'a>(text: &'a str, start: usize, end: usize, out: &mut Vec<Sentence<'a>>) {
    let raw = &text[start..end];
    let trimmed_start = raw.len() - raw.trim_start().len();
    let trimmed = raw.trim();
    if trimmed.chars().any(char::is_alphanumeric) {
        out.push(Sentence {
            start: start + trimmed_start,
            text: trimmed,
        });
    }
}

/// Palavra com offsets em bytes relativos ao texto tokenizado.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Token {
    /// Forma minúscula.
    pub lower: String,
    pub start: usize,
    pub end: usize,
}

/// Palavras: sequências alfanuméricas, com `'` e `-` internos.
pub fn tokenize(text: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut current: Option<usize> = None;
    let mut chars = text.char_indices().peekable();

    while let Some((i, c)) = chars.next() {
        let next_is_word = chars.peek().is_some_and(|&(_, n)| n.is_alphanumeric());
        let joiner = (c == '\'' || c == '-') && current.is_some() && next_is_word;
        if c.is_alphanumeric() || joiner {
            if current.is_none() {
                current = Some(i);
            }
        } else if let Some(start) = current.take() {
            tokens.push(make_token(text, start, i));
        }
    }
    if let Some(start) = current {
        tokens.push(make_token(text, start, text.len()));
    }
    tokens
}

fn make_token(text: &str, start: usize, end: usize) -> Token {
    Token {
        lower: text[start..end].to_lowercase(),
        start,
        end,
    }
}

pub fn is_number(word: &str) -> bool {
    let stripped: String = word.chars().filter(|c| *c != '.' && *c != ',').collect();
    !stripped.is_empty() && stripped.chars().all(|c| c.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_removes_page_numbers_and_symbols() {
        let cleaner = TextCleaner::new();
        let raw = "Cells are units.\n\n 12 \nThe nucleus (center) holds DNA™.";
        let cleaned = cleaner.clean(raw);
        assert!(!cleaned.contains("12"));
        assert!(!cleaned.contains('('));
        assert!(!cleaned.contains('™'));
        assert!(cleaned.contains("nucleus  center  holds"));
    }

    #[test]
    fn test_clean_joins_hyphenated_line_breaks() {
        let cleaner = TextCleaner::new();
        assert_eq!(cleaner.clean("photo-\nsynthesis works"), "photosynthesis works");
    }

    #[test]
    fn test_split_sentences_offsets() {
        let text = "Pi is 3.14 roughly. Why? Because!\nTitle line";
        let sentences = split_sentences(text);
        let texts: Vec<_> = sentences.iter().map(|s| s.text).collect();
        assert_eq!(texts, vec!["Pi is 3.14 roughly.", "Why?", "Because!", "Title line"]);
        for s in &sentences {
            assert_eq!(&text[s.start..s.start + s.text.len()], s.text);
        }
    }

    #[test]
    fn test_tokenize_keeps_internal_joiners() {
        let tokens = tokenize("Newton's first-law, 'quoted' end-");
        let words: Vec<_> = tokens.iter().map(|t| t.lower.as_str()).collect();
        assert_eq!(words, vec!["newton's", "first-law", "quoted", "end"]);
        assert_eq!(&"Newton's first-law, 'quoted' end-"[tokens[1].start..tokens[1].end], "first-law");
    }

    #[test]
    fn test_is_number() {
        assert!(is_number("1998"));
        assert!(is_number("3.14"));
        assert!(!is_number("2s"));
        assert!(!is_number("."));
    }
}
