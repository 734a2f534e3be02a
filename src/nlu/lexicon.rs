//! # Léxico do Inglês: Stopwords, Verbos e Lematização
//!
//! Listas curadas usadas pelo Extractor, pelo Question Generator, pelo
//! Validator (checagem de idioma) e pelo leitor léxico do QA.
//!
//! Não há etiquetador morfossintático: um token é verbo se o seu lema
//! (obtido por remoção de sufixo) está em [`COMMON_VERBS`]. O extrator
//! corrige essa primeira etiqueta pelo contexto ([`is_adjective_like`],
//! [`looks_inflected`]). Isso cobre o vocabulário de livros didáticos bem o
//! bastante para extrair relações sujeito-verbo-objeto simples.

/// Palavras funcionais do inglês (artigos, preposições, pronomes, auxiliares,
/// conjunções, advérbios muito comuns). Nunca viram conceito.
pub const STOPWORDS: &[&str] = &[
    "a", "an", "the", "this", "that", "these", "those", "some", "any", "each", "every", "all",
    "both", "either", "neither", "no", "not", "nor", "only", "own", "same", "such", "other",
    "another", "of", "to", "for", "with", "on", "at", "by", "from", "up", "down", "about", "into",
    "onto", "over", "after", "before", "beneath", "under", "above", "below", "in", "out", "off",
    "through", "across", "between", "among", "during", "without", "within", "along", "around",
    "against", "toward", "towards", "upon", "via", "per", "than", "as", "like", "and", "or",
    "but", "if", "then", "else", "so", "because", "although", "though", "while", "whereas",
    "unless", "until", "since", "whether", "is", "are", "was", "were", "be", "been", "being",
    "am", "has", "have", "had", "having", "do", "does", "did", "done", "doing", "will", "would",
    "can", "could", "shall", "should", "may", "might", "must", "i", "me", "my", "mine", "we",
    "us", "our", "ours", "you", "your", "yours", "he", "him", "his", "she", "her", "hers", "it",
    "its", "itself", "they", "them", "their", "theirs", "themselves", "what", "which", "who",
    "whom", "whose", "when", "where", "why", "how", "there", "here", "very", "too", "also",
    "just", "more", "most", "less", "least", "much", "many", "few", "several", "often", "always",
    "never", "sometimes", "usually", "even", "still", "again", "once", "however", "therefore",
    "thus", "yes", "s", "etc", "e.g", "i.e",
];

/// Palavras interrogativas; nunca são conceitos.
pub const QUESTION_WORDS: &[&str] = &[
    "what", "which", "when", "where", "who", "whom", "whose", "why", "how",
];

/// Trechos estruturais do material didático. Conceito que contém qualquer
/// um deles é descartado.
pub const STOP_PHRASES: &[&str] = &[
    "chapter", "section", "unit", "page", "figure", "table", "example", "note", "exercise",
    "question", "answer",
];

/// Verbos genéricos demais para rotular uma relação.
pub const GENERIC_VERBS: &[&str] = &[
    "has", "have", "had", "made", "make", "take", "write", "states", "called", "consists",
    "having", "give", "comes", "produced", "explains", "heat", "meet", "obtain", "provided",
    "bounded", "classified", "reared", "secretes", "is", "are", "was", "were", "be", "been",
    "get", "put", "set", "use", "used", "using", "form", "forms", "contain", "contains",
    "including", "include", "includes", "show", "shows", "showing", "see", "seen", "found",
    "find", "keep", "kept", "become", "became", "becoming", "allow", "allows", "allowed", "let",
    "lets", "let's", "help", "helps", "helped", "support", "supports", "supported",
];

/// Lemas de verbos reconhecidos.
pub const COMMON_VERBS: &[&str] = &[
    "be", "have", "do", "say", "get", "make", "go", "know", "take", "see", "come", "think",
    "look", "want", "give", "use", "find", "tell", "ask", "work", "seem", "feel", "try", "leave",
    "call", "put", "keep", "let", "begin", "help", "talk", "turn", "start", "show", "hear",
    "play", "run", "move", "live", "believe", "bring", "write", "provide", "sit", "stand",
    "lose", "pay", "meet", "include", "continue", "set", "learn", "change", "lead", "understand",
    "watch", "follow", "stop", "create", "speak", "read", "allow", "add", "spend", "grow",
    "open", "walk", "win", "offer", "remember", "love", "consider", "appear", "buy", "wait",
    "serve", "die", "send", "expect", "build", "stay", "fall", "cut", "reach", "kill", "remain",
    "suggest", "raise", "pass", "sell", "require", "report", "decide", "pull", "return",
    "explain", "hope", "develop", "carry", "break", "receive", "agree", "support", "hit",
    "produce", "eat", "cover", "catch", "draw", "choose", "cause", "point", "listen", "realize",
    "place", "form", "join", "reduce", "establish", "act", "apply", "prepare", "teach",
    "contain", "control", "manage", "describe", "design", "test", "connect", "store", "relate",
    "indicate", "emit", "cross", "regulate", "generate", "weigh", "minimize", "protect",
    "memorize", "drop", "resemble", "calculate", "pump", "fuse", "dissociate", "corrode",
    "deplete", "neutralize", "absorb", "release", "supply", "surround", "destroy", "combine",
    "convert", "divide", "occur", "result", "trigger", "affect", "influence", "consist",
    "comprise", "transform", "transfer", "transmit", "transport", "increase", "decrease",
    "measure", "determine", "define", "represent", "heat", "cool",
    "dissolve", "evaporate", "condense", "reflect", "refract", "attract", "repel", "orbit",
    "rotate", "power", "enable", "prevent", "digest", "breathe", "feed", "sort", "execute",
    "compile", "encrypt", "route", "query", "delete", "insert", "update", "need", "depend",
    "contract", "expand", "vibrate", "melt", "freeze", "boil", "burn", "split", "bind",
    "reproduce", "inherit", "evolve", "adapt", "migrate", "erode", "pollinate",
];

/// Sufixos de adjetivo: um "verbo" logo depois de um deles é substantivo
/// ("solar power").
const ADJECTIVE_SUFFIXES: &[&str] = &[
    "al", "ar", "ic", "ous", "ive", "ful", "less", "able", "ible", "ary",
];

/// Adjetivos comuns que os sufixos não pegam.
const COMMON_ADJECTIVES: &[&str] = &[
    "hot", "cold", "warm", "cool", "high", "low", "large", "small", "big", "fresh", "dry", "wet",
    "new", "old", "green", "red", "blue", "white", "black", "dark", "bright", "heavy", "strong",
    "weak", "fast", "slow",
];

/// Verbos que nunca rotulam uma pergunta de relação: preposições,
/// conjunções, auxiliares, artigos, pronomes e ruído de extração.
pub const BLACKLISTED_VERBS: &[&str] = &[
    "of", "from", "into", "by", "with", "on", "in", "at", "to", "for", "as", "c", "2s", "1s",
    "vs", "and", "or", "but", "if", "then", "else", "than", "so", "because", "although",
    "though", "while", "whereas", "given", "state", "law", "about", "between", "among",
    "during", "after", "before", "above", "below", "under", "over", "through", "across", "per",
    "is", "are", "was", "were", "be", "been", "being", "has", "have", "had", "do", "does",
    "did", "done", "doing", "will", "would", "can", "could", "shall", "should", "may", "might",
    "must", "not", "no", "yes", "a", "an", "the", "this", "that", "these", "those", "it",
    "they", "we", "you", "i", "he", "she", "who", "whom", "whose", "which", "what", "where",
    "when", "why", "how",
];

/// Labels vagos demais para virar pergunta.
pub const GENERIC_CONCEPTS: &[&str] = &[
    "thing", "things", "something", "anything", "everything", "object", "item", "aspect",
    "that", "them", "itself", "it", "they", "this", "those",
];

/// Preposições que, no fim de uma pergunta, indicam frase truncada.
pub const TRAILING_PREPOSITIONS: &[&str] = &[
    "of", "to", "for", "with", "on", "at", "by", "from", "up", "about", "into", "over", "after",
    "beneath", "under", "above",
];

/// Determinantes: um "verbo" logo depois de um deles é substantivo ("the result").
const DETERMINERS: &[&str] = &[
    "a", "an", "the", "this", "that", "these", "those", "its", "their", "his", "her", "our",
    "your", "my", "each", "every", "some", "any", "no",
];

pub fn is_stopword(word: &str) -> bool {
    STOPWORDS.contains(&word)
}

pub fn is_question_word(word: &str) -> bool {
    QUESTION_WORDS.contains(&word)
}

pub fn is_determiner(word: &str) -> bool {
    DETERMINERS.contains(&word)
}

pub fn is_generic_verb(word: &str) -> bool {
    GENERIC_VERBS.contains(&word)
}

pub fn is_blacklisted_verb(verb: &str) -> bool {
    BLACKLISTED_VERBS.contains(&verb)
}

pub fn is_generic_concept(label: &str) -> bool {
    GENERIC_CONCEPTS.contains(&label.trim().to_lowercase().as_str())
}

/// Lema está na lista de verbos conhecidos.
pub fn is_known_verb(lemma: &str) -> bool {
    COMMON_VERBS.contains(&lemma)
}

/// Verbo (forma flexionada ou lema) reconhecido pelo léxico.
pub fn is_verb_form(word: &str) -> bool {
    is_known_verb(&lemmatize(word))
}

/// Parece adjetivo, por lista ou por sufixo.
pub fn is_adjective_like(word: &str) -> bool {
    COMMON_ADJECTIVES.contains(&word)
        || (word.len() > 4 && ADJECTIVE_SUFFIXES.iter().any(|s| word.ends_with(s)))
}

/// Forma flexionada em `-s` ou `-ed` que pode ser verbo fora do léxico
/// (`flows`, `travelled`). Descarta `-ss`, `-us`, `-is`, `-ics`.
pub fn looks_inflected(word: &str) -> bool {
    if word.len() < 4 || !word.chars().all(|c| c.is_ascii_alphabetic()) {
        return false;
    }
    if word.ends_with("ed") {
        return word.len() >= 5;
    }
    word.ends_with('s') && !["ss", "us", "is", "ics"].iter().any(|s| word.ends_with(s))
}

/// Lema por remoção de sufixo.
///
/// Tenta primeiro os candidatos que caem em [`COMMON_VERBS`]
/// (`supplies` → `supply`, `produced` → `produce`, `running` → `run`); sem
/// acerto, aplica a remoção simples de sufixo.
pub fn lemmatize(word: &str) -> String {
    let w = word.to_lowercase();
    if is_known_verb(&w) {
        return w;
    }
    if let Some(hit) = lemma_candidates(&w).into_iter().find(|c| is_known_verb(c)) {
        return hit;
    }
    strip_suffix(&w)
}

/// Remoção simples, no estilo Porter: `sses → ss`, `ies → y`, `s`, `ed`, `ing`.
fn strip_suffix(w: &str) -> String {
    if w.ends_with("ss") || w.len() <= 3 {
        return w.to_string();
    }
    if let Some(s) = w.strip_suffix("sses") {
        return format!("{s}ss");
    }
    if let Some(s) = w.strip_suffix("ies") {
        return format!("{s}y");
    }
    for suffix in ["s", "ed", "ing"] {
        if let Some(s) = w.strip_suffix(suffix) {
            if s.len() >= 3 {
                return s.to_string();
            }
        }
    }
    w.to_string()
}

fn lemma_candidates(w: &str) -> Vec<String> {
    let mut out = Vec::new();
    let stem = |suffix: &str| w.strip_suffix(suffix).filter(|s| s.len() >= 2);

    if let Some(s) = stem("ies") {
        out.push(format!("{s}y"));
    }
    if let Some(s) = stem("es") {
        out.push(s.to_string());
    }
    if let Some(s) = stem("s") {
        out.push(s.to_string());
    }
    if let Some(s) = stem("ied") {
        out.push(format!("{s}y"));
    }
    if let Some(s) = stem("ed") {
        out.push(s.to_string());
        out.push(format!("{s}e"));
        if let Some(single) = undouble(s) {
            out.push(single);
        }
    }
    if let Some(s) = stem("ing") {
        out.push(s.to_string());
        out.push(format!("{s}e"));
        if let Some(single) = undouble(s) {
            out.push(single);
        }
    }
    out
}

/// `stopp` → `stop`, `runn` → `run`.
fn undouble(s: &str) -> Option<String> {
    let bytes = s.as_bytes();
    let n = bytes.len();
    if n >= 3 && bytes[n - 1] == bytes[n - 2] && bytes[n - 1].is_ascii_alphabetic() {
        Some(s[..n - 1].to_string())
    } else {
        None
    }
}

/// Terceira pessoa do singular: `convert` → `converts`, `supply` → `supplies`,
/// `cross` → `crosses`.
pub fn third_person(verb: &str) -> String {
    let v = verb.trim();
    if v == "be" {
        return "is".to_string();
    }
    if v == "have" {
        return "has".to_string();
    }
    let ends_consonant_y = v.len() >= 2
        && v.ends_with('y')
        && !matches!(v.as_bytes()[v.len() - 2], b'a' | b'e' | b'i' | b'o' | b'u');
    if ends_consonant_y {
        return format!("{}ies", &v[..v.len() - 1]);
    }
    if ["s", "x", "z", "ch", "sh", "o"].iter().any(|s| v.ends_with(s)) {
        return format!("{v}es");
    }
    format!("{v}s")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lemmatize_known_verbs() {
        assert_eq!(lemmatize("converts"), "convert");
        assert_eq!(lemmatize("supplies"), "supply");
        assert_eq!(lemmatize("produced"), "produce");
        assert_eq!(lemmatize("producing"), "produce");
        assert_eq!(lemmatize("stopped"), "stop");
        assert_eq!(lemmatize("running"), "run");
        assert_eq!(lemmatize("crosses"), "cross");
        assert_eq!(lemmatize("Absorbs"), "absorb");
    }

    #[test]
    fn test_lemmatize_fallback_strips_suffix() {
        assert_eq!(lemmatize("plants"), "plant");
        assert_eq!(lemmatize("energy"), "energy");
        assert_eq!(lemmatize("glass"), "glass");
        assert_eq!(lemmatize("processes"), "process");
        assert_eq!(lemmatize("phases"), "phase");
        assert_eq!(lemmatize("bodies"), "body");
    }

    #[test]
    fn test_verb_forms() {
        assert!(is_verb_form("converts"));
        assert!(is_verb_form("increase"));
        assert!(!is_verb_form("photosynthesis"));
        assert!(!is_verb_form("light"));
        assert!(!is_verb_form("chemical"));
    }

    #[test]
    fn test_adjective_like() {
        assert!(is_adjective_like("solar"));
        assert!(is_adjective_like("chemical"));
        assert!(is_adjective_like("hot"));
        assert!(!is_adjective_like("plants"));
        assert!(!is_adjective_like("energy"));
    }

    #[test]
    fn test_looks_inflected() {
        assert!(looks_inflected("flows"));
        assert!(looks_inflected("travelled"));
        assert!(!looks_inflected("glass"));
        assert!(!looks_inflected("nucleus"));
        assert!(!looks_inflected("physics"));
        assert!(!looks_inflected("bed"));
    }

    #[test]
    fn test_third_person() {
        assert_eq!(third_person("convert"), "converts");
        assert_eq!(third_person("supply"), "supplies");
        assert_eq!(third_person("copy"), "copies");
        assert_eq!(third_person("cross"), "crosses");
        assert_eq!(third_person("play"), "plays");
        assert_eq!(third_person("be"), "is");
    }

    #[test]
    fn test_lists() {
        assert!(is_stopword("the"));
        assert!(!is_stopword("energy"));
        assert!(is_generic_concept("Things"));
        assert!(is_blacklisted_verb("law"));
        assert!(is_generic_verb("contains"));
    }
}
