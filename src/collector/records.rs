//! # Registros Curriculares: Semente e Conjuntos de Dados
//!
//! | Formato | Entrada | Disciplina |
//! |---------|---------|-----------|
//! | registros | array JSON de [`CurriculumRecord`] | a do registro |
//! | ScienceQA | array (ou objeto id → item) com `question`, `choices`, `answer` | `science` |
//! | OpenBookQA | JSONL com `question_stem`, `choices.text/label`, `answerKey` | `computer_science` |
//!
//! Itens incompletos ou malformados são pulados; só um arquivo ilegível
//! como um todo é erro.

use serde::Deserialize;
use serde_json::Value;

use crate::core::CurriculumRecord;

/// Array JSON de registros no formato do coletor.
pub fn parse_records(bytes: &[u8]) -> serde_json::Result<Vec<CurriculumRecord>> {
    serde_json::from_slice(bytes)
}

// ─── ScienceQA ──────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ScienceQaItem {
    question: String,
    choices: Vec<String>,
    answer: Option<Value>,
    topic: Option<String>,
    category: Option<String>,
    grade: Option<Value>,
    explanation: Option<String>,
}

pub fn parse_scienceqa(bytes: &[u8]) -> serde_json::Result<Vec<CurriculumRecord>> {
    let items: Vec<Value> = match serde_json::from_slice(bytes)? {
        Value::Array(items) => items,
        Value::Object(map) => map.into_iter().map(|(_, v)| v).collect(),
        _ => Vec::new(),
    };
    let total = items.len();
    let records: Vec<CurriculumRecord> = items
        .into_iter()
        .filter_map(|v| serde_json::from_value::<ScienceQaItem>(v).ok())
        .filter_map(scienceqa_record)
        .collect();
    tracing::debug!(total, kept = records.len(), "Itens ScienceQA processados");
    Ok(records)
}

fn scienceqa_record(item: ScienceQaItem) -> Option<CurriculumRecord> {
    if item.question.trim().is_empty() || item.choices.is_empty() {
        return None;
    }
    let answer = match item.answer? {
        Value::Number(n) => n
            .as_u64()
            .and_then(|i| item.choices.get(i as usize).cloned())
            .unwrap_or_else(|| n.to_string()),
        other => value_to_string(&other)?,
    };
    let topic = item.topic.unwrap_or_else(|| "General Science".to_string());
    Some(CurriculumRecord {
        subject: "science".into(),
        subtopic: item.category.unwrap_or_else(|| "General".to_string()),
        question: item.question,
        answer,
        difficulty: item
            .grade
            .as_ref()
            .and_then(value_to_string)
            .unwrap_or_else(|| "medium".to_string()),
        question_type: "multiple_choice".into(),
        concepts: vec![topic.clone()],
        prerequisites: Vec::new(),
        learning_objective: item.explanation.unwrap_or_default(),
        topic,
    })
}

// ─── OpenBookQA ─────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct OpenBookChoices {
    text: Vec<String>,
    label: Vec<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct OpenBookItem {
    #[serde(rename = "question_stem")]
    question_stem: String,
    choices: Option<OpenBookChoices>,
    answer_key: String,
    fact1: Option<String>,
}

/// JSONL; linhas vazias ou inválidas são ignoradas.
pub fn parse_openbookqa(bytes: &[u8]) -> Vec<CurriculumRecord> {
    let text = String::from_utf8_lossy(bytes);
    let mut malformed = 0usize;
    let mut records = Vec::new();
    for line in text.lines().map(str::trim).filter(|l| !l.is_empty()) {
        match serde_json::from_str::<OpenBookItem>(line) {
            Ok(item) => records.extend(openbookqa_record(item)),
            Err(_) => malformed += 1,
        }
    }
    if malformed > 0 {
        tracing::debug!(malformed, "Linhas JSONL inválidas ignoradas");
    }
    records
}

fn openbookqa_record(item: OpenBookItem) -> Option<CurriculumRecord> {
    let choices = item.choices?;
    if item.question_stem.trim().is_empty() || item.answer_key.trim().is_empty() {
        return None;
    }
    let answer = choices
        .label
        .iter()
        .position(|l| *l == item.answer_key)
        .and_then(|i| choices.text.get(i).cloned())
        .unwrap_or(item.answer_key);
    Some(CurriculumRecord {
        subject: "computer_science".into(),
        topic: "General CS".into(),
        subtopic: "General".into(),
        question: item.question_stem,
        answer,
        difficulty: "medium".into(),
        question_type: "multiple_choice".into(),
        concepts: Vec::new(),
        prerequisites: Vec::new(),
        learning_objective: item.fact1.unwrap_or_default(),
    })
}

fn value_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

// ─── Registros semente ──────────────────────────────────────────

#[allow(clippy::too_many_arguments)]
fn seed(
    subject: &str,
    topic: &str,
    subtopic: &str,
    question: &str,
    answer: &str,
    difficulty: &str,
    question_type: &str,
    concepts: &[&str],
    prerequisites: &[&str],
    learning_objective: &str,
) -> CurriculumRecord {
    CurriculumRecord {
        subject: subject.into(),
        topic: topic.into(),
        subtopic: subtopic.into(),
        question: question.into(),
        answer: answer.into(),
        difficulty: difficulty.into(),
        question_type: question_type.into(),
        concepts: concepts.iter().map(|c| c.to_string()).collect(),
        prerequisites: prerequisites.iter().map(|p| p.to_string()).collect(),
        learning_objective: learning_objective.into(),
    }
}

/// Os oito registros escritos à mão do coletor (ciência da computação e ciências).
pub fn seed_records() -> Vec<CurriculumRecord> {
    vec![
        seed(
            "computer_science",
            "Networking",
            "Network Types",
            "What is the main difference between LAN and WAN?",
            "LAN (Local Area Network) covers a small geographical area like a building or campus, while WAN (Wide Area Network) covers a large geographical area like cities or countries.",
            "medium",
            "short_answer",
            &["LAN", "WAN", "networking", "geographical coverage"],
            &["basic networking concepts"],
            "Understand the different types of networks based on geographical coverage",
        ),
        seed(
            "computer_science",
            "Programming",
            "Variables and Data Types",
            "What is the difference between integer and floating-point data types in programming?",
            "Integer data types store whole numbers without decimal points, while floating-point data types can store numbers with decimal points. Integers are more memory efficient but have limited precision, while floating-point numbers can represent a wider range of values but may have precision limitations.",
            "medium",
            "short_answer",
            &["data types", "integers", "floating-point", "memory", "precision"],
            &["basic programming concepts"],
            "Understand different numeric data types and their characteristics",
        ),
        seed(
            "computer_science",
            "Algorithms",
            "Sorting",
            "Which sorting algorithm is most efficient for small datasets?",
            "Insertion sort is most efficient for small datasets (typically less than 50 elements) because it has low overhead and performs well on nearly sorted data. However, for larger datasets, more complex algorithms like quicksort or mergesort are more efficient.",
            "medium",
            "multiple_choice",
            &["sorting", "algorithms", "efficiency", "insertion sort"],
            &["basic understanding of algorithms"],
            "Understand algorithm efficiency for different input sizes",
        ),
        seed(
            "computer_science",
            "Databases",
            "SQL",
            "What is the difference between INNER JOIN and LEFT JOIN in SQL?",
            "INNER JOIN returns only the matching records from both tables, while LEFT JOIN returns all records from the left table and matching records from the right table. If there's no match in the right table, NULL values are returned for those columns.",
            "hard",
            "multiple_choice",
            &["SQL", "joins", "databases", "querying"],
            &["basic SQL knowledge"],
            "Understand different types of SQL joins and their use cases",
        ),
        seed(
            "science",
            "Physics",
            "Forces and Motion",
            "What is Newton's First Law of Motion and how does it relate to inertia?",
            "Newton's First Law states that an object will remain at rest or in uniform motion unless acted upon by an external force. This property of objects to resist changes in their state of motion is called inertia. The law demonstrates that inertia is a fundamental property of matter.",
            "medium",
            "short_answer",
            &["Newton's First Law", "inertia", "force", "motion"],
            &["basic concepts of force and motion"],
            "Understand the relationship between force, motion, and inertia",
        ),
        seed(
            "science",
            "Chemistry",
            "Chemical Reactions",
            "What is the difference between exothermic and endothermic reactions?",
            "Exothermic reactions release energy to the surroundings (usually as heat), while endothermic reactions absorb energy from the surroundings. In exothermic reactions, the products have less energy than the reactants, while in endothermic reactions, the products have more energy than the reactants.",
            "medium",
            "short_answer",
            &["exothermic", "endothermic", "energy", "chemical reactions"],
            &["basic understanding of chemical reactions"],
            "Understand energy changes in chemical reactions",
        ),
        seed(
            "science",
            "Biology",
            "Cell Structure",
            "What is the function of the mitochondria in a cell?",
            "Mitochondria are known as the powerhouse of the cell. They generate most of the cell's supply of adenosine triphosphate (ATP), which is used as a source of chemical energy. They also play a role in cell signaling, cellular differentiation, and cell death.",
            "easy",
            "multiple_choice",
            &["cell biology", "mitochondria", "energy", "cellular respiration"],
            &["basic cell biology"],
            "Understand the role of mitochondria in cellular function",
        ),
        seed(
            "science",
            "Earth Science",
            "Plate Tectonics",
            "How do convergent plate boundaries contribute to mountain formation?",
            "Convergent plate boundaries contribute to mountain formation through a process called orogeny. When two continental plates collide, neither plate can be subducted due to their low density. Instead, the crust is compressed, folded, and uplifted, forming mountain ranges like the Himalayas.",
            "hard",
            "multiple_choice",
            &["plate tectonics", "mountain formation", "convergent boundaries", "orogeny"],
            &["basic understanding of plate tectonics"],
            "Understand the relationship between plate boundaries and mountain formation",
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seed_records_are_complete() {
        let records = seed_records();
        assert_eq!(records.len(), 8);
        assert_eq!(records.iter().filter(|r| r.subject == "science").count(), 4);
        for r in &records {
            assert!(r.question.ends_with('?'));
            assert!(r.answer.len() >= 20);
            assert!(!r.concepts.is_empty());
        }
    }

    #[test]
    fn test_scienceqa_answer_index_and_defaults() {
        let json = br#"[
            {"question": "Which is a mammal?", "choices": ["shark", "whale"], "answer": 1,
             "topic": "biology", "grade": "grade5", "explanation": "Whales breathe air."},
            {"question": "Which is a metal?", "choices": ["iron", "wood"], "answer": 0},
            {"question": "", "choices": ["a"], "answer": 0},
            {"question": "No choices?", "answer": 0}
        ]"#;
        let records = parse_scienceqa(json).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].answer, "whale");
        assert_eq!(records[0].difficulty, "grade5");
        assert_eq!(records[0].concepts, vec!["biology".to_string()]);
        assert_eq!(records[1].answer, "iron");
        assert_eq!(records[1].topic, "General Science");
        assert_eq!(records[1].difficulty, "medium");
    }

    #[test]
    fn test_scienceqa_accepts_object_keyed_by_id() {
        let json = br#"{"1": {"question": "Q?", "choices": ["x", "y"], "answer": 0}}"#;
        assert_eq!(parse_scienceqa(json).unwrap().len(), 1);
    }

    #[test]
    fn test_openbookqa_skips_malformed_lines() {
        let jsonl = b"{\"question_stem\": \"The sun is a\", \"choices\": {\"text\": [\"star\", \"planet\"], \"label\": [\"A\", \"B\"]}, \"answerKey\": \"A\", \"fact1\": \"the sun is a star\"}\n\
not json at all\n\
\n\
{\"question_stem\": \"Missing key\", \"choices\": {\"text\": [\"x\"], \"label\": [\"A\"]}}\n";
        let records = parse_openbookqa(jsonl);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].answer, "star");
        assert_eq!(records[0].learning_objective, "the sun is a star");
    }

    #[test]
    fn test_parse_records_array() {
        let json = br#"[{"subject": "science", "question": "What is DNA?", "type": "short_answer"}]"#;
        let records = parse_records(json).unwrap();
        assert_eq!(records[0].question_type, "short_answer");
        assert!(records[0].concepts.is_empty());
    }
}
