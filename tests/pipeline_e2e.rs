//! Pipeline completo sobre um diretório temporário, só com a API pública.

use std::path::Path;

use curriculum_map::collector::SourceSpec;
use curriculum_map::persistence;
use curriculum_map::pipeline;
use curriculum_map::qa::QaEngine;
use curriculum_map::{DataDir, PipelineConfig};

const PHOTOSYNTHESIS: &str = "Photosynthesis converts light into chemical energy.";

fn write_source(dir: &Path) -> SourceSpec {
    let path = dir.join("biology.txt");
    std::fs::write(&path, PHOTOSYNTHESIS).unwrap();
    SourceSpec::new(path.to_string_lossy()).with_subject("science")
}

#[test]
fn test_photosynthesis_end_to_end() {
    let dir = tempfile::tempdir().unwrap();
    let source = write_source(dir.path());
    let data = DataDir::new(dir.path().join("data"));
    let config = PipelineConfig::default();

    pipeline::run_all(&config, &data, &[source]).unwrap();

    let map = persistence::load_concept_map(&data.concept_map_path()).unwrap();
    assert!(map.node_by_label("photosynthesis").is_some());

    let set = persistence::load_question_set(&data.questions_json_path()).unwrap();
    assert!(set.questions.iter().any(|q| q.text.contains("photosynthesis")));

    let svg = std::fs::read_to_string(data.visualization_path()).unwrap();
    assert!(svg.starts_with("<?xml"));
    assert!(svg.contains("photosynthesis"));

    let engine = QaEngine::load(&config.qa).unwrap();
    let answers = pipeline::answer_questions(&engine, &data).unwrap();
    assert!(answers
        .answers
        .iter()
        .any(|a| a.answer.text.contains("chemical energy")));
}

#[test]
fn test_second_collection_adds_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let source = write_source(dir.path());
    let data = DataDir::new(dir.path().join("data"));
    let config = PipelineConfig::default();

    let first = pipeline::collect(&config, &data, std::slice::from_ref(&source)).unwrap();
    let second = pipeline::collect(&config, &data, &[source]).unwrap();
    assert_eq!(first.collected.len(), 1);
    assert!(second.collected.is_empty());
    assert_eq!(second.duplicates, 1);
    assert_eq!(data.list_documents().unwrap().len(), 1);
}

#[test]
fn test_concept_map_is_byte_identical_across_runs() {
    let config = PipelineConfig::default();
    let mut outputs = Vec::new();
    for _ in 0..2 {
        let dir = tempfile::tempdir().unwrap();
        let data = DataDir::new(dir.path().join("data"));
        pipeline::collect(&config, &data, &[SourceSpec::new("seed")]).unwrap();
        pipeline::validate(&config, &data).unwrap();
        pipeline::extract(&config, &data).unwrap();
        outputs.push(std::fs::read(data.concept_map_path()).unwrap());
    }
    assert_eq!(outputs[0], outputs[1]);
}
