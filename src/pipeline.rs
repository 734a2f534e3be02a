//! # Estágios do Pipeline
//!
//! Cada função aqui é um subcomando: lê o artefato do estágio anterior do
//! [`DataDir`], executa o estágio e grava o próprio artefato. Nenhum
//! estágio recebe dados de outro em memória.
//!
//! ```text
//! collect   ─► documents/<id>.json
//! validate  ─► validation_report.json
//! extract   ─► concept_map.json
//! generate  ─► questions.json | questions.csv | questions.txt
//! answer    ─► answers.json
//! benchmark ─► benchmark.json
//! visualize ─► concept_map.svg
//! ```

use std::path::{Path, PathBuf};

use crate::collector::{CollectionReport, Collector, SourceSpec, SEED_LOCATION};
use crate::config::PipelineConfig;
use crate::core::{ConceptMap, CurriculumDocument, QuestionSet};
use crate::error::{PipelineError, Result};
use crate::nlu::question::{to_csv, to_numbered_text};
use crate::nlu::{ConceptExtractor, QuestionGenerator};
use crate::persistence::{self, DataDir};
use crate::qa::benchmark::{run_benchmark, BenchmarkReport};
use crate::qa::{AnswerModel, AnswerSet, QaEngine};
use crate::validator::{ValidationReport, Validator};
use crate::visualizer::Visualizer;

/// Coleta `sources`, ou as fontes do config quando vazio.
///
/// Sem nenhuma fonte configurada, coleta os registros semente.
pub fn collect(config: &PipelineConfig, data: &DataDir, sources: &[SourceSpec]) -> Result<CollectionReport> {
    let sources: Vec<SourceSpec> = if !sources.is_empty() {
        sources.to_vec()
    } else if !config.collector.sources.is_empty() {
        config.collector.sources.clone()
    } else {
        tracing::info!("Nenhuma fonte configurada, usando registros semente");
        vec![SourceSpec::new(SEED_LOCATION)]
    };
    Collector::new(&config.collector, data.clone())?.collect(&sources)
}

pub fn validate(config: &PipelineConfig, data: &DataDir) -> Result<ValidationReport> {
    let report = Validator::new(config.validator.clone()).validate_dir(data)?;
    persistence::write_json(&data.validation_report_path(), &report)?;
    Ok(report)
}

/// Documentos aceitos pelo último `validate`.
pub fn accepted_documents(data: &DataDir) -> Result<Vec<CurriculumDocument>> {
    let report_path = data.validation_report_path();
    if !report_path.exists() {
        return Err(PipelineError::NoInput(format!(
            "{} não encontrado; execute `validate` primeiro",
            report_path.display()
        )));
    }
    let report: ValidationReport = persistence::read_json(&report_path)?;
    report.check_schema()?;

    let ids = report.accepted_ids();
    if ids.is_empty() {
        return Err(PipelineError::NoInput("nenhum documento aceito pela validação".into()));
    }
    ids.iter()
        .map(|id| persistence::load_document(&data.document_path(id)))
        .collect()
}

pub fn extract(config: &PipelineConfig, data: &DataDir) -> Result<ConceptMap> {
    let documents = accepted_documents(data)?;
    let map = ConceptExtractor::new(config.extractor.clone()).extract(&documents)?;
    map.validate()?;
    persistence::write_json(&data.concept_map_path(), &map)?;
    Ok(map)
}

/// Gera as perguntas do mapa e grava JSON, CSV e TXT.
///
/// `answerer` preenche as respostas esperadas com um modelo de QA.
pub fn generate(config: &PipelineConfig, data: &DataDir, answerer: Option<&dyn AnswerModel>) -> Result<QuestionSet> {
    let map_path = data.concept_map_path();
    let map = persistence::load_concept_map(&map_path)?;
    let questions = QuestionGenerator::new(&config.questions).generate(&map, answerer);

    let source_map = map_path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let set = QuestionSet::new(source_map, questions);
    set.validate_against(&map)?;

    persistence::write_json(&data.questions_json_path(), &set)?;
    persistence::write_text(&data.questions_csv_path(), &to_csv(&set.questions))?;
    persistence::write_text(&data.questions_txt_path(), &to_numbered_text(&set.questions))?;
    tracing::info!(questions = set.len(), "Perguntas gravadas");
    Ok(set)
}

/// Responde todas as perguntas de `questions.json` com o contexto guardado.
///
/// Toda pergunta precisa apontar para um nó ou aresta de `concept_map.json`.
pub fn answer_questions(engine: &QaEngine, data: &DataDir) -> Result<AnswerSet> {
    let set = persistence::load_question_set(&data.questions_json_path())?;
    let map = persistence::load_concept_map(&data.concept_map_path())?;
    set.validate_against(&map)?;
    let answers = engine.answer_set(&set)?;
    persistence::write_json(&data.answers_path(), &answers)?;
    Ok(answers)
}

pub fn benchmark(config: &PipelineConfig, data: &DataDir) -> Result<BenchmarkReport> {
    let report = run_benchmark(&config.qa)?;
    persistence::write_json(&data.benchmark_path(), &report)?;
    Ok(report)
}

/// Renderiza o mapa em SVG; devolve o caminho gravado.
///
/// O título padrão é o nome do arquivo do mapa, sem extensão.
pub fn visualize(config: &PipelineConfig, data: &DataDir, output: Option<&Path>, title: Option<&str>) -> Result<PathBuf> {
    let map_path = data.concept_map_path();
    let map = persistence::load_concept_map(&map_path)?;
    let default_title = map_path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "Concept Map Visualization".to_string());
    let output = output.map(Path::to_path_buf).unwrap_or_else(|| data.visualization_path());

    Visualizer::new(config.visualizer.clone()).render_to_file(&map, title.unwrap_or(&default_title), &output)?;
    Ok(output)
}

/// `collect → validate → extract → generate → visualize`, cada um lendo
/// o artefato gravado pelo anterior.
pub fn run_all(config: &PipelineConfig, data: &DataDir, sources: &[SourceSpec]) -> Result<()> {
    let span = tracing::info_span!("pipeline");
    let _guard = span.enter();

    collect(config, data, sources)?;
    validate(config, data)?;
    extract(config, data)?;
    generate(config, data, None)?;
    visualize(config, data, None, None)?;
    tracing::info!(data_dir = %data.root().display(), "Pipeline concluído");
    Ok(())
}
