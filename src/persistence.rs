//! # Persistência: Artefatos do Pipeline em Disco
//!
//! Cada estágio lê o artefato do anterior e escreve o seu. Este módulo
//! concentra o layout do diretório de dados e a leitura/escrita JSON.
//!
//! ```text
//! data/
//! ├── documents/<sha256>.json
//! ├── validation_report.json
//! ├── concept_map.json
//! ├── questions.json | questions.csv | questions.txt
//! ├── answers.json | benchmark.json
//! └── concept_map.svg
//! ```
//!
//! ## Atomicidade
//!
//! Toda escrita usa write-rename: o conteúdo vai para um arquivo temporário
//! no mesmo diretório e só então é renomeado para o destino. Um crash no
//! meio da escrita deixa o artefato anterior intacto.
//!
//! O JSON é "pretty-printed" para facilitar inspeção manual.

use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::core::{ConceptMap, CurriculumDocument, DocumentId, QuestionSet};
use crate::error::{PipelineError, Result};

/// Layout do diretório de dados.
#[derive(Clone, Debug)]
pub struct DataDir {
    root: PathBuf,
}

impl DataDir {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn documents_dir(&self) -> PathBuf {
        self.root.join("documents")
    }

    pub fn document_path(&self, id: &DocumentId) -> PathBuf {
        self.documents_dir().join(format!("{id}.json"))
    }

    pub fn validation_report_path(&self) -> PathBuf {
        self.root.join("validation_report.json")
    }

    pub fn concept_map_path(&self) -> PathBuf {
        self.root.join("concept_map.json")
    }

    pub fn questions_json_path(&self) -> PathBuf {
        self.root.join("questions.json")
    }

    pub fn questions_csv_path(&self) -> PathBuf {
        self.root.join("questions.csv")
    }

    pub fn questions_txt_path(&self) -> PathBuf {
        self.root.join("questions.txt")
    }

    pub fn answers_path(&self) -> PathBuf {
        self.root.join("answers.json")
    }

    pub fn visualization_path(&self) -> PathBuf {
        self.root.join("concept_map.svg")
    }

    pub fn benchmark_path(&self) -> PathBuf {
        self.root.join("benchmark.json")
    }

    /// Arquivos `*.json` de `documents/`, ordenados por nome.
    ///
    /// Diretório inexistente conta como vazio.
    pub fn list_documents(&self) -> Result<Vec<PathBuf>> {
        let dir = self.documents_dir();
        if !dir.exists() {
            return Ok(Vec::new());
        }
        let entries = std::fs::read_dir(&dir).map_err(|e| PipelineError::io(&dir, e))?;
        let mut paths = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| PipelineError::io(&dir, e))?;
            let path = entry.path();
            if path.is_file() && path.extension().is_some_and(|ext| ext == "json") {
                paths.push(path);
            }
        }
        paths.sort();
        Ok(paths)
    }
}

// ─── Escrita ────────────────────────────────────────────────────

/// Escreve `contents` em `path` via arquivo temporário + rename.
///
/// Cria o diretório pai se não existir.
pub fn write_atomic(path: &Path, contents: &[u8]) -> Result<()> {
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    };
    std::fs::create_dir_all(&parent).map_err(|e| PipelineError::io(&parent, e))?;

    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "artifact".to_string());
    let tmp = parent.join(format!(".{file_name}.{}.tmp", std::process::id()));

    std::fs::write(&tmp, contents).map_err(|e| PipelineError::io(&tmp, e))?;
    if let Err(e) = std::fs::rename(&tmp, path) {
        let _ = std::fs::remove_file(&tmp);
        return Err(PipelineError::io(path, e));
    }
    Ok(())
}

pub fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let mut json = serde_json::to_string_pretty(value).map_err(|e| PipelineError::json(path, e))?;
    json.push('\n');
    write_atomic(path, json.as_bytes())
}

pub fn write_text(path: &Path, contents: &str) -> Result<()> {
    write_atomic(path, contents.as_bytes())
}

// ─── Leitura ────────────────────────────────────────────────────

pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let json = std::fs::read_to_string(path).map_err(|e| PipelineError::io(path, e))?;
    serde_json::from_str(&json).map_err(|e| PipelineError::json(path, e))
}

pub fn load_document(path: &Path) -> Result<CurriculumDocument> {
    read_json(path)
}

/// Carrega o mapa, reconstrói os índices e checa a integridade.
///
/// JSON que não corresponde ao esquema também vira
/// [`MalformedMap`](PipelineError::MalformedMap); arquivo ausente é `Io`.
pub fn load_concept_map(path: &Path) -> Result<ConceptMap> {
    let json = std::fs::read_to_string(path).map_err(|e| PipelineError::io(path, e))?;
    let mut map: ConceptMap = serde_json::from_str(&json)
        .map_err(|e| PipelineError::MalformedMap(format!("{}: {e}", path.display())))?;
    map.rebuild_index();
    map.validate()?;
    tracing::debug!(
        path = %path.display(),
        nodes = map.node_count(),
        edges = map.edge_count(),
        "Mapa de conceitos carregado"
    );
    Ok(map)
}

pub fn load_question_set(path: &Path) -> Result<QuestionSet> {
    let json = std::fs::read_to_string(path).map_err(|e| PipelineError::io(path, e))?;
    let set: QuestionSet = serde_json::from_str(&json)
        .map_err(|e| PipelineError::MalformedQuestions(format!("{}: {e}", path.display())))?;
    set.validate()?;
    Ok(set)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::EdgeKind;

    #[test]
    fn test_write_atomic_replaces_and_leaves_no_tmp() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("artifact.txt");
        write_text(&path, "first").unwrap();
        write_text(&path, "second").unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "second");

        let leftovers: Vec<_> = std::fs::read_dir(path.parent().unwrap())
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name().to_string_lossy().ends_with(".tmp"))
            .collect();
        assert!(leftovers.is_empty());
    }

    #[test]
    fn test_concept_map_round_trip_rebuilds_index() {
        let dir = tempfile::tempdir().unwrap();
        let data = DataDir::new(dir.path());
        let mut map = ConceptMap::new();
        let doc = "d".repeat(64);
        let a = map.add_mention("light", &doc, "s");
        let b = map.add_mention("chemical energy", &doc, "s");
        map.observe_edge(a, b, EdgeKind::CoOccurrence, Some("s")).unwrap();

        write_json(&data.concept_map_path(), &map).unwrap();
        let loaded = load_concept_map(&data.concept_map_path()).unwrap();
        assert_eq!(loaded, map);
        assert!(loaded.node_by_label("light").is_some());
    }

    #[test]
    fn test_malformed_map_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("concept_map.json");
        std::fs::write(&path, r#"{"schema_version": 1, "nodes": "oops", "edges": []}"#).unwrap();
        assert!(matches!(load_concept_map(&path), Err(PipelineError::MalformedMap(_))));

        let dangling = r#"{
            "schema_version": 1,
            "nodes": [],
            "edges": [{
                "id": "00000000-0000-0000-0000-000000000001",
                "source": "00000000-0000-0000-0000-000000000002",
                "target": "00000000-0000-0000-0000-000000000003",
                "relation": {"kind": "co_occurrence"},
                "count": 1,
                "weight": 0.5
            }]
        }"#;
        std::fs::write(&path, dangling).unwrap();
        assert!(matches!(load_concept_map(&path), Err(PipelineError::MalformedMap(_))));
    }

    #[test]
    fn test_missing_map_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_concept_map(&dir.path().join("absent.json")).unwrap_err();
        assert!(matches!(err, PipelineError::Io { .. }));
    }

    #[test]
    fn test_list_documents_sorted_and_filtered() {
        let dir = tempfile::tempdir().unwrap();
        let data = DataDir::new(dir.path());
        assert!(data.list_documents().unwrap().is_empty());

        std::fs::create_dir_all(data.documents_dir()).unwrap();
        std::fs::write(data.documents_dir().join("b.json"), "{}").unwrap();
        std::fs::write(data.documents_dir().join("a.json"), "{}").unwrap();
        std::fs::write(data.documents_dir().join("notes.txt"), "x").unwrap();
        let names: Vec<_> = data
            .list_documents()
            .unwrap()
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["a.json", "b.json"]);
    }
}
