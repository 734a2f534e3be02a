//! # Leitor BERT Extrativo
//!
//! BERT ajustado para QA (estilo SQuAD) rodando em candle, na CPU.
//!
//! ```text
//! (pergunta, contexto) → Tokenizer → [CLS] q… [SEP] c… [SEP]
//!                                          ↓
//!                             BertModel → [1, seq, hidden]
//!                                          ↓
//!                             qa_outputs (Linear hidden→2)
//!                                          ↓
//!                  logits de início/fim → melhor trecho dentro do contexto
//! ```
//!
//! ## Carregamento
//!
//! `model_path` é um diretório local ou um repo do HuggingFace Hub
//! (`org/modelo`). Em ambos os casos:
//!
//! | Componente | Preferido | Fallback |
//! |-----------|-----------|----------|
//! | Tokenizer | `tokenizer.json` | `vocab.txt` (WordPiece) |
//! | Pesos | `model.safetensors` | `pytorch_model.bin` |
//! | Device | CPU | - |

use std::path::{Path, PathBuf};

use candle_core::{DType, Device, IndexOp, Module, Tensor};
use candle_nn::{Linear, VarBuilder};
use candle_transformers::models::bert;
use hf_hub::api::sync::Api;
use tokenizers::{Tokenizer, TruncationParams, TruncationStrategy};

use crate::config::QaConfig;
use crate::core::Answer;
use crate::error::{PipelineError, Result};

use super::AnswerModel;

const MODEL_NAME: &str = "bert";

enum TokenizerFile {
    Json(PathBuf),
    Vocab(PathBuf),
}

enum WeightsFile {
    Safetensors(PathBuf),
    Pth(PathBuf),
}

struct ModelFiles {
    config: PathBuf,
    tokenizer: TokenizerFile,
    weights: WeightsFile,
}

pub struct BertReader {
    model: bert::BertModel,
    qa_outputs: Linear,
    tokenizer: Tokenizer,
    device: Device,
    max_answer_tokens: usize,
}

impl BertReader {
    /// Carrega pesos, config e tokenizer de `location`.
    ///
    /// Arquivo ausente ou corrompido vira [`PipelineError::ModelLoad`]
    /// com o caminho; nunca há fallback silencioso para outro modelo.
    pub fn load(location: &str, config: &QaConfig) -> Result<Self> {
        let device = Device::Cpu;
        let files = resolve_files(location)?;
        tracing::info!(location, "Carregando leitor BERT");

        let mut tokenizer = match &files.tokenizer {
            TokenizerFile::Json(path) => Tokenizer::from_file(path)
                .map_err(|e| PipelineError::model_load(path.display().to_string(), e))?,
            TokenizerFile::Vocab(path) => {
                tracing::info!("tokenizer.json ausente, montando WordPiece a partir de vocab.txt");
                build_bert_tokenizer(path, config.lowercase)?
            }
        };
        tokenizer
            .with_truncation(Some(TruncationParams {
                max_length: config.max_seq_len,
                strategy: TruncationStrategy::OnlySecond,
                ..Default::default()
            }))
            .map_err(|e| PipelineError::model_load(location, e))?;
        tokenizer.with_padding(None);

        let raw_config = std::fs::read_to_string(&files.config)
            .map_err(|e| PipelineError::model_load(files.config.display().to_string(), e))?;
        let bert_config: bert::Config = serde_json::from_str(&raw_config)
            .map_err(|e| PipelineError::model_load(files.config.display().to_string(), e))?;
        let hidden_size = serde_json::from_str::<serde_json::Value>(&raw_config)
            .ok()
            .and_then(|v| v.get("hidden_size").and_then(|h| h.as_u64()))
            .ok_or_else(|| {
                PipelineError::model_load(files.config.display().to_string(), "hidden_size ausente")
            })? as usize;

        let (model, qa_outputs) = build_model(&files.weights, &bert_config, hidden_size, &device)
            .map_err(|e| PipelineError::model_load(location, e))?;

        tracing::info!(location, hidden_size, "Leitor BERT pronto na CPU");
        Ok(Self {
            model,
            qa_outputs,
            tokenizer,
            device,
            max_answer_tokens: config.max_answer_tokens.max(1),
        })
    }

    /// Logits de início e fim, um par por token.
    fn logits(&self, ids: &[u32], type_ids: &[u32], mask: &[u32]) -> candle_core::Result<(Vec<f32>, Vec<f32>)> {
        let input_ids = Tensor::new(ids, &self.device)?.unsqueeze(0)?;
        let token_type_ids = Tensor::new(type_ids, &self.device)?.unsqueeze(0)?;
        let attention_mask = Tensor::new(mask, &self.device)?.unsqueeze(0)?;

        let hidden = self
            .model
            .forward(&input_ids, &token_type_ids, Some(&attention_mask))?;
        let logits = self.qa_outputs.forward(&hidden)?.squeeze(0)?;
        let start = logits.i((.., 0))?.to_vec1::<f32>()?;
        let end = logits.i((.., 1))?.to_vec1::<f32>()?;
        Ok((start, end))
    }
}

impl AnswerModel for BertReader {
    fn name(&self) -> &str {
        MODEL_NAME
    }

    fn answer(&self, question: &str, context: &str) -> Result<Answer> {
        let encoding = self
            .tokenizer
            .encode((question, context), true)
            .map_err(|e| PipelineError::Inference(format!("tokenizer: {e}")))?;

        let (start_logits, end_logits) = self
            .logits(
                encoding.get_ids(),
                encoding.get_type_ids(),
                encoding.get_attention_mask(),
            )
            .map_err(|e| PipelineError::Inference(e.to_string()))?;

        let in_context: Vec<bool> = encoding
            .get_sequence_ids()
            .iter()
            .map(|s| *s == Some(1))
            .collect();
        let Some((first, last, score)) =
            best_span(&start_logits, &end_logits, &in_context, self.max_answer_tokens)
        else {
            return Ok(Answer::none(MODEL_NAME));
        };

        // [CLS] com pontuação maior que o melhor trecho: sem resposta.
        let null_score = start_logits.first().copied().unwrap_or(f32::MIN)
            + end_logits.first().copied().unwrap_or(f32::MIN);
        if null_score > score {
            return Ok(Answer::none(MODEL_NAME));
        }

        let offsets = encoding.get_offsets();
        let (start, end) = (offsets[first].0, offsets[last].1);
        let Some(text) = context.get(start..end).map(str::trim).filter(|t| !t.is_empty()) else {
            return Ok(Answer::none(MODEL_NAME));
        };
        let confidence = softmax(&start_logits)[first] * softmax(&end_logits)[last];

        Ok(Answer {
            text: text.to_string(),
            confidence,
            span: Some((start, end)),
            model: MODEL_NAME.to_string(),
        })
    }
}

// ─── Carregamento ─────────────────────────────────────────────

fn resolve_files(location: &str) -> Result<ModelFiles> {
    let path = Path::new(location);
    if path.is_dir() {
        return local_files(path);
    }
    if looks_like_repo_id(location) && !path.exists() {
        return hub_files(location);
    }
    Err(PipelineError::model_load(location, "diretório do modelo não encontrado"))
}

fn looks_like_repo_id(location: &str) -> bool {
    let mut parts = location.split('/');
    matches!(
        (parts.next(), parts.next(), parts.next()),
        (Some(org), Some(name), None) if !org.is_empty() && !name.is_empty() && !org.starts_with('.')
    )
}

fn local_files(dir: &Path) -> Result<ModelFiles> {
    let required = |name: &str| {
        let p = dir.join(name);
        p.is_file().then_some(p)
    };
    let config = required("config.json")
        .ok_or_else(|| PipelineError::model_load(dir.join("config.json").display().to_string(), "arquivo ausente"))?;
    let tokenizer = match (required("tokenizer.json"), required("vocab.txt")) {
        (Some(json), _) => TokenizerFile::Json(json),
        (None, Some(vocab)) => TokenizerFile::Vocab(vocab),
        (None, None) => {
            return Err(PipelineError::model_load(
                dir.join("tokenizer.json").display().to_string(),
                "nem tokenizer.json nem vocab.txt encontrados",
            ))
        }
    };
    let weights = match (required("model.safetensors"), required("pytorch_model.bin")) {
        (Some(st), _) => WeightsFile::Safetensors(st),
        (None, Some(pth)) => WeightsFile::Pth(pth),
        (None, None) => {
            return Err(PipelineError::model_load(
                dir.join("model.safetensors").display().to_string(),
                "nem model.safetensors nem pytorch_model.bin encontrados",
            ))
        }
    };
    Ok(ModelFiles {
        config,
        tokenizer,
        weights,
    })
}

fn hub_files(repo_id: &str) -> Result<ModelFiles> {
    tracing::info!(repo_id, "Baixando modelo do HuggingFace Hub");
    let api = Api::new().map_err(|e| PipelineError::model_load(repo_id, e))?;
    let repo = api.model(repo_id.to_string());

    let config = repo
        .get("config.json")
        .map_err(|e| PipelineError::model_load(format!("{repo_id}/config.json"), e))?;
    let tokenizer = match repo.get("tokenizer.json") {
        Ok(p) => TokenizerFile::Json(p),
        Err(_) => TokenizerFile::Vocab(
            repo.get("vocab.txt")
                .map_err(|e| PipelineError::model_load(format!("{repo_id}/vocab.txt"), e))?,
        ),
    };
    let weights = match repo.get("model.safetensors") {
        Ok(p) => WeightsFile::Safetensors(p),
        Err(_) => {
            tracing::info!("model.safetensors indisponível, usando pytorch_model.bin");
            WeightsFile::Pth(
                repo.get("pytorch_model.bin")
                    .map_err(|e| PipelineError::model_load(format!("{repo_id}/pytorch_model.bin"), e))?,
            )
        }
    };
    Ok(ModelFiles {
        config,
        tokenizer,
        weights,
    })
}

fn build_model(
    weights: &WeightsFile,
    config: &bert::Config,
    hidden_size: usize,
    device: &Device,
) -> candle_core::Result<(bert::BertModel, Linear)> {
    let vb = match weights {
        // SAFETY: o arquivo é mapeado somente para leitura e não é
        // modificado enquanto o modelo existe.
        WeightsFile::Safetensors(p) => unsafe {
            VarBuilder::from_mmaped_safetensors(&[p], DType::F32, device)?
        },
        WeightsFile::Pth(p) => VarBuilder::from_pth(p, DType::F32, device)?,
    };
    // Checkpoints de QA guardam o encoder sob "bert." e a cabeça em "qa_outputs".
    let encoder_vb = if vb.contains_tensor("bert.embeddings.word_embeddings.weight") {
        vb.pp("bert")
    } else {
        vb.clone()
    };
    let model = bert::BertModel::load(encoder_vb, config)?;
    let qa_outputs = candle_nn::linear(hidden_size, 2, vb.pp("qa_outputs"))?;
    Ok((model, qa_outputs))
}

/// Tokenizer WordPiece a partir de `vocab.txt`, para repos sem `tokenizer.json`.
fn build_bert_tokenizer(vocab_path: &Path, lowercase: bool) -> Result<Tokenizer> {
    use tokenizers::models::wordpiece::WordPiece;
    use tokenizers::normalizers::BertNormalizer;
    use tokenizers::pre_tokenizers::bert::BertPreTokenizer;
    use tokenizers::processors::bert::BertProcessing;

    let location = vocab_path.display().to_string();
    let vocab = vocab_path
        .to_str()
        .ok_or_else(|| PipelineError::model_load(location.clone(), "caminho não é UTF-8"))?;
    let wordpiece = WordPiece::from_file(vocab)
        .unk_token("[UNK]".to_string())
        .build()
        .map_err(|e| PipelineError::model_load(location, e))?;

    let mut tokenizer = Tokenizer::new(wordpiece);
    tokenizer.with_normalizer(Some(BertNormalizer::new(true, true, None, lowercase)));
    tokenizer.with_pre_tokenizer(Some(BertPreTokenizer));
    tokenizer.with_post_processor(Some(BertProcessing::new(
        ("[SEP]".to_string(), 102),
        ("[CLS]".to_string(), 101),
    )));
    Ok(tokenizer)
}

// ─── Decodificação do trecho ──────────────────────────────────

/// Melhor `(início, fim, pontuação)` com ambos os tokens no contexto,
/// `início ≤ fim` e no máximo `max_len` tokens.
fn best_span(start: &[f32], end: &[f32], in_context: &[bool], max_len: usize) -> Option<(usize, usize, f32)> {
    let n = start.len().min(end.len()).min(in_context.len());
    let mut best: Option<(usize, usize, f32)> = None;
    for i in (0..n).filter(|&i| in_context[i]) {
        for j in i..n.min(i + max_len) {
            if !in_context[j] {
                break;
            }
            let score = start[i] + end[j];
            if best.map_or(true, |(_, _, s)| score > s) {
                best = Some((i, j, score));
            }
        }
    }
    best
}

fn softmax(logits: &[f32]) -> Vec<f32> {
    let max = logits.iter().copied().fold(f32::NEG_INFINITY, f32::max);
    let exps: Vec<f32> = logits.iter().map(|l| (l - max).exp()).collect();
    let sum: f32 = exps.iter().sum();
    exps.into_iter().map(|e| e / sum).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_directory_is_model_load_error() {
        let err = BertReader::load("/definitely/not/a/model", &QaConfig::default())
            .err()
            .unwrap();
        match err {
            PipelineError::ModelLoad { location, .. } => assert!(location.contains("not/a/model")),
            other => panic!("erro inesperado: {other:?}"),
        }
    }

    #[test]
    fn test_empty_directory_names_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = BertReader::load(dir.path().to_str().unwrap(), &QaConfig::default())
            .err()
            .unwrap();
        match err {
            PipelineError::ModelLoad { location, .. } => assert!(location.ends_with("config.json")),
            other => panic!("erro inesperado: {other:?}"),
        }
    }

    #[test]
    fn test_missing_weights_reported() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("config.json"), "{}").unwrap();
        std::fs::write(dir.path().join("vocab.txt"), "[PAD]\n").unwrap();
        let err = BertReader::load(dir.path().to_str().unwrap(), &QaConfig::default())
            .err()
            .unwrap();
        match err {
            PipelineError::ModelLoad { location, .. } => assert!(location.ends_with("model.safetensors")),
            other => panic!("erro inesperado: {other:?}"),
        }
    }

    #[test]
    fn test_best_span_stays_inside_context() {
        let start = [9.0, 1.0, 0.5, 3.0, 0.1];
        let end = [9.0, 0.2, 0.1, 2.5, 4.0];
        let in_context = [false, false, true, true, true];
        assert_eq!(best_span(&start, &end, &in_context, 30), Some((3, 4, 7.0)));
        assert_eq!(best_span(&start, &end, &in_context, 1), Some((3, 3, 5.5)));
    }

    #[test]
    fn test_best_span_without_context_tokens() {
        assert_eq!(best_span(&[1.0, 2.0], &[1.0, 2.0], &[false, false], 5), None);
    }

    #[test]
    fn test_softmax_sums_to_one() {
        let p = softmax(&[1.0, 2.0, 3.0]);
        assert!((p.iter().sum::<f32>() - 1.0).abs() < 1e-5);
        assert!(p[2] > p[1] && p[1] > p[0]);
    }

    #[test]
    fn test_repo_id_detection() {
        assert!(looks_like_repo_id("deepset/bert-base-cased-squad2"));
        assert!(!looks_like_repo_id("./models/bert"));
        assert!(!looks_like_repo_id("/abs/models/bert"));
        assert!(!looks_like_repo_id("models"));
    }
}
