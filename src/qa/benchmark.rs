//! # Benchmark do QA
//!
//! Mede o tempo de carga do modelo, a memória do processo e a latência por
//! pergunta sobre um conjunto fixo de pares pergunta/contexto, no mesmo
//! formato curto que o Question Generator produz.

use std::time::Instant;

use serde::Serialize;

use crate::config::QaConfig;
use crate::core::Answer;
use crate::error::Result;
use crate::metrics::{collect_metrics, ProcessMetrics};

use super::{load_model, AnswerModel};

/// Pares (pergunta, contexto) do benchmark padrão.
pub const BENCHMARK_SAMPLES: &[(&str, &str)] = &[
    ("What does a delete query delete?", "a delete query delete a record."),
    ("Who or what increases the rate?", "positive catalyst increase the rate."),
    ("What does convex lens produce?", "convex lens produce clear image."),
    ("What is the relationship between food and energy?", "food supply energy."),
    ("What does the government revise?", "the government revise the former policy."),
    ("What is the relationship between a rootkit and log files?", "a rootkit access log files."),
    ("What does a rootkit access?", "a rootkit access log files."),
    ("What objects seamless computer science?", "kitchen appliances object seamless computer science."),
    ("Who or what access data?", "people access data."),
    ("What does different places like?", "different places like hospital."),
    (
        "What is the relationship between the device fire and the machine theft?",
        "the device fire burn the machine theft.",
    ),
    ("What burns the machine theft?", "the device fire burn the machine theft."),
    ("What follows the following steps?", "decimal follow the following steps."),
    ("What opens a data file?", "storing records open a data file."),
    ("What does bus topology use?", "bus topology use a segment."),
    ("What does many operating systems build?", "many operating systems build features."),
    ("Who or what build features?", "many operating systems build features."),
    ("What does mail programs like?", "mail programs like eudora."),
    ("What does vowels declare function count?", "vowels declare function count a cls input type."),
    ("What wiped a computer s data?", "cybercriminals wipe a computer s data."),
    ("What describes the legal issues?", "cyber law describe the legal issues."),
    ("What does a rem display?", "a rem display all the records."),
    ("What does networking provide?", "networking provide the facility."),
];

#[derive(Clone, Debug, Serialize)]
pub struct SampleResult {
    pub question: String,
    pub context: String,
    pub answer: Answer,
    pub latency_ms: f64,
}

#[derive(Clone, Debug, Serialize)]
pub struct BenchmarkReport {
    pub model: String,
    pub load_ms: f64,
    pub after_load: ProcessMetrics,
    pub after_inference: ProcessMetrics,
    pub samples: Vec<SampleResult>,
    pub min_latency_ms: f64,
    pub avg_latency_ms: f64,
    pub max_latency_ms: f64,
}

impl BenchmarkReport {
    pub fn summary_line(&self) -> String {
        format!(
            "{} | load {:.0}ms | {} amostras | latência min {:.2}ms avg {:.2}ms max {:.2}ms | {}",
            self.model,
            self.load_ms,
            self.samples.len(),
            self.min_latency_ms,
            self.avg_latency_ms,
            self.max_latency_ms,
            self.after_inference.summary_line(),
        )
    }
}

/// Carrega o modelo configurado e roda [`BENCHMARK_SAMPLES`].
pub fn run_benchmark(config: &QaConfig) -> Result<BenchmarkReport> {
    let started = Instant::now();
    let model = load_model(config)?;
    let load_ms = started.elapsed().as_secs_f64() * 1000.0;
    benchmark_model(model.as_ref(), load_ms, BENCHMARK_SAMPLES)
}

/// Roda `samples` contra um modelo já carregado.
pub fn benchmark_model(model: &dyn AnswerModel, load_ms: f64, samples: &[(&str, &str)]) -> Result<BenchmarkReport> {
    let after_load = collect_metrics();
    tracing::info!(
        model = model.name(),
        load_ms,
        memory_mb = after_load.memory_used_mb,
        "Modelo carregado para benchmark"
    );

    let mut results = Vec::with_capacity(samples.len());
    for (i, (question, context)) in samples.iter().enumerate() {
        let started = Instant::now();
        let answer = model.answer(question, context)?;
        let latency_ms = started.elapsed().as_secs_f64() * 1000.0;
        tracing::debug!(sample = i + 1, latency_ms, answer = %answer.text, "Amostra respondida");
        results.push(SampleResult {
            question: question.to_string(),
            context: context.to_string(),
            answer,
            latency_ms,
        });
    }

    let latencies: Vec<f64> = results.iter().map(|r| r.latency_ms).collect();
    let (min, max) = latencies
        .iter()
        .fold((f64::INFINITY, 0.0f64), |(lo, hi), &l| (lo.min(l), hi.max(l)));
    let avg = if latencies.is_empty() {
        0.0
    } else {
        latencies.iter().sum::<f64>() / latencies.len() as f64
    };

    Ok(BenchmarkReport {
        model: model.name().to_string(),
        load_ms,
        after_load,
        after_inference: collect_metrics(),
        samples: results,
        min_latency_ms: if latencies.is_empty() { 0.0 } else { min },
        avg_latency_ms: avg,
        max_latency_ms: max,
    })
}
