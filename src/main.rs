//! # curriculum-map: CLI
//!
//! Cada subcomando executa um estágio do pipeline sobre o diretório de dados.
//!
//! ```text
//! main()
//!   ├── Parsing da CLI (clap)
//!   ├── Configura tracing (RUST_LOG ou -v/-vv)
//!   ├── Carrega PipelineConfig (--config, curriculum-map.toml ou defaults)
//!   ├── Aplica overrides da CLI
//!   └── Executa o estágio pedido
//! ```
//!
//! ## Exemplo de Uso
//!
//! ```bash
//! curriculum-map collect --source seed --source notes/biology.txt --subject science
//! curriculum-map validate
//! curriculum-map extract
//! curriculum-map generate --max-questions 50
//! curriculum-map answer --question "What does photosynthesis convert light into?" \
//!     --context "Photosynthesis converts light into chemical energy."
//! curriculum-map visualize --max-nodes 20
//!
//! # Tudo de uma vez, com logs detalhados
//! RUST_LOG=debug curriculum-map run
//! ```

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{ArgAction, Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use curriculum_map::collector::{SourceFormat, SourceSpec};
use curriculum_map::config::PipelineConfig;
use curriculum_map::persistence::DataDir;
use curriculum_map::pipeline;
use curriculum_map::qa::{self, ModelKind, QaEngine, NO_ANSWER_MESSAGE};

#[derive(Parser, Debug)]
#[command(name = "curriculum-map", version, about = "Pipeline de mapas de conceitos a partir de material curricular")]
struct Cli {
    /// Arquivo TOML de configuração.
    #[arg(long, global = true, env = "CURRICULUM_MAP_CONFIG")]
    config: Option<PathBuf>,

    /// Diretório de dados (sobrescreve `data_dir` do config).
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// -v = debug, -vv = trace. `RUST_LOG` tem precedência.
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Coleta fontes em documents/.
    Collect(SourceArgs),
    /// Valida os documentos coletados.
    Validate,
    /// Extrai o mapa de conceitos dos documentos aceitos.
    Extract,
    /// Gera perguntas a partir do mapa.
    Generate {
        #[arg(long)]
        max_questions: Option<usize>,
        /// Preenche as respostas esperadas com um modelo de QA.
        #[arg(long, value_enum)]
        answer_with: Option<ModelKind>,
        #[command(flatten)]
        model: ModelArgs,
    },
    /// Responde uma pergunta avulsa ou todas de questions.json.
    Answer {
        #[arg(long, requires = "context")]
        question: Option<String>,
        #[arg(long, requires = "question")]
        context: Option<String>,
        #[command(flatten)]
        model: ModelArgs,
    },
    /// Mede carga, memória e latência do modelo de QA.
    Benchmark {
        #[command(flatten)]
        model: ModelArgs,
    },
    /// Renderiza o mapa de conceitos em SVG.
    Visualize {
        #[arg(long)]
        max_nodes: Option<usize>,
        #[arg(long)]
        output: Option<PathBuf>,
        #[arg(long)]
        title: Option<String>,
    },
    /// collect, validate, extract, generate e visualize em sequência.
    Run(SourceArgs),
}

#[derive(Args, Debug)]
struct SourceArgs {
    /// Caminho, URL ou `seed` (repetível).
    #[arg(long = "source")]
    sources: Vec<String>,
    #[arg(long)]
    subject: Option<String>,
    #[arg(long)]
    grade_level: Option<String>,
    #[arg(long, value_enum)]
    format: Option<SourceFormat>,
}

impl SourceArgs {
    fn specs(&self) -> Vec<SourceSpec> {
        self.sources
            .iter()
            .map(|location| {
                let mut spec = SourceSpec::new(location.as_str());
                if let Some(subject) = &self.subject {
                    spec.subject = subject.clone();
                }
                if let Some(format) = self.format {
                    spec.format = format;
                }
                spec.grade_level = self.grade_level.clone();
                spec
            })
            .collect()
    }
}

#[derive(Args, Debug)]
struct ModelArgs {
    #[arg(long, value_enum)]
    model_kind: Option<ModelKind>,
    /// Diretório local ou repo do HuggingFace Hub (para `bert`).
    #[arg(long)]
    model: Option<String>,
}

impl ModelArgs {
    fn apply(&self, config: &mut PipelineConfig) {
        if let Some(kind) = self.model_kind {
            config.qa.model_kind = kind;
        }
        if let Some(path) = &self.model {
            config.qa.model_path = Some(path.clone());
        }
    }
}

fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)))
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let mut config = PipelineConfig::load(cli.config.as_deref()).context("Falha ao carregar configuração")?;
    if let Some(dir) = &cli.data_dir {
        config.data_dir = dir.clone();
    }
    let data = DataDir::new(config.data_dir.clone());
    tracing::debug!(data_dir = %data.root().display(), "Diretório de dados");

    match cli.command {
        Command::Collect(args) => {
            let report = pipeline::collect(&config, &data, &args.specs()).context("Falha na coleta")?;
            println!(
                "{} documentos coletados, {} duplicados, {} fontes puladas",
                report.collected.len(),
                report.duplicates,
                report.skipped.len()
            );
            for skipped in &report.skipped {
                println!("  pulada: {} ({})", skipped.source, skipped.reason);
            }
        }
        Command::Validate => {
            let report = pipeline::validate(&config, &data).context("Falha na validação")?;
            println!("{} aceitos, {} rejeitados", report.accepted_count(), report.rejected_count());
        }
        Command::Extract => {
            let map = pipeline::extract(&config, &data).context("Falha na extração de conceitos")?;
            println!("{} conceitos, {} arestas", map.node_count(), map.edge_count());
        }
        Command::Generate {
            max_questions,
            answer_with,
            model,
        } => {
            if max_questions.is_some() {
                config.questions.max_questions = max_questions;
            }
            model.apply(&mut config);
            let answerer = match answer_with {
                Some(kind) => {
                    config.qa.model_kind = kind;
                    Some(qa::load_model(&config.qa).context("Falha ao carregar modelo de QA")?)
                }
                None => None,
            };
            let set = pipeline::generate(&config, &data, answerer.as_deref()).context("Falha na geração de perguntas")?;
            println!("{} perguntas em {}", set.len(), data.questions_json_path().display());
        }
        Command::Answer {
            question,
            context,
            model,
        } => {
            model.apply(&mut config);
            let engine = QaEngine::load(&config.qa).context("Falha ao carregar modelo de QA")?;
            match (question, context) {
                (Some(question), Some(context)) => {
                    let answer = engine.answer(&question, &context).context("Falha na inferência")?;
                    if answer.is_empty() {
                        println!("{NO_ANSWER_MESSAGE}");
                    } else {
                        println!("{} (confiança {:.2})", answer.text, answer.confidence);
                    }
                }
                _ => {
                    let answers = pipeline::answer_questions(&engine, &data).context("Falha ao responder perguntas")?;
                    for record in &answers.answers {
                        let text = if record.answer.is_empty() {
                            NO_ANSWER_MESSAGE
                        } else {
                            record.answer.text.as_str()
                        };
                        println!("{} {} → {}", record.question_id, record.question, text);
                    }
                }
            }
        }
        Command::Benchmark { model } => {
            model.apply(&mut config);
            let report = pipeline::benchmark(&config, &data).context("Falha no benchmark")?;
            for (i, sample) in report.samples.iter().enumerate() {
                let text = if sample.answer.is_empty() {
                    NO_ANSWER_MESSAGE
                } else {
                    sample.answer.text.as_str()
                };
                println!("{:>2}. {} → {} ({:.2}ms)", i + 1, sample.question, text, sample.latency_ms);
            }
            println!("{}", report.summary_line());
        }
        Command::Visualize {
            max_nodes,
            output,
            title,
        } => {
            if let Some(max_nodes) = max_nodes {
                config.visualizer.max_nodes = max_nodes;
            }
            let path = pipeline::visualize(&config, &data, output.as_deref(), title.as_deref())
                .context("Falha na visualização")?;
            println!("SVG gravado em {}", path.display());
        }
        Command::Run(args) => {
            pipeline::run_all(&config, &data, &args.specs()).context("Falha no pipeline")?;
            println!("Pipeline concluído em {}", data.root().display());
        }
    }
    Ok(())
}
