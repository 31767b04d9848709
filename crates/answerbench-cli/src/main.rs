//! CLI for answerbench - LLM-judged evaluation of question-answering services.

mod progress;

use answerbench_core::config::{load_config_with_overrides, ConfigOverrides, EvalConfig};
use answerbench_core::orchestrator::BatchOrchestrator;
use answerbench_core::probe::{probe, Probed};
use answerbench_core::report::{ReportBuilder, REPORT_OUTPUT_PATH, REPORT_TEMPLATE_PATH};
use answerbench_core::types::{CaseSet, EvaluationResult, Verdict};
use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use console::style;
use progress::ProgressDisplay;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Debug, Parser)]
#[command(
    name = "answerbench",
    about = "Evaluate a question-answering service with an LLM judge"
)]
struct Cli {
    /// Path to the evaluation configuration file.
    #[arg(short, long, default_value = "answerbench.yaml")]
    config: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Initialize a new answerbench project with example files.
    Init {
        /// Overwrite existing files.
        #[arg(long)]
        force: bool,
    },

    /// Load and print the parsed configuration.
    ShowConfig,

    /// Check that the configured SUT endpoint answers.
    Probe,

    /// Run every test case through the pipeline and export the report.
    Run {
        /// JSONL file with one {"question", "expected"} object per line.
        #[arg(long)]
        cases: PathBuf,
        /// Evaluate at most N cases.
        #[arg(long)]
        limit: Option<usize>,
        /// Output spreadsheet path.
        #[arg(short, long, default_value = REPORT_OUTPUT_PATH)]
        out: PathBuf,
        /// Template spreadsheet path.
        #[arg(long, default_value = REPORT_TEMPLATE_PATH)]
        template: PathBuf,
        /// Trust the endpoint and skip the connection probe.
        #[arg(long)]
        skip_probe: bool,
        /// Override the per-request timeout in seconds.
        #[arg(long)]
        timeout: Option<f64>,
        /// Override the judge model.
        #[arg(long)]
        judge_model: Option<String>,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    if let Command::Init { force } = cli.command {
        return init_project(force);
    }

    let overrides = match &cli.command {
        Command::Run {
            timeout,
            judge_model,
            ..
        } => ConfigOverrides {
            timeout_seconds: *timeout,
            judge_model: judge_model.clone(),
        },
        _ => ConfigOverrides::default(),
    };

    let config = load_config_with_overrides(&cli.config, overrides)
        .with_context(|| format!("failed to load {}", cli.config))?;

    match cli.command {
        Command::Init { .. } => unreachable!(),
        Command::ShowConfig => {
            let yaml = serde_yaml::to_string(&config)?;
            println!("{yaml}");
            Ok(())
        }
        Command::Probe => {
            let rt = tokio::runtime::Runtime::new()?;
            let probed = rt.block_on(run_probe(&config))?;
            if probed.reachable {
                Ok(())
            } else {
                Err(anyhow!("SUT is unreachable"))
            }
        }
        Command::Run {
            cases,
            limit,
            out,
            template,
            skip_probe,
            ..
        } => {
            let case_set = CaseSet::from_jsonl(&cases, limit)
                .with_context(|| format!("failed to load cases from {}", cases.display()))?;
            if case_set.is_empty() {
                return Err(anyhow!("no cases found in {}", cases.display()));
            }
            println!(
                "Loaded {} case(s) from {}",
                case_set.len(),
                cases.display()
            );

            let rt = tokio::runtime::Runtime::new()?;
            let results = rt.block_on(run_batch(&config, &case_set, skip_probe))?;

            ReportBuilder::new(&template).export_to_file(&results, &out)?;
            println!("Report written to {}", out.display());
            print_summary(&results);
            Ok(())
        }
    }
}

const INIT_CONFIG: &str = r#"sut:
  base_url: http://localhost:8000
  path: /ask
  method: POST
  headers: []
judge:
  api_key: ${OPENAI_API_KEY}
  model: gpt-4o-mini
  temperature: 0.0
  verbosity: brief
# timeout_seconds: 30.0
"#;

const INIT_CASES: &str = r#"{"question": "What is the capital of Spain?", "expected": "Madrid"}
{"question": "What is the capital of France?", "expected": "Paris"}
"#;

fn init_project(force: bool) -> Result<()> {
    let mut created_files = Vec::new();

    let config_path = PathBuf::from("answerbench.yaml");
    if config_path.exists() && !force {
        return Err(anyhow!(
            "answerbench.yaml already exists. Use --force to overwrite."
        ));
    }
    std::fs::write(&config_path, INIT_CONFIG)?;
    created_files.push("answerbench.yaml");

    let cases_path = PathBuf::from("cases.jsonl");
    if cases_path.exists() && !force {
        return Err(anyhow!("cases.jsonl already exists. Use --force to overwrite."));
    }
    std::fs::write(&cases_path, INIT_CASES)?;
    created_files.push("cases.jsonl");

    let template_path = PathBuf::from(REPORT_TEMPLATE_PATH);
    if template_path.exists() && !force {
        return Err(anyhow!(
            "{REPORT_TEMPLATE_PATH} already exists. Use --force to overwrite."
        ));
    }
    if let Some(parent) = template_path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    answerbench_core::report::create_default_template(&template_path)?;
    created_files.push(REPORT_TEMPLATE_PATH);

    println!("Created answerbench project:");
    for file in &created_files {
        println!("  {file}");
    }
    println!("\nNext steps:");
    println!("  1. Set your judge API key: export OPENAI_API_KEY=sk-...");
    println!("  2. Point sut.base_url at the service to evaluate");
    println!("  3. Run: answerbench run --cases cases.jsonl");

    Ok(())
}

async fn run_probe(config: &EvalConfig) -> Result<Probed> {
    let client = config.build_client()?;
    let probed = probe(&client, config).await;
    let marker = if probed.reachable {
        style("✓").green().bold()
    } else {
        style("✗").red().bold()
    };
    println!("{marker} {}", probed.message);
    Ok(probed)
}

async fn run_batch(
    config: &EvalConfig,
    case_set: &CaseSet,
    skip_probe: bool,
) -> Result<Vec<EvaluationResult>> {
    let mut orchestrator =
        BatchOrchestrator::new().with_reporter(Arc::new(ProgressDisplay::new()));

    if skip_probe {
        orchestrator.record_probe(&Probed {
            reachable: true,
            message: "probe skipped".into(),
        });
    } else {
        let probed = run_probe(config).await?;
        if !probed.reachable {
            return Err(anyhow!("SUT is unreachable; aborting"));
        }
        orchestrator.record_probe(&probed);
    }

    let results = orchestrator.run_all(case_set.cases(), config).await?;
    Ok(results)
}

fn print_summary(results: &[EvaluationResult]) {
    let total = results.len();
    let passed = results
        .iter()
        .filter(|r| r.verdict.final_verdict == Verdict::Pass)
        .count();
    let mean = if total > 0 {
        results.iter().map(|r| r.average_score).sum::<f64>() / total as f64
    } else {
        0.0
    };

    println!();
    println!(
        "  {} {}/{}",
        style("Passed:").dim(),
        style(passed).green().bold(),
        total
    );
    println!(
        "  {} {}",
        style("Failed:").dim(),
        style(total - passed).red().bold()
    );
    println!("  {} {:.3}", style("Mean score:").dim(), mean);

    let failures: Vec<&EvaluationResult> = results
        .iter()
        .filter(|r| r.verdict.final_verdict == Verdict::Fail)
        .collect();
    if !failures.is_empty() {
        println!("\nFailures (showing up to 10):");
        for r in failures.iter().take(10) {
            println!(
                "  - case {}: {}",
                r.case_id,
                answerbench_core::types::truncate_preview(&r.verdict.final_comment, 80)
            );
        }
        if failures.len() > 10 {
            println!("  ... and {} more", failures.len() - 10);
        }
    }
}
