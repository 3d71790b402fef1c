//! openapi-contract CLI - check recorded HTTP responses against OpenAPI contracts

mod replay;

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

use openapi_contract_core::report::{render_console, render_markdown};
use openapi_contract_core::{Config, CoverageSummary, Exchange};
use openapi_contract_validator::ContractHarness;

#[derive(Parser)]
#[command(name = "openapi-contract")]
#[command(about = "Check HTTP responses against OpenAPI contracts and report endpoint coverage")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, global = true, default_value = "terminal")]
    output: OutputFormat,

    /// Config file (default: .openapi-contract.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Max schema violations per response (0 = unlimited; overrides config)
    #[arg(long, global = true)]
    max_errors: Option<usize>,

    /// Verbose output (tracing to stderr, filter with RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a single response
    Validate {
        /// Contract name (default: default_spec from config)
        #[arg(short, long)]
        spec: Option<String>,

        /// HTTP method
        #[arg(short, long)]
        method: String,

        /// Request path as sent
        #[arg(short, long)]
        path: String,

        /// Response status code
        #[arg(long)]
        status: u16,

        /// Response Content-Type header
        #[arg(long)]
        content_type: Option<String>,

        /// File holding the raw response body
        #[arg(long)]
        body: Option<PathBuf>,
    },

    /// Replay recorded exchanges (JSONL) and report coverage
    Replay {
        /// Exchange log, one JSON object per line
        #[arg(short, long)]
        log: PathBuf,

        /// Contract for exchanges that do not name one
        #[arg(short, long)]
        spec: Option<String>,

        /// Also write the Markdown coverage report to this file
        #[arg(long)]
        markdown: Option<PathBuf>,
    },

    /// Initialize config file
    Init,

    /// Export JSON Schema for the interchange formats
    Schema {
        /// Print the coverage report schema instead of the exchange schema
        #[arg(long)]
        report: bool,
    },
}

#[derive(Clone, Copy, ValueEnum, PartialEq, Eq)]
enum OutputFormat {
    Terminal,
    Json,
    Markdown,
    Silent,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    if cli.verbose {
        let filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"));
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    }

    match run(cli) {
        Ok(code) => ExitCode::from(u8::try_from(code).unwrap_or(1)),
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::from(3)
        }
    }
}

fn load_config(path: Option<&Path>, max_errors: Option<usize>) -> Result<Config> {
    let mut cfg = match path {
        Some(path) => Config::load(path)?,
        None => Config::load_default()?,
    };
    if let Some(n) = max_errors {
        cfg.max_errors = n;
    }
    Ok(cfg)
}

fn run(cli: Cli) -> Result<i32> {
    match cli.command {
        Commands::Validate {
            spec,
            method,
            path,
            status,
            content_type,
            body,
        } => {
            let cfg = load_config(cli.config.as_deref(), cli.max_errors)?;
            let contract = spec
                .or_else(|| cfg.default_spec.clone())
                .context("No contract given: pass --spec or set default_spec in the config")?;

            let mut exchange = Exchange::new(method, path, status);
            exchange.content_type = content_type;
            if let Some(file) = body {
                let raw = std::fs::read_to_string(&file)
                    .with_context(|| format!("Cannot read body file {}", file.display()))?;
                exchange = exchange.with_body(raw);
            }

            let mut harness = ContractHarness::from_config(&cfg);
            let verdict = match harness.check(&contract, &exchange) {
                Ok(verdict) => verdict,
                Err(openapi_contract_validator::HarnessError::Exchange(e)) => {
                    if cli.output != OutputFormat::Silent {
                        println!("FAIL: {e}");
                    }
                    return Ok(1);
                }
                Err(e) => return Err(e.into()),
            };

            match cli.output {
                OutputFormat::Terminal | OutputFormat::Markdown => {
                    let icon = if verdict.is_valid() { "PASS" } else { "FAIL" };
                    println!(
                        "{icon}: {} {} -> {} (spec: {contract})",
                        exchange.method.to_ascii_uppercase(),
                        exchange.path,
                        exchange.status_code
                    );
                    if let Some(template) = verdict.matched_path() {
                        println!("  Matched: {template}");
                    }
                    for err in verdict.errors() {
                        println!("  {err}");
                    }
                }
                OutputFormat::Json => {
                    let json_output = serde_json::json!({
                        "contract": contract,
                        "verdict": verdict,
                    });
                    println!("{}", serde_json::to_string_pretty(&json_output)?);
                }
                OutputFormat::Silent => {}
            }

            Ok(i32::from(!verdict.is_valid()))
        }

        Commands::Replay {
            log,
            spec,
            markdown,
        } => {
            let cfg = load_config(cli.config.as_deref(), cli.max_errors)?;
            let mut harness = ContractHarness::from_config(&cfg);
            if let Some(spec) = spec {
                harness = harness.with_default_spec(spec);
            }

            let exchanges = replay::load_exchanges(&log)?;
            if exchanges.is_empty() {
                eprintln!("Error: No exchanges found in {}.", log.display());
                return Ok(3);
            }

            if cli.output != OutputFormat::Silent {
                eprintln!("Config:");
                eprintln!("  contracts: {}", cfg.spec_base_path.display());
                if !cfg.strip_prefixes.is_empty() {
                    eprintln!("  strip:     {}", cfg.strip_prefixes.join(", "));
                }
                eprintln!("  exchanges: {}", exchanges.len());
                eprintln!();
            }

            let outcome = replay::replay(&mut harness, &exchanges)?;

            // Configured contracts first, then any other contract the log exercised
            let mut specs = cfg.specs.clone();
            for contract in &outcome.contracts {
                if !specs.contains(contract) {
                    specs.push(contract.clone());
                }
            }
            let reports = harness.coverage_reports(&specs);

            match cli.output {
                OutputFormat::Terminal => {
                    if !outcome.failures.is_empty() {
                        println!("Failures ({}):", outcome.failures.len());
                        for f in &outcome.failures {
                            println!(
                                "  line {}: [{}] {} {} -> {}",
                                f.line, f.contract, f.method, f.path, f.status_code
                            );
                            for err in &f.errors {
                                println!("         {err}");
                            }
                        }
                    }
                    let icon = if outcome.failures.is_empty() { "PASS" } else { "FAIL" };
                    println!(
                        "\n{icon}: {} exchanges, {} conform, {} violate the contract",
                        outcome.total,
                        outcome.passed,
                        outcome.failures.len()
                    );
                    print!("{}", render_console(&reports));
                }
                OutputFormat::Json => {
                    let mut coverage = CoverageSummary::default();
                    for report in reports.iter().cloned() {
                        coverage.insert(report);
                    }
                    let json_output = serde_json::json!({
                        "summary": outcome,
                        "coverage": coverage,
                    });
                    println!("{}", serde_json::to_string_pretty(&json_output)?);
                }
                OutputFormat::Markdown => {
                    for f in &outcome.failures {
                        eprintln!(
                            "line {}: {} {} -> {}: {}",
                            f.line,
                            f.method,
                            f.path,
                            f.status_code,
                            f.errors.join("; ")
                        );
                    }
                    print!("{}", render_markdown(&reports));
                }
                OutputFormat::Silent => {}
            }

            if let Some(path) = markdown {
                std::fs::write(&path, render_markdown(&reports))
                    .with_context(|| format!("Cannot write {}", path.display()))?;
                if cli.output != OutputFormat::Silent {
                    eprintln!("Markdown report: {}", path.display());
                }
            }

            Ok(outcome.exit_code())
        }

        Commands::Init => {
            let config_path = ".openapi-contract.toml";
            if Path::new(config_path).exists() {
                eprintln!("{config_path} already exists");
                return Ok(1);
            }

            std::fs::write(config_path, Config::example())?;
            println!("Created {config_path}");
            println!("\nEdit the file to configure:");
            println!("  - spec_base_path: directory with bundled contracts");
            println!("  - strip_prefixes: path prefixes your routes add");
            println!("  - specs: contracts included in the coverage report");
            Ok(0)
        }

        Commands::Schema { report } => {
            let schema = if report {
                openapi_contract_core::schema::generate_report_schema()
            } else {
                openapi_contract_core::schema::generate_schema()
            };
            println!("{schema}");
            Ok(0)
        }
    }
}
