//! Application entry point: geo-compliance CLI.
//!
//! # Startup sequence
//!
//! 1. Parse the command line.
//! 2. Load [`AppConfig`] (`--config` path or the platform default), then
//!    apply `OPENAI_API_KEY` and CLI overrides.
//! 3. Initialise logging from `log_level` (`-v` raises it to `debug`,
//!    `RUST_LOG` wins over both).
//! 4. Build a current-thread [`tokio`] runtime and run the subcommand.
//!
//! Fatal errors bubble up as `anyhow::Error`, which prints the message and
//! exits with status 1.

mod cli;

use std::path::Path;

use anyhow::{bail, Context, Result};
use clap::Parser;
use geo_compliance::{
    config::{AppConfig, AppPaths},
    pipeline::{write_sample_csv, BatchReport, BatchRunner, ComplianceAnalyzer},
    verdict::FinalVerdict,
};

use cli::{Cli, Commands};

// ---------------------------------------------------------------------------
// main
// ---------------------------------------------------------------------------

fn main() -> Result<()> {
    // 1. Command line
    let cli = Cli::parse();

    // 2. Configuration
    let settings = AppPaths::settings_path(cli.config.as_deref());
    let (mut config, config_warning) = if cli.config.is_some() {
        if !settings.exists() {
            bail!("config file not found: {}", settings.display());
        }
        (AppConfig::load_from(&settings)?, None)
    } else {
        match AppConfig::load() {
            Ok(config) => (config, None),
            Err(e) => (AppConfig::default(), Some(e)),
        }
    };
    config.apply_env();
    apply_overrides(&mut config, &cli.command);

    // 3. Logging
    let level = if cli.command.verbose() {
        "debug".to_string()
    } else {
        config.log_level.clone()
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();
    if let Some(e) = config_warning {
        log::warn!("Failed to load config ({e:#}); using defaults");
    }

    // 4. Runtime
    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("failed to create tokio runtime")?;

    rt.block_on(run(cli.command, config))
}

fn apply_overrides(config: &mut AppConfig, command: &Commands) {
    let (api_key, model) = match command {
        Commands::Analyze { api_key, model, .. } | Commands::Check { api_key, model, .. } => {
            (api_key, model)
        }
        Commands::CreateSample { .. } => return,
    };
    if let Some(key) = api_key.as_ref().filter(|k| !k.trim().is_empty()) {
        config.llm.api_key = Some(key.clone());
    }
    if let Some(model) = model {
        config.llm.model = model.clone();
    }
}

// ---------------------------------------------------------------------------
// Subcommands
// ---------------------------------------------------------------------------

async fn run(command: Commands, config: AppConfig) -> Result<()> {
    match command {
        Commands::Analyze {
            input,
            output,
            verbose,
            ..
        } => analyze(&config, &input, output.as_deref(), verbose).await,
        Commands::Check {
            title,
            description,
            documents,
            ..
        } => check(&config, &title, &description, &documents).await,
        Commands::CreateSample { output } => create_sample(&output),
    }
}

async fn analyze(
    config: &AppConfig,
    input: &Path,
    output: Option<&Path>,
    verbose: bool,
) -> Result<()> {
    warn_if_no_key(config);
    println!("Analyzing features from '{}'...", input.display());

    let runner = BatchRunner::from_config(&config.llm);
    let report = runner
        .run_file(input, output)
        .await
        .with_context(|| format!("analysis of {} failed", input.display()))?;

    println!("\nAnalysis Summary:\n{}", report.summary);

    match output {
        Some(path) => println!("\nResults saved to '{}'", path.display()),
        None => {
            println!("\nResults:");
            print!("{}", render_table(&report));
        }
    }

    if verbose {
        println!("\nDetailed Results:");
        for verdict in &report.rows {
            print!("{}", render_detail(verdict));
        }
    }
    Ok(())
}

async fn check(config: &AppConfig, title: &str, description: &str, documents: &str) -> Result<()> {
    if title.trim().is_empty() || description.trim().is_empty() {
        bail!("both --title and --description must be non-empty");
    }
    warn_if_no_key(config);

    let analyzer = ComplianceAnalyzer::from_config(&config.llm);
    let verdict = analyzer
        .analyze_feature(title.trim(), description.trim(), documents)
        .await;
    print!("{}", render_detail(&verdict));
    Ok(())
}

fn create_sample(output: &Path) -> Result<()> {
    let rows = write_sample_csv(output)
        .with_context(|| format!("creating sample file {}", output.display()))?;
    println!("Sample CSV file created: '{}'", output.display());
    println!("Contains {rows} example features");
    println!("\nAnalyze it with:\n   geo-compliance analyze {}", output.display());
    Ok(())
}

fn warn_if_no_key(config: &AppConfig) {
    if config.llm.api_key().is_none() {
        log::warn!(
            "No API key configured (--api-key or OPENAI_API_KEY); \
             features without keyword hits will be marked Needs Review"
        );
    }
}

// ---------------------------------------------------------------------------
// Rendering
// ---------------------------------------------------------------------------

fn render_table(report: &BatchReport) -> String {
    let headers = ["Title", "Needs Geo-Compliance Logic?", "Confidence", "Related Regulations"];
    let rows: Vec<[String; 4]> = report
        .rows
        .iter()
        .map(|v| {
            [
                v.title.clone(),
                v.decision.to_string(),
                v.confidence.to_string(),
                v.regulations.iter().cloned().collect::<Vec<_>>().join(", "),
            ]
        })
        .collect();

    let mut widths = headers.map(|h| h.chars().count());
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let mut out = String::new();
    let mut push_line = |cells: &[&str]| {
        let line: Vec<String> = cells
            .iter()
            .zip(widths)
            .map(|(cell, width)| format!("{cell:<width$}"))
            .collect();
        out.push_str(line.join("  ").trim_end());
        out.push('\n');
    };
    push_line(&headers);
    for row in &rows {
        let cells: Vec<&str> = row.iter().map(String::as_str).collect();
        push_line(&cells);
    }
    out
}

fn render_detail(verdict: &FinalVerdict) -> String {
    let mut out = format!("\n{}\n", verdict.title);
    out.push_str(&format!("   Needs Compliance: {}\n", verdict.decision));
    out.push_str(&format!("   Confidence: {}\n", verdict.confidence));
    out.push_str(&format!("   Reasoning: {}\n", verdict.reasoning));
    if !verdict.regulations.is_empty() {
        let regs: Vec<&str> = verdict.regulations.iter().map(String::as_str).collect();
        out.push_str(&format!("   Related Regulations: {}\n", regs.join(", ")));
    }
    if !verdict.matched_keywords.is_empty() {
        out.push_str(&format!(
            "   Keywords Found: {}\n",
            verdict.matched_keywords.join(", ")
        ));
    }
    out
}
