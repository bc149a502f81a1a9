//! sandeul: command-line front-end for the SANDEUL cleaner service.
//!
//! Configuration (environment variables):
//!   CLEANER_API_BASE       - Service base URL (default: http://localhost:8000)
//!   CLEANER_TIMEOUT_SECS   - Request timeout in seconds (default: 30)
//!   SANDEUL_LOG_FORMAT     - "json" for structured logging, anything else for plain text
//!   RUST_LOG               - Log filter (default: sandeul_cleaner=info)

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use clap::{Parser, Subcommand};

use sandeul_cleaner::browser::{StudentBrowser, summarize};
use sandeul_cleaner::catalog::{DatasetField, GenerationTab};
use sandeul_cleaner::client::CleanerClient;
use sandeul_cleaner::config::ClientConfig;
use sandeul_cleaner::insights::{CorrelationView, PredictionView, parse_generation_filter};
use sandeul_cleaner::upload::{UploadBuckets, UploadFile};

#[derive(Parser, Debug)]
#[command(author, version, about = "SANDEUL cleaner service client")]
struct Cli {
    /// Service base URL; overrides CLEANER_API_BASE and the config file.
    #[arg(long, global = true)]
    base_url: Option<String>,
    /// JSON client configuration file.
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    cmd: Cmd,
}

#[derive(Subcommand, Debug)]
enum Cmd {
    /// Upload dataset sheets for one generation and run the cleaner.
    Clean {
        #[arg(long)]
        generation: u32,
        /// `field=path`, e.g. `grade=grades.xlsx`. Repeatable.
        #[arg(long = "file", value_name = "FIELD=PATH", required = true)]
        files: Vec<String>,
    },
    /// Predict the label of one student.
    Predict { student_hash: String },
    /// Show feature/label correlations.
    Correlation {
        #[arg(long)]
        generation: Option<String>,
    },
    /// List cleaned student datasets.
    Students {
        /// Generation number or `all`.
        #[arg(long, default_value = "all")]
        generation: GenerationTab,
        /// Print every row instead of a one-line summary per dataset.
        #[arg(long, default_value_t = false)]
        full: bool,
    },
    /// Reveal student names with a PKCS#8 RSA private key.
    Reveal {
        /// PEM file holding the private key.
        #[arg(long)]
        key: PathBuf,
        #[arg(long, default_value = "all")]
        generation: GenerationTab,
        /// Also print student hashes.
        #[arg(long, default_value_t = false)]
        show_hash: bool,
    },
}

fn init_tracing() {
    let log_format = std::env::var("SANDEUL_LOG_FORMAT").unwrap_or_default();
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "sandeul_cleaner=info".into());
    if log_format == "json" {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(env_filter)
            .with_writer(std::io::stderr)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_writer(std::io::stderr)
            .init();
    }
}

fn load_config(cli: &Cli) -> Result<ClientConfig> {
    let mut config = match &cli.config {
        Some(path) => ClientConfig::from_file(path)
            .with_context(|| format!("reading {}", path.display()))?,
        None => ClientConfig::from_env(),
    };
    if let Some(base_url) = &cli.base_url {
        config.set_base_url(base_url.clone());
    }
    Ok(config)
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    let client = CleanerClient::new(load_config(&cli)?)?;

    match cli.cmd {
        Cmd::Clean { generation, files } => cmd_clean(&client, generation, &files).await,
        Cmd::Predict { student_hash } => cmd_predict(&client, &student_hash).await,
        Cmd::Correlation { generation } => cmd_correlation(&client, generation.as_deref()).await,
        Cmd::Students { generation, full } => cmd_students(&client, generation, full).await,
        Cmd::Reveal {
            key,
            generation,
            show_hash,
        } => cmd_reveal(&client, &key, generation, show_hash).await,
    }
}

async fn cmd_clean(client: &CleanerClient, generation: u32, file_args: &[String]) -> Result<()> {
    let mut buckets = UploadBuckets::new();
    buckets.set_active_generation(generation);

    for arg in file_args {
        let (field, path) = arg
            .split_once('=')
            .ok_or_else(|| anyhow!("expected FIELD=PATH, got {:?}", arg))?;
        let field: DatasetField = field.parse()?;
        let file = UploadFile::from_path(path)
            .await
            .with_context(|| format!("reading {}", path))?;
        buckets.add_files(generation, field, vec![file]);
    }

    let response = buckets.submit(client).await?;
    println!("request {} / generation {}", response.request_id, response.generation);
    for result in &response.results {
        let note = result
            .message
            .as_deref()
            .or(result.detail.as_deref())
            .unwrap_or("");
        match result.sqlite_rows {
            Some(rows) => println!("  {:<14} {:<5} {} rows {}", result.dataset, result.status, rows, note),
            None => println!("  {:<14} {:<5} {}", result.dataset, result.status, note),
        }
    }
    if !response.success {
        return Err(anyhow!("cleaning finished with errors"));
    }
    Ok(())
}

async fn cmd_predict(client: &CleanerClient, student_hash: &str) -> Result<()> {
    let response = client.request_student_prediction(student_hash).await?;
    let view = PredictionView::from_response(&response);

    println!("student     {}", view.student_hash);
    println!("generation  {}", view.generation);
    println!("prediction  {} ({})", view.prediction, view.confidence_percent());
    println!("actual      {}", view.actual_label);
    if let Some(model) = &view.model_artifact {
        println!("model       {}", model);
    }
    for entry in &view.probabilities {
        let marker = if entry.is_prediction { "*" } else { " " };
        println!("  {} {:<12} {:>6}", marker, entry.label, entry.percent());
    }
    if !view.features_used.is_empty() {
        println!("features    {}", view.features_used.join(", "));
    }
    Ok(())
}

async fn cmd_correlation(client: &CleanerClient, generation: Option<&str>) -> Result<()> {
    let generation = generation.map(parse_generation_filter).transpose()?;
    let response = client.fetch_correlations(generation).await?;
    let view = CorrelationView::from_response(&response);

    println!(
        "label {} / rows {} of {} / features {}",
        view.label, view.rows_used, view.rows_received, view.features_analyzed
    );
    for row in &view.correlations {
        println!(
            "  {:<28} {:>7.3} {:>6.3} {:>6}",
            row.feature, row.pearson, row.absolute, row.overlap_rows
        );
    }
    if !view.skipped_features.is_empty() {
        println!("skipped: {}", view.skipped_features.join(", "));
    }
    Ok(())
}

async fn cmd_students(client: &CleanerClient, tab: GenerationTab, full: bool) -> Result<()> {
    let mut browser = StudentBrowser::new();
    browser.set_active_tab(tab);
    browser.condensed = !full;
    browser.show_hash = true;
    browser.refresh(client).await?;
    print_students(&browser);
    Ok(())
}

async fn cmd_reveal(
    client: &CleanerClient,
    key: &Path,
    tab: GenerationTab,
    show_hash: bool,
) -> Result<()> {
    let mut browser = StudentBrowser::new();
    if !browser.can_reveal() {
        return Err(anyhow!("this build has no decryption backend (enable the `reveal` feature)"));
    }
    browser.set_active_tab(tab);
    browser.show_hash = show_hash;
    browser.refresh(client).await?;

    let pem = tokio::fs::read_to_string(key)
        .await
        .with_context(|| format!("reading {}", key.display()))?;
    browser.set_private_key(pem);
    let names = browser.reveal(client).await?;
    eprintln!("revealed {} / failed {}", names.revealed_count(), names.failed_count());

    print_students(&browser);
    Ok(())
}

fn print_students(browser: &StudentBrowser) {
    println!(
        "{} students, {} datasets ({})",
        browser.students().len(),
        browser.total_datasets(),
        browser.active_tab().label()
    );

    for entry in browser.entries() {
        if entry.first_of_student {
            let mut header = format!("#{:<4} {}기", entry.student_index, entry.student.generation);
            if browser.decrypted_column_visible() {
                let name = browser
                    .display_name(&entry.student.student_hash)
                    .unwrap_or_else(|| "-".to_string());
                header.push_str(&format!("  {}", name));
            }
            if browser.show_hash {
                header.push_str(&format!("  {}", entry.student.student_hash));
            }
            println!("{}", header);
        }

        if browser.condensed {
            println!("    {:<12} {}", entry.dataset_label, summarize(entry.rows));
            continue;
        }

        println!("    {} ({}행)", entry.dataset_label, entry.rows.len());
        if entry.rows.is_empty() {
            continue;
        }
        println!("      {}", entry.column_keys.join(" | "));
        for row in entry.rows {
            let cells: Vec<String> = entry
                .column_keys
                .iter()
                .map(|k| {
                    row.get(*k)
                        .map(sandeul_cleaner::browser::format_cell_value)
                        .unwrap_or_else(|| "-".to_string())
                })
                .collect();
            println!("      {}", cells.join(" | "));
        }
    }
}
