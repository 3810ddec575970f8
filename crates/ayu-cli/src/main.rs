//! Ayu CLI: fill in and submit the patient intake form from the terminal.
//!
//! Reads AYU_API_URL and the other AYU_* settings from the environment or a
//! `.env` file.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use ayu_api_client::ApiClient;
use ayu_cli::{
    describe_schema, fill_field, init_tracing, load_files, parse_field, truncate_string,
    TerminalSurface,
};
use ayu_core::models::{FileCategory, FormSchema};
use ayu_core::{ErrorMetadata, IntakeConfig, IntakeError};
use ayu_intake::{SubmissionController, SubmitOutcome};
use clap::{Parser, Subcommand};
use serde::Serialize;

#[derive(Parser)]
#[command(name = "ayu", about = "Ayu patient intake CLI")]
struct Cli {
    /// Override AYU_API_URL
    #[arg(long, global = true)]
    api_url: Option<String>,

    /// Print raw JSON responses
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fill in the form and submit it with attached photos and reports
    Submit {
        /// Field value as name=value (repeatable)
        #[arg(long = "field", value_parser = parse_field)]
        fields: Vec<(String, String)>,
        /// Photo to attach (repeatable)
        #[arg(long = "photo")]
        photos: Vec<PathBuf>,
        /// Medical report to attach (repeatable)
        #[arg(long = "report")]
        reports: Vec<PathBuf>,
    },
    /// Check that the intake endpoint is reachable
    Health,
    /// Stored submission operations
    Submissions {
        #[command(subcommand)]
        sub: SubmissionCommands,
    },
    /// Print the form fields and their constraints
    Fields,
}

#[derive(Subcommand)]
enum SubmissionCommands {
    /// List stored submissions
    List,
    /// Get a single stored submission by ID
    Get {
        /// Submission ID
        id: String,
    },
}

fn print_json(value: &impl Serialize) -> anyhow::Result<()> {
    let out = serde_json::to_string_pretty(value).context("Serialize response")?;
    println!("{}", out);
    Ok(())
}

async fn submit(
    client: ApiClient,
    config: IntakeConfig,
    fields: Vec<(String, String)>,
    photos: Vec<PathBuf>,
    reports: Vec<PathBuf>,
    json: bool,
) -> anyhow::Result<()> {
    let controller = SubmissionController::builder(Arc::new(client))
        .config(config)
        .surface(Arc::new(TerminalSurface))
        .build();

    for (name, value) in &fields {
        fill_field(&controller, name, value).await?;
    }

    let photos = controller
        .select_files(FileCategory::Photo, load_files(&photos)?)
        .await;
    let reports = controller
        .select_files(FileCategory::Report, load_files(&reports)?)
        .await;
    let rejected = photos.rejections().count() + reports.rejections().count();
    if rejected > 0 {
        tracing::warn!(rejected, "Some files were not attached");
    }

    match controller.submit().await {
        Ok(SubmitOutcome::Submitted(receipt)) => {
            if json {
                print_json(&receipt)?;
            } else {
                println!(
                    "Submission {} accepted ({} photos, {} reports)",
                    receipt.submission_id.as_deref().unwrap_or("-"),
                    receipt.photos_uploaded.unwrap_or(0),
                    receipt.reports_uploaded.unwrap_or(0)
                );
            }
            Ok(())
        }
        Ok(SubmitOutcome::Ignored) => {
            Err(anyhow::anyhow!("A submission is already in progress"))
        }
        Err(IntakeError::FormIncomplete { fields }) => Err(anyhow::anyhow!(
            "Missing or invalid fields: {}",
            fields.join(", ")
        )),
        Err(e) => Err(anyhow::anyhow!(e.client_message())),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let cli = Cli::parse();

    let mut config = IntakeConfig::from_env().context("Failed to load configuration")?;
    if let Some(api_url) = cli.api_url {
        config.api_url = api_url;
        config.validate()?;
    }

    let client = ApiClient::from_config(&config).context(
        "Failed to create API client. Check AYU_API_URL and AYU_REQUEST_TIMEOUT_SECS",
    )?;

    match cli.command {
        Commands::Submit {
            fields,
            photos,
            reports,
        } => {
            submit(client, config, fields, photos, reports, cli.json).await?;
        }
        Commands::Health => {
            let status = client
                .health()
                .await
                .with_context(|| format!("Endpoint {} is not reachable", client.base_url()))?;
            if cli.json {
                print_json(&status)?;
            } else {
                println!("{}: {}", status.status, status.message.unwrap_or_default());
            }
        }
        Commands::Submissions { sub } => match sub {
            SubmissionCommands::List => {
                let list = client.list_submissions().await?;
                if cli.json {
                    print_json(&list)?;
                } else {
                    println!("{} submissions", list.count);
                    for submission in &list.submissions {
                        let field = |name: &str| {
                            submission
                                .get(name)
                                .and_then(|v| v.as_str())
                                .unwrap_or("-")
                                .to_string()
                        };
                        println!(
                            "{:<16} {:<24} {}",
                            field("submission_id"),
                            truncate_string(&field("patient_name"), 24),
                            truncate_string(&field("chief_complaint"), 40)
                        );
                    }
                }
            }
            SubmissionCommands::Get { id } => {
                let stored = client.get_submission(&id).await?;
                print_json(&stored.submission)?;
            }
        },
        Commands::Fields => {
            let schema = FormSchema::patient_intake();
            if cli.json {
                print_json(&schema.fields())?;
            } else {
                println!("{}", describe_schema(&schema));
            }
        }
    }

    Ok(())
}
