use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::{Parser, Subcommand};
use colored::Colorize;
use serde::de::DeserializeOwned;

use reviewer_core::{
    Action, HandlerRequest, HandlerResponse, OperationStatus, ProgressEvent, ResourceProvider,
    StabilizeConfig, Stabilizer, dispatch,
};
use reviewer_provider::{
    CodeGuruReviewerClient, RepositoryAssociationProvider, RepositoryProvider, repository,
    repository_association, resource_types,
};

#[derive(Parser)]
#[command(name = "reviewer")]
#[command(about = "Run CodeGuru Reviewer resource handlers locally", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List supported resource types
    Types,
    /// Invoke one handler action with a request file
    Invoke {
        /// Handler action: create, read, delete or list
        #[arg(long)]
        action: String,

        /// CloudFormation resource type name
        #[arg(long = "type", default_value = repository_association::TYPE_NAME)]
        type_name: String,

        /// Path to the handler request JSON
        request: PathBuf,

        /// Re-invoke while the handler reports IN_PROGRESS
        #[arg(long)]
        follow: bool,

        /// AWS region (defaults to the SDK's own resolution)
        #[arg(long, env = "AWS_REGION")]
        region: Option<String>,

        /// Describe calls per invocation while stabilizing
        #[arg(long, env = "REVIEWER_MAX_ATTEMPTS", default_value_t = reviewer_core::stabilize::DEFAULT_MAX_ATTEMPTS)]
        max_attempts: u32,

        /// Pause between describe calls, in milliseconds
        #[arg(long, env = "REVIEWER_DELAY_MS", default_value_t = reviewer_core::stabilize::DEFAULT_DELAY.as_millis() as u64)]
        delay_ms: u64,
    },
}

#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Types => {
            run_types();
            Ok(())
        }
        Commands::Invoke {
            action,
            type_name,
            request,
            follow,
            region,
            max_attempts,
            delay_ms,
        } => {
            let config = StabilizeConfig::default()
                .with_max_attempts(max_attempts)
                .with_delay(Duration::from_millis(delay_ms));
            run_invoke(
                &action,
                &type_name,
                &request,
                follow,
                region.as_deref(),
                config,
            )
            .await
        }
    };

    if let Err(e) = result {
        eprintln!("{} {}", "Error:".red().bold(), e);
        std::process::exit(1);
    }
}

fn run_types() {
    println!("{}", "Resource types:".cyan().bold());
    for resource_type in resource_types() {
        let list = if resource_type.supports_list() {
            "create, read, delete, list"
        } else {
            "create, read, delete"
        };
        println!(
            "  {} ({}) [{}]",
            resource_type.name().bold(),
            resource_type.primary_identifier(),
            list
        );
    }
}

async fn run_invoke(
    action: &str,
    type_name: &str,
    request_path: &Path,
    follow: bool,
    region: Option<&str>,
    config: StabilizeConfig,
) -> Result<(), String> {
    let action: Action = action.parse().map_err(|e: reviewer_core::ProviderError| e.message)?;
    let content = fs::read_to_string(request_path)
        .map_err(|e| format!("Failed to read {}: {}", request_path.display(), e))?;
    log::debug!("Loaded {} request from {}", type_name, request_path.display());

    match type_name {
        repository_association::TYPE_NAME => {
            let request = load_request(&content)?;
            let client = CodeGuruReviewerClient::new(region).await;
            let provider = RepositoryAssociationProvider::with_stabilizer(client, Stabilizer::new(config));
            run_handler(&provider, action, request, follow).await
        }
        repository::TYPE_NAME => {
            let request = load_request(&content)?;
            let client = CodeGuruReviewerClient::new(region).await;
            let provider = RepositoryProvider::with_stabilizer(client, Stabilizer::new(config));
            run_handler(&provider, action, request, follow).await
        }
        other => Err(format!("Unknown resource type: {}", other)),
    }
}

/// Parse a handler request, filling in a client request token when absent
fn load_request<M: DeserializeOwned>(content: &str) -> Result<HandlerRequest<M>, String> {
    let mut request: HandlerRequest<M> =
        serde_json::from_str(content).map_err(|e| format!("Invalid request: {}", e))?;
    if request.client_request_token.is_none() {
        request.client_request_token = Some(uuid::Uuid::new_v4().to_string());
    }
    Ok(request)
}

/// Request for the next invocation after an in-progress event, as the host builds it
fn continuation<M: Clone>(
    request: &HandlerRequest<M>,
    event: &ProgressEvent<M>,
) -> Option<HandlerRequest<M>> {
    match event {
        ProgressEvent::InProgress { model, context, .. } => {
            let mut next = request.clone();
            next.desired_resource_state = Some(model.clone());
            next.callback_context = Some(*context);
            Some(next)
        }
        _ => None,
    }
}

async fn run_handler<P: ResourceProvider>(
    provider: &P,
    action: Action,
    mut request: HandlerRequest<P::Model>,
    follow: bool,
) -> Result<(), String> {
    let mut invocation = 1;
    loop {
        println!(
            "{}",
            format!("{} {:?} (invocation {})", provider.type_name(), action, invocation).cyan()
        );
        let event = dispatch(provider, action, request.clone()).await;
        let next = continuation(&request, &event);
        let response = HandlerResponse::from(event);

        let json = serde_json::to_string_pretty(&response)
            .map_err(|e| format!("Failed to serialize response: {}", e))?;
        println!("{}", json);

        match response.status {
            OperationStatus::Success => {
                println!("{}", "Handler succeeded.".green().bold());
                return Ok(());
            }
            OperationStatus::Failed => {
                return Err(format!(
                    "{}: {}",
                    response.error_code.map(|c| c.as_str()).unwrap_or("InternalFailure"),
                    response.message.unwrap_or_default()
                ));
            }
            OperationStatus::InProgress => match next {
                Some(next) if follow => {
                    let delay = Duration::from_secs(u64::from(response.callback_delay_seconds));
                    println!(
                        "{}",
                        format!("In progress, re-invoking in {}s...", delay.as_secs()).yellow()
                    );
                    tokio::time::sleep(delay).await;
                    request = next;
                    invocation += 1;
                }
                _ => {
                    println!(
                        "{}",
                        "In progress. Re-run with the returned callbackContext to continue.".yellow()
                    );
                    return Ok(());
                }
            },
        }
    }
}
