//! pipectl - cluster CLI for the pipeline platform's custom resources.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use kube::config::KubeConfigOptions;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use client::ops::{pipeline, pipelineresource, pipelinerun, task, taskrun, ResourceSummary};
use client::{cancel, GraceMode, KubeResourceClient, ResourceKind, RunObject};

/// Manage tasks, pipelines, and their runs on a connected cluster.
#[derive(Parser)]
#[command(name = "pipectl")]
#[command(about = "CLI for pipeline platform resources")]
#[command(version)]
struct Cli {
    /// Namespace to operate in
    #[arg(short = 'n', long, global = true, default_value = "default")]
    namespace: String,

    /// Kubeconfig context to use instead of the current one
    #[arg(long, global = true)]
    context: Option<String>,

    /// Per-request timeout in seconds
    #[arg(long, global = true, default_value = "30")]
    request_timeout: u64,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Operate on task runs
    #[command(subcommand, visible_alias = "tr")]
    Taskrun(TaskRunCommands),

    /// Operate on pipeline runs
    #[command(subcommand, visible_alias = "pr")]
    Pipelinerun(PipelineRunCommands),

    /// Operate on tasks
    #[command(subcommand)]
    Task(ObjectCommands),

    /// Operate on pipelines
    #[command(subcommand)]
    Pipeline(ObjectCommands),

    /// Operate on pipeline resources
    #[command(subcommand)]
    Resource(ResourceCommands),
}

#[derive(Subcommand)]
enum TaskRunCommands {
    /// List task runs in the namespace
    #[command(visible_alias = "ls")]
    List,
    /// Show one task run as YAML
    Get { name: String },
    /// Request cancellation of a running task run
    Cancel { name: String },
}

#[derive(Subcommand)]
enum PipelineRunCommands {
    /// List pipeline runs in the namespace
    #[command(visible_alias = "ls")]
    List,
    /// Show one pipeline run as YAML
    Get { name: String },
    /// Request cancellation of a running pipeline run
    Cancel {
        name: String,
        /// Graceful mode: StoppedRunFinally or CancelledRunFinally
        #[arg(long)]
        grace: Option<GraceMode>,
    },
}

#[derive(Subcommand)]
enum ObjectCommands {
    /// List objects in the namespace
    #[command(visible_alias = "ls")]
    List,
    /// Show one object as YAML
    Get { name: String },
    /// Create an object from a manifest file
    Create {
        /// Path to a YAML manifest
        #[arg(short = 'f', long = "filename")]
        file: PathBuf,
    },
}

#[derive(Subcommand)]
enum ResourceCommands {
    /// List pipeline resources in the namespace
    #[command(visible_alias = "ls")]
    List,
    /// Show one pipeline resource as YAML
    Get { name: String },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let transport = build_transport(&cli).await?;
    let ns = cli.namespace.as_str();

    match cli.command {
        Commands::Taskrun(cmd) => match cmd {
            TaskRunCommands::List => print_runs(&taskrun::list(&transport, ns).await?),
            TaskRunCommands::Get { name } => {
                print_yaml(&taskrun::get_document(&transport, &name, ns).await?)?;
            }
            TaskRunCommands::Cancel { name } => {
                let confirmation =
                    cancel(&transport, ResourceKind::TaskRun, &name, ns, GraceMode::None).await?;
                println!("{confirmation}");
            }
        },
        Commands::Pipelinerun(cmd) => match cmd {
            PipelineRunCommands::List => print_runs(&pipelinerun::list(&transport, ns).await?),
            PipelineRunCommands::Get { name } => {
                print_yaml(&pipelinerun::get_document(&transport, &name, ns).await?)?;
            }
            PipelineRunCommands::Cancel { name, grace } => {
                let confirmation = cancel(
                    &transport,
                    ResourceKind::PipelineRun,
                    &name,
                    ns,
                    grace.unwrap_or_default(),
                )
                .await?;
                println!("{confirmation}");
            }
        },
        Commands::Task(cmd) => match cmd {
            ObjectCommands::List => print_summaries(&task::list(&transport, ns).await?),
            ObjectCommands::Get { name } => print_yaml(&task::get(&transport, &name, ns).await?)?,
            ObjectCommands::Create { file } => {
                let manifest = load_manifest(&file)?;
                let created = task::create(&transport, &manifest, ns).await?;
                println!("Task created: {}", name_of(&created));
            }
        },
        Commands::Pipeline(cmd) => match cmd {
            ObjectCommands::List => print_summaries(&pipeline::list(&transport, ns).await?),
            ObjectCommands::Get { name } => {
                print_yaml(&pipeline::get(&transport, &name, ns).await?)?;
            }
            ObjectCommands::Create { file } => {
                let manifest = load_manifest(&file)?;
                let created = pipeline::create(&transport, &manifest, ns).await?;
                println!("Pipeline created: {}", name_of(&created));
            }
        },
        Commands::Resource(cmd) => match cmd {
            ResourceCommands::List => {
                print_summaries(&pipelineresource::list(&transport, ns).await?);
            }
            ResourceCommands::Get { name } => {
                print_yaml(&pipelineresource::get(&transport, &name, ns).await?)?;
            }
        },
    }

    Ok(())
}

fn init_tracing(verbose: bool) {
    let default_filter = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter));
    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(filter)
        .init();
}

async fn build_transport(cli: &Cli) -> Result<KubeResourceClient> {
    let timeout = Duration::from_secs(cli.request_timeout);
    let transport = match &cli.context {
        Some(context) => {
            let options = KubeConfigOptions {
                context: Some(context.clone()),
                cluster: None,
                user: None,
            };
            KubeResourceClient::from_kubeconfig(&options, timeout).await
        }
        None => KubeResourceClient::try_default(timeout).await,
    };
    transport.context("connecting to the cluster")
}

fn load_manifest(path: &Path) -> Result<serde_json::Value> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("reading manifest {}", path.display()))?;
    serde_yaml::from_str(&raw).with_context(|| format!("parsing manifest {}", path.display()))
}

fn print_runs(runs: &[RunObject]) {
    if runs.is_empty() {
        println!("No resources found");
        return;
    }
    println!("{:<40} {:<10} {}", "NAME", "AGE", "STATUS");
    for run in runs {
        println!(
            "{:<40} {:<10} {}",
            run.name,
            format_age(run.created),
            run.status_label()
        );
    }
}

fn print_summaries(items: &[ResourceSummary]) {
    if items.is_empty() {
        println!("No resources found");
        return;
    }
    println!("{:<40} {}", "NAME", "AGE");
    for item in items {
        println!("{:<40} {}", item.name, format_age(item.created));
    }
}

fn print_yaml(document: &serde_json::Value) -> Result<()> {
    let rendered = serde_yaml::to_string(document).context("rendering object as YAML")?;
    print!("{rendered}");
    Ok(())
}

fn name_of(document: &serde_json::Value) -> &str {
    document["metadata"]["name"].as_str().unwrap_or("<unnamed>")
}

fn format_age(created: Option<DateTime<Utc>>) -> String {
    let Some(created) = created else {
        return "---".to_string();
    };
    let elapsed = Utc::now().signed_duration_since(created);
    if elapsed.num_days() > 0 {
        format!("{}d", elapsed.num_days())
    } else if elapsed.num_hours() > 0 {
        format!("{}h", elapsed.num_hours())
    } else if elapsed.num_minutes() > 0 {
        format!("{}m", elapsed.num_minutes())
    } else {
        format!("{}s", elapsed.num_seconds().max(0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration as ChronoDuration;

    #[test]
    fn cli_parses_cancel_with_grace() {
        let cli = Cli::parse_from([
            "pipectl",
            "pipelinerun",
            "cancel",
            "pr-1",
            "-n",
            "ci",
            "--grace",
            "StoppedRunFinally",
        ]);
        assert_eq!(cli.namespace, "ci");
        match cli.command {
            Commands::Pipelinerun(PipelineRunCommands::Cancel { name, grace }) => {
                assert_eq!(name, "pr-1");
                assert_eq!(grace, Some(GraceMode::StoppedRunFinally));
            }
            _ => panic!("unexpected command"),
        }
    }

    #[test]
    fn cli_rejects_unknown_grace_literals() {
        let result = Cli::try_parse_from([
            "pipectl",
            "pipelinerun",
            "cancel",
            "pr-1",
            "--grace",
            "gracefully",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn age_formatting_buckets() {
        let now = Utc::now();
        assert_eq!(format_age(None), "---");
        assert_eq!(format_age(Some(now - ChronoDuration::minutes(5))), "5m");
        assert_eq!(format_age(Some(now - ChronoDuration::hours(3))), "3h");
        assert_eq!(format_age(Some(now - ChronoDuration::days(2))), "2d");
    }
}
