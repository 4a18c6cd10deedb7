mod classify_cmd;
mod config;
mod tool_cmds;

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use toolbridge_core::ToolRegistry;

use config::ToolbridgeConfig;

#[derive(Parser)]
#[command(
    name = "toolbridge",
    about = "Build verification-tool command lines and classify their results"
)]
struct Cli {
    /// Config file (overrides TOOLBRIDGE_CONFIG env var)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Write a default toolbridge config file
    Init {
        /// Overwrite existing config file
        #[arg(long)]
        force: bool,
    },
    /// List the supported tools
    Tools,
    /// Print the version of a tool installation
    Version {
        /// Tool name (see `toolbridge tools`)
        #[arg(long)]
        tool: String,
        /// Path to the tool executable
        #[arg(long)]
        executable: PathBuf,
    },
    /// Negotiate and print the capabilities of a tool installation
    Negotiate {
        /// Tool name (see `toolbridge tools`)
        #[arg(long)]
        tool: String,
        /// Path to the tool executable
        #[arg(long)]
        executable: PathBuf,
    },
    /// Build the command line for one run and print it as JSON
    Cmdline {
        /// Tool name (see `toolbridge tools`)
        #[arg(long)]
        tool: String,
        /// Path to the tool executable
        #[arg(long)]
        executable: PathBuf,
        /// Property file to verify against
        #[arg(long)]
        property_file: Option<String>,
        /// Memory limit in bytes
        #[arg(long)]
        memlimit: Option<u64>,
        /// Resource limit as name=value (repeatable)
        #[arg(long = "limit", value_parser = tool_cmds::parse_limit)]
        limits: Vec<(String, u64)>,
        /// Tool option, passed through verbatim (repeatable)
        #[arg(long = "opt", allow_hyphen_values = true)]
        options: Vec<String>,
        /// Input files
        inputs: Vec<String>,
    },
    /// Classify the output of a finished run
    Classify {
        /// Tool name (see `toolbridge tools`)
        #[arg(long)]
        tool: String,
        /// JSON file holding the `context` object printed by `cmdline`
        #[arg(long)]
        context: PathBuf,
        /// Exit code of the run
        #[arg(long, allow_hyphen_values = true)]
        exit_code: i32,
        /// Terminating signal, 0 if none
        #[arg(long, default_value_t = 0)]
        signal: i32,
        /// The run hit its time limit
        #[arg(long)]
        timeout: bool,
        /// File with the captured output, `-` for stdin
        #[arg(long, default_value = "-")]
        output: String,
        /// Print the verdict and its class as JSON
        #[arg(long)]
        json: bool,
    },
}

/// Registry of the built-in tools, configured through the resolution chain.
fn registry(cli_path: Option<&Path>) -> anyhow::Result<ToolRegistry> {
    let resolved = ToolbridgeConfig::resolve(cli_path)?;
    if let Some(source) = &resolved.source {
        tracing::debug!(config = %source.display(), "loaded config file");
    }
    Ok(ToolRegistry::builtin(&resolved.negotiation))
}

/// Execute the `toolbridge init` command: write config file.
fn cmd_init(cli_path: Option<&Path>, force: bool) -> anyhow::Result<()> {
    let (path, _) = config::choose_path(cli_path);

    if path.exists() && !force {
        anyhow::bail!(
            "config file already exists at {}\nUse --force to overwrite.",
            path.display()
        );
    }

    let cfg = config::ConfigFile::default();
    config::save_config(&path, &cfg)?;

    println!("Config written to {}", path.display());
    println!(
        "  negotiation.runtime_candidates = {:?}",
        cfg.negotiation.runtime_candidates
    );
    println!(
        "  negotiation.probe_timeout_secs = {}",
        cfg.negotiation.probe_timeout_secs
    );

    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Init { force } => {
            cmd_init(cli.config.as_deref(), force)?;
        }
        Commands::Tools => {
            let registry = registry(cli.config.as_deref())?;
            tool_cmds::run_tools(&registry)?;
        }
        Commands::Version { tool, executable } => {
            let registry = registry(cli.config.as_deref())?;
            tool_cmds::run_version(&registry, &tool, &executable).await?;
        }
        Commands::Negotiate { tool, executable } => {
            let registry = registry(cli.config.as_deref())?;
            tool_cmds::run_negotiate(&registry, &tool, &executable).await?;
        }
        Commands::Cmdline {
            tool,
            executable,
            property_file,
            memlimit,
            limits,
            options,
            inputs,
        } => {
            let registry = registry(cli.config.as_deref())?;
            let request = tool_cmds::build_request(property_file, memlimit, limits, options, inputs);
            tool_cmds::run_cmdline(&registry, &tool, &executable, &request).await?;
        }
        Commands::Classify {
            tool,
            context,
            exit_code,
            signal,
            timeout,
            output,
            json,
        } => {
            let registry = registry(cli.config.as_deref())?;
            let args = classify_cmd::ClassifyArgs {
                context,
                exit_code,
                signal,
                timed_out: timeout,
                output,
                json,
            };
            classify_cmd::run_classify(&registry, &tool, &args)?;
        }
    }

    Ok(())
}
