use std::process::ExitCode;

use chrono::Utc;
use clap::{Args, Parser, Subcommand};

use forge_poller::config::{
    Configuration, DEFAULT_FORGE_URL, FETCH_TIMEOUT_MS, FORGE_URL, LOWER_VERSION_BOUND_INCLUSIVE,
    MODULE_NAME, PollerConfig, UPPER_VERSION_BOUND_EXCLUSIVE, USER_AGENT,
};
use forge_poller::forge::HttpForgeFactory;
use forge_poller::logging::{DEFAULT_LOG_LEVEL, LogConfig, init_logging};
use forge_poller::poller::{ForgePoller, PackageRevision};
use forge_poller::validation::ValidationResult;

#[derive(Parser)]
#[command(name = "forge-poller")]
#[command(version, about = "Poll a module forge for the latest release of a module")]
struct Cli {
    /// Base URL of the forge
    #[arg(long, global = true, default_value = DEFAULT_FORGE_URL)]
    forge_url: String,

    /// Per-request timeout in milliseconds
    #[arg(long, global = true, default_value_t = FETCH_TIMEOUT_MS)]
    timeout_ms: u64,

    #[arg(long, global = true, default_value = DEFAULT_LOG_LEVEL)]
    log_level: String,

    /// Log JSON objects instead of text
    #[arg(long, global = true)]
    log_json: bool,

    /// Log to the data directory instead of stderr
    #[arg(long, global = true)]
    log_file: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Check that the forge is reachable
    CheckRepository,
    /// Check that the module exists on the forge
    CheckPackage(ModuleArgs),
    /// Print the latest release within the bounds
    Latest(ModuleArgs),
    /// Print the latest release if it is newer than a known revision
    Since {
        #[command(flatten)]
        module: ModuleArgs,
        /// Last revision already seen
        #[arg(long)]
        last_known: String,
    },
}

#[derive(Args)]
struct ModuleArgs {
    /// Module name as author/module
    #[arg(long)]
    module: String,
    /// Lowest version to report (inclusive)
    #[arg(long)]
    lower: Option<String>,
    /// Version to stay below (exclusive)
    #[arg(long)]
    upper: Option<String>,
}

impl ModuleArgs {
    fn package_config(&self) -> Configuration {
        Configuration::new()
            .with(MODULE_NAME, Some(self.module.as_str()))
            .with(LOWER_VERSION_BOUND_INCLUSIVE, self.lower.as_deref())
            .with(UPPER_VERSION_BOUND_EXCLUSIVE, self.upper.as_deref())
    }
}

fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    let mut log_config = LogConfig {
        level: cli.log_level.clone(),
        json: cli.log_json,
        ..LogConfig::default()
    };
    if cli.log_file {
        log_config = log_config.with_default_file();
    }
    let _guard = init_logging(&log_config)?;

    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?
        .block_on(run(cli))
}

async fn run(cli: Cli) -> anyhow::Result<ExitCode> {
    let repository = Configuration::new().with(FORGE_URL, Some(cli.forge_url.as_str()));
    let poller = ForgePoller::new(HttpForgeFactory::new(PollerConfig {
        fetch_timeout_ms: cli.timeout_ms,
        user_agent: USER_AGENT.to_string(),
    }));

    let validation = poller.is_repository_configuration_valid(&repository);
    if !validation.is_successful() {
        return Ok(report_invalid(&validation));
    }

    match cli.command {
        Command::CheckRepository => {
            let result = poller.check_connection_to_repository(&repository).await;
            println!("{}", serde_json::to_string_pretty(&result)?);
            Ok(exit_code(result.successful))
        }
        Command::CheckPackage(module) => {
            let result = poller
                .check_connection_to_package(&module.package_config(), &repository)
                .await;
            println!("{}", serde_json::to_string_pretty(&result)?);
            Ok(exit_code(result.successful))
        }
        Command::Latest(module) => {
            let package = module.package_config();
            let validation = poller.is_package_configuration_valid(&package, &repository);
            if !validation.is_successful() {
                return Ok(report_invalid(&validation));
            }
            let revision = poller.get_latest_revision(&package, &repository).await;
            println!("{}", serde_json::to_string_pretty(&revision)?);
            Ok(ExitCode::SUCCESS)
        }
        Command::Since { module, last_known } => {
            let package = module.package_config();
            let validation = poller.is_package_configuration_valid(&package, &repository);
            if !validation.is_successful() {
                return Ok(report_invalid(&validation));
            }
            let last_known = PackageRevision::new(last_known, Utc::now());
            let revision = poller
                .latest_modification_since(&package, &repository, Some(&last_known))
                .await;
            println!("{}", serde_json::to_string_pretty(&revision)?);
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn report_invalid(validation: &ValidationResult) -> ExitCode {
    for message in validation.messages() {
        eprintln!("{}", message);
    }
    ExitCode::from(2)
}

fn exit_code(successful: bool) -> ExitCode {
    if successful {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}
