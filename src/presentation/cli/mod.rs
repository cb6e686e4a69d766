pub mod commands;

use clap::{Args, Parser, Subcommand};
use std::env;
use std::path::PathBuf;
use std::process::exit;
use std::sync::Arc;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use crate::application::use_cases::{CheckoutConfig, CheckoutRepositoryUseCase};
use crate::common::error::AppError;
use crate::common::result::{AppResult, IoResultExt};
use crate::domain::entities::checkout::CheckoutRequest;
use crate::domain::value_objects::scm_type::ScmType;
use crate::infrastructure::filesystem::{ConfigStore, EngineConfig, LocalFileSystem};
use crate::infrastructure::process::ProcessExecutor;
use crate::infrastructure::scm::{BinaryLocator, ToolRegistry};
use crate::presentation::ui::display::DisplayHelper;

use commands::{CheckoutCommand, InstallCommand, ResolveCommand};

/// scm-checkout - check out git and svn repositories through the installed tools
#[derive(Parser)]
#[command(name = "scm-checkout")]
#[command(about = "Check out git and svn repositories through the installed tools")]
#[command(version)]
#[command(long_version = concat!(
    env!("CARGO_PKG_VERSION"),
    " (",
    env!("GIT_HASH"),
    ", built ",
    env!("BUILD_DATE"),
    " for ",
    env!("BUILD_TARGET"),
    ")"
))]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Configuration file (defaults to ./scm-checkout.yaml when present)
    #[arg(short, long, global = true, env = "SCM_CHECKOUT_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Repository and ref selection shared by `checkout` and `install`
#[derive(Args, Debug, Clone)]
pub struct RepositoryArgs {
    /// Tool to use
    #[arg(value_enum)]
    pub scm: ScmType,

    /// Remote repository URL
    pub url: String,

    /// Target directory
    pub target: PathBuf,

    /// Branch to check out
    #[arg(short, long)]
    pub branch: Option<String>,

    /// Tag to check out
    #[arg(short, long)]
    pub tag: Option<String>,

    /// Commit (git) or revision (svn) to check out
    #[arg(long)]
    pub commit: Option<String>,
}

impl RepositoryArgs {
    pub fn to_request(&self) -> CheckoutRequest {
        let mut request = CheckoutRequest::new(&self.url, &self.target);
        request.reference.branch = self.branch.clone();
        request.reference.tag = self.tag.clone();
        request.reference.commit = self.commit.clone();
        request
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Locate and validate a tool (all tools when none is given)
    Resolve {
        #[arg(value_enum)]
        scm: Option<ScmType>,
    },

    /// Check a repository out into a staging directory next to the target
    Checkout(RepositoryArgs),

    /// Check a repository out and install it as a plain tree at the target
    Install(RepositoryArgs),
}

/// Set up `tracing` output on stderr.
///
/// `--verbose` forces debug level; otherwise `RUST_LOG` applies, defaulting
/// to warnings only.
pub fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    if let Err(e) = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init()
    {
        debug!("Keeping the existing tracing subscriber: {}", e);
    }
}

/// State shared by every command handler
pub struct CommandContext {
    pub config: EngineConfig,
    pub registry: ToolRegistry,
    pub display: DisplayHelper,
}

impl CommandContext {
    pub fn new(config: EngineConfig, use_color: bool) -> Self {
        let registry = ToolRegistry::new(BinaryLocator::new(), config.tools.clone());
        Self {
            config,
            registry,
            display: DisplayHelper::new(use_color),
        }
    }

    /// Checkout use case wired to real processes and the local disk
    pub fn checkout_use_case(&self) -> CheckoutRepositoryUseCase {
        let executor = ProcessExecutor::new().with_locale(&self.config.locale);
        CheckoutRepositoryUseCase::new(
            Arc::new(executor),
            Arc::new(LocalFileSystem::new()),
            CheckoutConfig::from(&self.config),
        )
    }
}

/// CLI application runner
pub struct CliApp {
    cli: Cli,
}

impl Default for CliApp {
    fn default() -> Self {
        Self::new()
    }
}

impl CliApp {
    pub fn new() -> Self {
        Self { cli: Cli::parse() }
    }

    pub fn from_cli(cli: Cli) -> Self {
        Self { cli }
    }

    pub async fn run(self) -> anyhow::Result<()> {
        init_logging(self.cli.verbose);
        colored::control::set_override(!self.cli.no_color);

        let display = DisplayHelper::new(!self.cli.no_color);
        let context = match self.load_context() {
            Ok(context) => context,
            Err(e) => {
                display.error(&e.render());
                exit(e.exit_code());
            }
        };

        if let Err(e) = self.handle_command(&context).await {
            context.display.error(&e.render());
            exit(e.exit_code());
        }

        Ok(())
    }

    fn load_context(&self) -> AppResult<CommandContext> {
        let cwd = env::current_dir().with_filesystem_error("cannot read the current directory", None)?;
        let config = ConfigStore::new().load(self.cli.config.as_deref(), &cwd)?;
        Ok(CommandContext::new(config, !self.cli.no_color))
    }

    async fn handle_command(&self, context: &CommandContext) -> Result<(), AppError> {
        match &self.cli.command {
            Commands::Resolve { scm } => ResolveCommand::new(*scm).execute(context).await,
            Commands::Checkout(args) => CheckoutCommand::new(args.clone()).execute(context).await,
            Commands::Install(args) => InstallCommand::new(args.clone()).execute(context).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_checkout_arguments() {
        let cli = Cli::try_parse_from([
            "scm-checkout",
            "--no-color",
            "checkout",
            "svn",
            "https://svn.example.com/repo",
            "/tmp/addon",
            "--branch",
            "stable",
            "--commit",
            "1234",
        ])
        .unwrap();

        assert!(cli.no_color);
        let Commands::Checkout(args) = cli.command else {
            panic!("expected checkout");
        };
        let request = args.to_request();
        assert_eq!(args.scm, ScmType::Svn);
        assert_eq!(request.target, PathBuf::from("/tmp/addon"));
        assert_eq!(request.reference.branch.as_deref(), Some("stable"));
        assert_eq!(request.reference.commit.as_deref(), Some("1234"));
        assert_eq!(request.reference.tag, None);
    }

    #[test]
    fn test_resolve_without_tool() {
        let cli = Cli::try_parse_from(["scm-checkout", "resolve"]).unwrap();
        assert!(matches!(cli.command, Commands::Resolve { scm: None }));
    }

    #[test]
    fn test_logging_can_be_initialized_twice() {
        init_logging(false);
        init_logging(true);
        assert!(tracing::dispatcher::has_been_set());
    }

    #[test]
    fn test_unknown_tool_is_rejected() {
        assert!(Cli::try_parse_from(["scm-checkout", "resolve", "p4"]).is_err());
    }
}
