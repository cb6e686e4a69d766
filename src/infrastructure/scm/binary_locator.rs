//! Finds tool executables on the host.
//!
//! Discovery walks an ordered list of [`DiscoveryStrategy`] values and stops
//! at the first candidate whose version probe exits with code 0.

use super::scm_error::ScmError;
use crate::domain::entities::tool::{ResolvedTool, ToolDescriptor};
use crate::domain::value_objects::platform::Platform;
use async_trait::async_trait;
use std::io;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::sync::Arc;
use tokio::process::Command;
use tracing::{debug, info};

/// Output of a short-lived probe process
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeOutput {
    pub exit_code: Option<i32>,
    pub stdout: String,
}

/// Runs probe processes and PATH lookups
#[async_trait]
pub trait ToolProbe: Send + Sync {
    async fn run(&self, program: &Path, args: &[&str]) -> io::Result<ProbeOutput>;

    /// Resolve a binary name through `PATH`
    fn which(&self, binary: &str) -> Option<PathBuf>;
}

/// Probe backed by real processes and the `which` crate
#[derive(Debug, Default, Clone)]
pub struct SystemProbe;

#[async_trait]
impl ToolProbe for SystemProbe {
    async fn run(&self, program: &Path, args: &[&str]) -> io::Result<ProbeOutput> {
        let output = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .kill_on_drop(true)
            .output()
            .await?;

        Ok(ProbeOutput {
            exit_code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
        })
    }

    fn which(&self, binary: &str) -> Option<PathBuf> {
        which::which(binary).ok()
    }
}

/// One way of producing a candidate executable
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiscoveryStrategy {
    /// Explicit path from configuration
    Hint(PathBuf),
    /// `PATH` lookup; `verify_bundled` rejects the Xcode shim when no
    /// developer tools are installed
    PathLookup { binary: String, verify_bundled: bool },
    /// `<base>\<vendor>\bin\<binary>.exe`
    ProgramFiles(PathBuf),
    /// Spawn the bare name and let the OS resolve it
    BareName(String),
}

/// Environment variables holding Windows install roots, in search order
const WINDOWS_ROOTS: [&str; 3] = ["ProgramW6432", "ProgramFiles(x86)", "ProgramFiles"];

/// Build the ordered candidate list for a platform.
///
/// Missing environment variables simply drop their candidate.
pub fn discovery_strategies(
    platform: Platform,
    descriptor: &ToolDescriptor,
    hint: Option<&Path>,
    env: &dyn Fn(&str) -> Option<String>,
) -> Vec<DiscoveryStrategy> {
    let mut strategies = Vec::new();

    if let Some(hint) = hint {
        strategies.push(DiscoveryStrategy::Hint(hint.to_path_buf()));
    }

    match platform {
        Platform::MacOs => strategies.push(DiscoveryStrategy::PathLookup {
            binary: descriptor.binary.to_string(),
            verify_bundled: true,
        }),
        Platform::Windows => {
            for key in WINDOWS_ROOTS {
                if let Some(base) = env(key) {
                    strategies.push(DiscoveryStrategy::ProgramFiles(PathBuf::from(base)));
                }
            }
            if let Some(local) = env("LocalAppData") {
                strategies.push(DiscoveryStrategy::ProgramFiles(
                    PathBuf::from(local).join("Programs"),
                ));
            }
            strategies.push(DiscoveryStrategy::PathLookup {
                binary: descriptor.windows_binary(),
                verify_bundled: false,
            });
        }
        Platform::Other => {
            strategies.push(DiscoveryStrategy::BareName(descriptor.binary.to_string()));
        }
    }

    strategies
}

/// A candidate that answered its version probe
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocatedBinary {
    pub path: PathBuf,
    /// Untrimmed stdout of the version probe
    pub raw_version: String,
}

type EnvLookup = Arc<dyn Fn(&str) -> Option<String> + Send + Sync>;

/// Locates tool binaries using platform-specific strategies
pub struct BinaryLocator {
    probe: Arc<dyn ToolProbe>,
    platform: Platform,
    env: EnvLookup,
}

impl Default for BinaryLocator {
    fn default() -> Self {
        Self::new()
    }
}

impl BinaryLocator {
    pub fn new() -> Self {
        Self::with_probe(Arc::new(SystemProbe))
    }

    pub fn with_probe(probe: Arc<dyn ToolProbe>) -> Self {
        Self {
            probe,
            platform: Platform::current(),
            env: Arc::new(|key| std::env::var(key).ok()),
        }
    }

    pub fn with_platform(mut self, platform: Platform) -> Self {
        self.platform = platform;
        self
    }

    pub fn with_env(mut self, env: impl Fn(&str) -> Option<String> + Send + Sync + 'static) -> Self {
        self.env = Arc::new(env);
        self
    }

    /// Find the first working executable for a tool
    pub async fn locate(
        &self,
        descriptor: &ToolDescriptor,
        hint: Option<&Path>,
    ) -> Result<LocatedBinary, ScmError> {
        let strategies = discovery_strategies(self.platform, descriptor, hint, self.env.as_ref());

        for strategy in &strategies {
            match self.try_strategy(descriptor, strategy).await {
                Some(located) => {
                    info!(
                        "Using {} from {}",
                        descriptor.name,
                        located.path.display()
                    );
                    return Ok(located);
                }
                None => debug!("{} not found via {:?}", descriptor.binary, strategy),
            }
        }

        Err(ScmError::not_found(*descriptor))
    }

    /// Re-run the version probe against an already resolved tool
    pub async fn is_alive(&self, tool: &ResolvedTool) -> bool {
        self.probe_version(&tool.descriptor, &tool.path).await.is_some()
    }

    async fn try_strategy(
        &self,
        descriptor: &ToolDescriptor,
        strategy: &DiscoveryStrategy,
    ) -> Option<LocatedBinary> {
        match strategy {
            DiscoveryStrategy::Hint(path) => self.probe_version(descriptor, path).await,
            DiscoveryStrategy::PathLookup { binary, verify_bundled } => {
                let path = self.probe.which(binary)?;
                if *verify_bundled && !self.developer_tools_present(binary, &path).await {
                    return None;
                }
                self.probe_version(descriptor, &path).await
            }
            DiscoveryStrategy::ProgramFiles(base) => {
                let path = descriptor.windows_install_path(base);
                self.probe_version(descriptor, &path).await
            }
            DiscoveryStrategy::BareName(name) => {
                self.probe_version(descriptor, Path::new(name)).await
            }
        }
    }

    /// `/usr/bin/git` on macOS is a shim; `xcode-select -p` exits with 2 when
    /// there is nothing behind it.
    async fn developer_tools_present(&self, binary: &str, path: &Path) -> bool {
        if path != Path::new("/usr/bin").join(binary) {
            return true;
        }

        match self.probe.run(Path::new("xcode-select"), &["-p"]).await {
            Ok(output) => output.exit_code != Some(2),
            Err(e) => {
                debug!("xcode-select failed: {}", e);
                true
            }
        }
    }

    async fn probe_version(&self, descriptor: &ToolDescriptor, path: &Path) -> Option<LocatedBinary> {
        match self.probe.run(path, descriptor.version_args).await {
            Ok(output) if output.exit_code == Some(0) => Some(LocatedBinary {
                path: path.to_path_buf(),
                raw_version: output.stdout,
            }),
            Ok(output) => {
                debug!(
                    "{} {} exited with {:?}",
                    path.display(),
                    descriptor.version_args.join(" "),
                    output.exit_code
                );
                None
            }
            Err(e) => {
                debug!("failed to probe {}: {}", path.display(), e);
                None
            }
        }
    }
}
