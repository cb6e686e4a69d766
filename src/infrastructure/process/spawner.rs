use async_trait::async_trait;
use std::io;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::process::{Child, Command};

/// Everything needed to start one child process
#[derive(Debug, Clone)]
pub struct SpawnRequest {
    pub program: PathBuf,
    pub args: Vec<String>,
    pub working_directory: Option<PathBuf>,
    /// Variables set on top of the inherited environment
    pub environment_overrides: Vec<(String, String)>,
    /// Pipe stdin instead of connecting it to null
    pub pipe_stdin: bool,
}

impl SpawnRequest {
    pub fn new(program: impl Into<PathBuf>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
            working_directory: None,
            environment_overrides: Vec::new(),
            pipe_stdin: false,
        }
    }

    pub fn with_working_directory(mut self, dir: impl AsRef<Path>) -> Self {
        self.working_directory = Some(dir.as_ref().to_path_buf());
        self
    }

    pub fn with_environment_variable(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.environment_overrides.push((key.into(), value.into()));
        self
    }

    pub fn with_stdin(mut self, pipe_stdin: bool) -> Self {
        self.pipe_stdin = pipe_stdin;
        self
    }
}

pub type ProcessReader = Box<dyn AsyncRead + Send + Unpin>;
pub type ProcessWriter = Box<dyn AsyncWrite + Send + Unpin>;

/// A running child process
#[async_trait]
pub trait SpawnedProcess: Send {
    /// OS process id, if still known
    fn id(&self) -> Option<u32>;

    fn take_stdin(&mut self) -> Option<ProcessWriter>;

    fn take_stdout(&mut self) -> Option<ProcessReader>;

    fn take_stderr(&mut self) -> Option<ProcessReader>;

    /// Wait for exit; `None` when the process was terminated by a signal
    async fn wait(&mut self) -> io::Result<Option<i32>>;

    /// Ask the process to terminate without waiting for it
    fn kill(&mut self) -> io::Result<()>;
}

/// Starts child processes
pub trait ProcessSpawner: Send + Sync {
    fn spawn(&self, request: &SpawnRequest) -> io::Result<Box<dyn SpawnedProcess>>;
}

/// Spawner backed by `tokio::process`
#[derive(Debug, Default, Clone)]
pub struct TokioSpawner;

impl ProcessSpawner for TokioSpawner {
    fn spawn(&self, request: &SpawnRequest) -> io::Result<Box<dyn SpawnedProcess>> {
        let mut cmd = Command::new(&request.program);
        cmd.args(&request.args);

        if let Some(dir) = &request.working_directory {
            cmd.current_dir(dir);
        }

        for (key, value) in &request.environment_overrides {
            cmd.env(key, value);
        }

        cmd.stdin(if request.pipe_stdin {
            Stdio::piped()
        } else {
            Stdio::null()
        });
        cmd.stdout(Stdio::piped());
        cmd.stderr(Stdio::piped());
        // A dropped exec future must not leave the child running
        cmd.kill_on_drop(true);

        let child = cmd.spawn()?;
        Ok(Box::new(TokioProcess { child }))
    }
}

struct TokioProcess {
    child: Child,
}

#[async_trait]
impl SpawnedProcess for TokioProcess {
    fn id(&self) -> Option<u32> {
        self.child.id()
    }

    fn take_stdin(&mut self) -> Option<ProcessWriter> {
        self.child
            .stdin
            .take()
            .map(|stdin| Box::new(stdin) as ProcessWriter)
    }

    fn take_stdout(&mut self) -> Option<ProcessReader> {
        self.child
            .stdout
            .take()
            .map(|stdout| Box::new(stdout) as ProcessReader)
    }

    fn take_stderr(&mut self) -> Option<ProcessReader> {
        self.child
            .stderr
            .take()
            .map(|stderr| Box::new(stderr) as ProcessReader)
    }

    async fn wait(&mut self) -> io::Result<Option<i32>> {
        let status = self.child.wait().await?;
        Ok(status.code())
    }

    fn kill(&mut self) -> io::Result<()> {
        self.child.start_kill()
    }
}
