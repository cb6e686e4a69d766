use super::progress_parser::LineConsumer;
use super::spawner::{ProcessReader, ProcessSpawner, ProcessWriter, SpawnRequest, TokioSpawner};
use crate::domain::entities::tool::ResolvedTool;
use crate::domain::value_objects::platform::Platform;
use crate::infrastructure::scm::error_classifier::{classify, classify_spawn_error};
use crate::infrastructure::scm::scm_error::{ScmError, ScmErrorCode};
use async_trait::async_trait;
use encoding_rs::{Encoding, UTF_8};
use std::fmt;
use std::io;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// Locale forced on every child so diagnostics can be pattern matched
pub const DEFAULT_LOCALE: &str = "en_US.UTF-8";

/// Result of a successful (exit code 0) command
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionResult {
    /// Exit code of the process
    pub exit_code: i32,

    /// Standard output, decoded with the requested encoding
    pub stdout: String,

    /// Diagnostic output
    pub stderr: String,
}

/// Per-call execution options
#[derive(Default)]
pub struct ExecOptions {
    /// Text written to the child's stdin, which is then closed
    pub input: Option<String>,

    /// Encoding label used to decode stdout (`utf8` when unset or unknown)
    pub encoding: Option<String>,

    /// Kills the child and fails the call with `Cancelled` when triggered
    pub cancellation_token: Option<CancellationToken>,

    /// Called once right after the child started, with its process id
    pub on_spawn: Option<Box<dyn FnOnce(Option<u32>) + Send>>,

    /// Fed every line of the diagnostic stream as it arrives
    pub line_consumer: Option<Box<dyn LineConsumer>>,
}

impl fmt::Debug for ExecOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExecOptions")
            .field("input", &self.input.as_ref().map(|input| input.len()))
            .field("encoding", &self.encoding)
            .field("cancellation_token", &self.cancellation_token)
            .field("on_spawn", &self.on_spawn.is_some())
            .field("line_consumer", &self.line_consumer.is_some())
            .finish()
    }
}

impl ExecOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_input(mut self, input: impl Into<String>) -> Self {
        self.input = Some(input.into());
        self
    }

    pub fn with_encoding(mut self, encoding: impl Into<String>) -> Self {
        self.encoding = Some(encoding.into());
        self
    }

    pub fn with_cancellation_token(mut self, token: CancellationToken) -> Self {
        self.cancellation_token = Some(token);
        self
    }

    pub fn with_on_spawn(mut self, on_spawn: impl FnOnce(Option<u32>) + Send + 'static) -> Self {
        self.on_spawn = Some(Box::new(on_spawn));
        self
    }

    pub fn with_line_consumer(mut self, consumer: impl LineConsumer + 'static) -> Self {
        self.line_consumer = Some(Box::new(consumer));
        self
    }
}

/// Runs a resolved tool with arguments
#[async_trait]
pub trait ScmExecutor: Send + Sync {
    async fn exec(
        &self,
        tool: &ResolvedTool,
        cwd: &Path,
        args: &[String],
        options: ExecOptions,
    ) -> Result<ExecutionResult, ScmError>;
}

/// Executes external tool processes and classifies their failures
pub struct ProcessExecutor {
    spawner: Arc<dyn ProcessSpawner>,
    locale: String,
    platform: Platform,
}

impl Default for ProcessExecutor {
    fn default() -> Self {
        Self::new()
    }
}

impl ProcessExecutor {
    pub fn new() -> Self {
        Self::with_spawner(Arc::new(TokioSpawner))
    }

    pub fn with_spawner(spawner: Arc<dyn ProcessSpawner>) -> Self {
        Self {
            spawner,
            locale: DEFAULT_LOCALE.to_string(),
            platform: Platform::current(),
        }
    }

    /// Override the `LC_ALL`/`LANG` value passed to children
    pub fn with_locale(mut self, locale: impl Into<String>) -> Self {
        self.locale = locale.into();
        self
    }

    pub fn with_platform(mut self, platform: Platform) -> Self {
        self.platform = platform;
        self
    }

    fn spawn_request(&self, tool: &ResolvedTool, cwd: &Path, args: &[String], pipe_stdin: bool) -> SpawnRequest {
        SpawnRequest::new(&tool.path, args.to_vec())
            .with_working_directory(self.platform.sanitize_path(cwd))
            .with_environment_variable("LC_ALL", &self.locale)
            .with_environment_variable("LANG", &self.locale)
            .with_stdin(pipe_stdin)
    }

    async fn run(
        &self,
        tool: &ResolvedTool,
        cwd: &Path,
        args: &[String],
        mut options: ExecOptions,
    ) -> Result<ExecutionResult, ScmError> {
        let descriptor = tool.descriptor;
        let failure = |code: ScmErrorCode, message: String| {
            ScmError::new(descriptor, code, message)
                .with_tool_path(&tool.path)
                .with_args(args)
        };

        let cancel = options.cancellation_token.take();
        if cancel.as_ref().is_some_and(|token| token.is_cancelled()) {
            return Err(ScmError::cancelled(descriptor)
                .with_tool_path(&tool.path)
                .with_args(args));
        }

        let input = options.input.take();
        let request = self.spawn_request(tool, cwd, args, input.is_some());
        let started = Instant::now();

        let mut child = self.spawner.spawn(&request).map_err(|e| {
            let code = classify_spawn_error(&e).unwrap_or(ScmErrorCode::Unclassified);
            let message = match code {
                ScmErrorCode::NotFound => format!("Failed to execute {} (ENOENT)", descriptor.binary),
                _ => format!("Failed to execute {}", tool.path.display()),
            };
            failure(code, message).with_source(e)
        })?;

        if let Some(on_spawn) = options.on_spawn.take() {
            on_spawn(child.id());
        }

        let (Some(stdout), Some(stderr)) = (child.take_stdout(), child.take_stderr()) else {
            let _ = child.kill();
            return Err(failure(
                ScmErrorCode::Unclassified,
                format!("Failed to get stdout or stderr from {} process.", descriptor.binary),
            ));
        };
        let stdin = child.take_stdin();
        let consumer = options.line_consumer.take();

        let settled = {
            let completion = async {
                tokio::join!(
                    write_input(stdin, input),
                    read_all(stdout),
                    read_diagnostics(stderr, consumer),
                    child.wait(),
                )
            };
            let cancelled = async {
                match &cancel {
                    Some(token) => token.cancelled().await,
                    None => std::future::pending::<()>().await,
                }
            };

            tokio::select! {
                biased;
                () = cancelled => None,
                outcome = completion => Some(outcome),
            }
        };

        let Some((input_written, stdout, stderr, status)) = settled else {
            if let Err(e) = child.kill() {
                debug!("kill after cancellation failed: {}", e);
            }
            debug!(
                "> {} {} cancelled after {}ms",
                descriptor.binary,
                args.join(" "),
                started.elapsed().as_millis()
            );
            return Err(ScmError::cancelled(descriptor)
                .with_tool_path(&tool.path)
                .with_args(args));
        };

        debug!(
            "> {} {} [{}ms]",
            descriptor.binary,
            args.join(" "),
            started.elapsed().as_millis()
        );

        if let Err(e) = input_written {
            // The child may legitimately exit before reading all of stdin
            warn!("failed to write stdin for {}: {}", descriptor.binary, e);
        }

        let io_failure = |e: io::Error| {
            failure(
                ScmErrorCode::Unclassified,
                format!("Failed to execute {}", tool.path.display()),
            )
            .with_source(e)
        };
        let stdout = stdout.map_err(io_failure)?;
        let stderr = stderr.map_err(io_failure)?;
        let exit_code = status.map_err(io_failure)?.unwrap_or(-1);

        if !stderr.is_empty() {
            debug!("{}", stderr);
        }

        let stdout = decode(&stdout, options.encoding.as_deref());

        if exit_code != 0 {
            let code = classify(descriptor.scm_type, &stderr).unwrap_or(ScmErrorCode::Unclassified);
            return Err(failure(code, format!("Failed to execute {}", tool.path.display()))
                .with_output(exit_code, stdout, stderr));
        }

        Ok(ExecutionResult {
            exit_code,
            stdout,
            stderr,
        })
    }
}

#[async_trait]
impl ScmExecutor for ProcessExecutor {
    async fn exec(
        &self,
        tool: &ResolvedTool,
        cwd: &Path,
        args: &[String],
        options: ExecOptions,
    ) -> Result<ExecutionResult, ScmError> {
        self.run(tool, cwd, args, options).await
    }
}

async fn write_input(stdin: Option<ProcessWriter>, input: Option<String>) -> io::Result<()> {
    let (Some(mut stdin), Some(input)) = (stdin, input) else {
        return Ok(());
    };
    stdin.write_all(input.as_bytes()).await?;
    stdin.shutdown().await
}

async fn read_all(mut reader: ProcessReader) -> io::Result<Vec<u8>> {
    let mut buffer = Vec::new();
    reader.read_to_end(&mut buffer).await?;
    Ok(buffer)
}

async fn read_diagnostics(
    mut reader: ProcessReader,
    mut consumer: Option<Box<dyn LineConsumer>>,
) -> io::Result<String> {
    let mut raw = Vec::new();
    let mut lines = LineSplitter::default();
    let mut chunk = [0u8; 8192];

    loop {
        let read = reader.read(&mut chunk).await?;
        if read == 0 {
            break;
        }
        raw.extend_from_slice(&chunk[..read]);
        if let Some(consumer) = consumer.as_deref_mut() {
            lines.push(&chunk[..read], |line| consumer.consume(line));
        }
    }

    if let Some(consumer) = consumer.as_deref_mut() {
        lines.finish(|line| consumer.consume(line));
    }

    Ok(String::from_utf8_lossy(&raw).into_owned())
}

fn decode(bytes: &[u8], label: Option<&str>) -> String {
    let encoding = label
        .and_then(|label| Encoding::for_label(label.as_bytes()))
        .unwrap_or(UTF_8);
    let (text, _, _) = encoding.decode(bytes);
    text.into_owned()
}

/// Splits a byte stream on `\n`, `\r\n` and `\r`.
///
/// Git redraws its progress counters with bare carriage returns, so those
/// count as line ends too. Empty lines are skipped.
#[derive(Debug, Default)]
pub struct LineSplitter {
    pending: Vec<u8>,
}

impl LineSplitter {
    pub fn push(&mut self, bytes: &[u8], mut on_line: impl FnMut(&str)) {
        for &byte in bytes {
            if byte == b'\n' || byte == b'\r' {
                self.flush(&mut on_line);
            } else {
                self.pending.push(byte);
            }
        }
    }

    pub fn finish(&mut self, mut on_line: impl FnMut(&str)) {
        self.flush(&mut on_line);
    }

    fn flush(&mut self, on_line: &mut impl FnMut(&str)) {
        if self.pending.is_empty() {
            return;
        }
        let line = String::from_utf8_lossy(&self.pending).into_owned();
        self.pending.clear();
        on_line(&line);
    }
}
