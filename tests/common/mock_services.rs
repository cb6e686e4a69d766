//! Mock services for testing
//!
//! Hand-written stand-ins for the executor, the process spawner and the
//! progress reporter so workflows can be driven without real tools.

use async_trait::async_trait;
use scm_checkout::domain::entities::tool::ResolvedTool;
use scm_checkout::domain::value_objects::scm_type::ScmType;
use scm_checkout::infrastructure::process::command_executor::{
    ExecOptions, ExecutionResult, ScmExecutor,
};
use scm_checkout::infrastructure::process::spawner::{
    ProcessReader, ProcessSpawner, ProcessWriter, SpawnRequest, SpawnedProcess,
};
use scm_checkout::infrastructure::process::ProgressReporter;
use scm_checkout::infrastructure::scm::{ScmError, ScmErrorCode};
use std::collections::VecDeque;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::io::DuplexStream;

/// One recorded `exec` call
#[derive(Debug, Clone)]
pub struct ExecCall {
    pub cwd: PathBuf,
    pub args: Vec<String>,
    pub had_cancellation_token: bool,
}

/// Executor that replays scripted outcomes, one per call.
///
/// A successful call creates the checkout destination with a
/// metadata directory and a file, and feeds a progress line to the consumer.
/// Once the script runs out every further call succeeds.
pub struct StubExecutor {
    outcomes: Mutex<VecDeque<Result<(), ScmErrorCode>>>,
    calls: Mutex<Vec<ExecCall>>,
    progress_lines: Vec<String>,
}

impl StubExecutor {
    pub fn new(outcomes: Vec<Result<(), ScmErrorCode>>) -> Self {
        Self {
            outcomes: Mutex::new(outcomes.into()),
            calls: Mutex::new(Vec::new()),
            progress_lines: vec![
                "Counting objects: 100% (10/10), done.".to_string(),
                "Receiving objects: 100% (10/10), done.".to_string(),
            ],
        }
    }

    pub fn succeeding() -> Self {
        Self::new(Vec::new())
    }

    pub fn failing(times: usize, code: ScmErrorCode) -> Self {
        Self::new(vec![Err(code); times])
    }

    pub fn calls(&self) -> Vec<ExecCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl ScmExecutor for StubExecutor {
    async fn exec(
        &self,
        tool: &ResolvedTool,
        cwd: &Path,
        args: &[String],
        mut options: ExecOptions,
    ) -> Result<ExecutionResult, ScmError> {
        let attempt = {
            let mut calls = self.calls.lock().unwrap();
            calls.push(ExecCall {
                cwd: cwd.to_path_buf(),
                args: args.to_vec(),
                had_cancellation_token: options.cancellation_token.is_some(),
            });
            calls.len()
        };

        if let Some(consumer) = options.line_consumer.as_deref_mut() {
            for line in &self.progress_lines {
                consumer.consume(line);
            }
        }

        let outcome = self.outcomes.lock().unwrap().pop_front().unwrap_or(Ok(()));
        match outcome {
            Ok(()) => {
                // git: clone ... <url> <dest>; svn: checkout <url> <dest> ...
                let destination = match (tool.scm_type(), args.first().map(String::as_str)) {
                    (ScmType::Git, Some("clone")) => args.last().map(PathBuf::from),
                    (ScmType::Svn, Some("checkout")) => args.get(2).map(PathBuf::from),
                    _ => None,
                };
                if let Some(destination) = destination {
                    std::fs::create_dir_all(destination.join(tool.descriptor.metadata_dir())).unwrap();
                    std::fs::write(destination.join("README.md"), "checked out\n").unwrap();
                }
                Ok(ExecutionResult {
                    exit_code: 0,
                    stdout: String::new(),
                    stderr: String::new(),
                })
            }
            Err(ScmErrorCode::Cancelled) => Err(ScmError::cancelled(tool.descriptor).with_args(args)),
            Err(code) => Err(ScmError::new(
                tool.descriptor,
                code,
                format!("attempt {} failed", attempt),
            )
            .with_args(args)
            .with_output(1, "", format!("stub failure {}", attempt))),
        }
    }
}

/// How a stub child behaves
#[derive(Debug, Clone)]
pub enum StubBehavior {
    /// Emits the given output then exits with `exit_code`
    Finish {
        exit_code: i32,
        stdout: Vec<u8>,
        stderr: Vec<u8>,
    },
    /// Keeps its pipes open and never exits
    Hang,
}

/// Spawner producing [`StubBehavior`] children and counting kills
pub struct StubSpawner {
    behavior: StubBehavior,
    spawned: AtomicUsize,
    kills: Arc<AtomicUsize>,
    requests: Mutex<Vec<SpawnRequest>>,
}

impl StubSpawner {
    pub fn new(behavior: StubBehavior) -> Self {
        Self {
            behavior,
            spawned: AtomicUsize::new(0),
            kills: Arc::new(AtomicUsize::new(0)),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn finishing(exit_code: i32, stdout: &[u8], stderr: &[u8]) -> Self {
        Self::new(StubBehavior::Finish {
            exit_code,
            stdout: stdout.to_vec(),
            stderr: stderr.to_vec(),
        })
    }

    pub fn hanging() -> Self {
        Self::new(StubBehavior::Hang)
    }

    pub fn spawned(&self) -> usize {
        self.spawned.load(Ordering::SeqCst)
    }

    pub fn kills(&self) -> usize {
        self.kills.load(Ordering::SeqCst)
    }

    pub fn last_request(&self) -> Option<SpawnRequest> {
        self.requests.lock().unwrap().last().cloned()
    }
}

impl ProcessSpawner for StubSpawner {
    fn spawn(&self, request: &SpawnRequest) -> io::Result<Box<dyn SpawnedProcess>> {
        self.spawned.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().unwrap().push(request.clone());

        let process = match &self.behavior {
            StubBehavior::Finish {
                exit_code,
                stdout,
                stderr,
            } => StubProcess {
                stdout: Some(Box::new(io::Cursor::new(stdout.clone()))),
                stderr: Some(Box::new(io::Cursor::new(stderr.clone()))),
                exit_code: Some(*exit_code),
                kills: self.kills.clone(),
                _open_ends: Vec::new(),
            },
            StubBehavior::Hang => {
                let (stdout, stdout_end) = tokio::io::duplex(64);
                let (stderr, stderr_end) = tokio::io::duplex(64);
                StubProcess {
                    stdout: Some(Box::new(stdout)),
                    stderr: Some(Box::new(stderr)),
                    exit_code: None,
                    kills: self.kills.clone(),
                    _open_ends: vec![stdout_end, stderr_end],
                }
            }
        };

        Ok(Box::new(process))
    }
}

struct StubProcess {
    stdout: Option<ProcessReader>,
    stderr: Option<ProcessReader>,
    exit_code: Option<i32>,
    kills: Arc<AtomicUsize>,
    // Writer halves kept alive so the readers never see EOF
    _open_ends: Vec<DuplexStream>,
}

#[async_trait]
impl SpawnedProcess for StubProcess {
    fn id(&self) -> Option<u32> {
        Some(4242)
    }

    fn take_stdin(&mut self) -> Option<ProcessWriter> {
        None
    }

    fn take_stdout(&mut self) -> Option<ProcessReader> {
        self.stdout.take()
    }

    fn take_stderr(&mut self) -> Option<ProcessReader> {
        self.stderr.take()
    }

    async fn wait(&mut self) -> io::Result<Option<i32>> {
        match self.exit_code {
            Some(code) => Ok(Some(code)),
            None => std::future::pending().await,
        }
    }

    fn kill(&mut self) -> io::Result<()> {
        self.kills.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// Reporter that remembers every increment
#[derive(Default)]
pub struct RecordingReporter {
    increments: Mutex<Vec<i32>>,
}

impl RecordingReporter {
    pub fn increments(&self) -> Vec<i32> {
        self.increments.lock().unwrap().clone()
    }

    pub fn total(&self) -> i32 {
        self.increments().iter().sum()
    }
}

impl ProgressReporter for RecordingReporter {
    fn report(&self, increment: i32) {
        self.increments.lock().unwrap().push(increment);
    }
}
