pub mod command_executor;
pub mod progress_parser;
pub mod spawner;

pub use command_executor::{
    ExecOptions,
    ExecutionResult,
    LineSplitter,
    ProcessExecutor,
    ScmExecutor,
    DEFAULT_LOCALE,
};
pub use progress_parser::{LineConsumer, NoopProgress, ProgressParser, ProgressReporter};
pub use spawner::{ProcessSpawner, SpawnRequest, SpawnedProcess, TokioSpawner};
