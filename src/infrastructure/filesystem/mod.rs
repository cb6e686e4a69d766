pub mod config_store;
pub mod local_fs;

pub use config_store::{ConfigStore, ConfigStoreError, EngineConfig};
pub use local_fs::{FileSystemProvider, LocalFileSystem};
