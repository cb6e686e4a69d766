//! Test helper functions and utilities

use scm_checkout::domain::entities::tool::{ResolvedTool, ToolDescriptor};
use scm_checkout::domain::value_objects::scm_type::ScmType;
use std::path::Path;
use tempfile::TempDir;

/// A resolved git that is never actually run
pub fn fake_git() -> ResolvedTool {
    ResolvedTool::new(*ToolDescriptor::for_scm(ScmType::Git), "/usr/bin/git", "2.43.0")
}

/// A resolved svn that is never actually run
pub fn fake_svn() -> ResolvedTool {
    ResolvedTool::new(*ToolDescriptor::for_scm(ScmType::Svn), "/usr/bin/svn", "1.14.2")
}

/// Temporary directory holding an `addons` parent folder
pub fn workspace() -> TempDir {
    let temp_dir = TempDir::new().expect("temp dir");
    std::fs::create_dir_all(temp_dir.path().join("addons")).expect("addons dir");
    temp_dir
}

/// Write a file, creating parents
pub fn write_file(path: &Path, contents: &str) {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).expect("parent dir");
    }
    std::fs::write(path, contents).expect("write file");
}
