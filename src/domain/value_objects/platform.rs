use std::fmt;
use std::path::{Path, PathBuf};

/// Host platform families that change how tools are discovered and invoked
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Platform {
    /// macOS, where `/usr/bin` carries Xcode shims
    MacOs,
    /// Windows, where tools live under Program Files
    Windows,
    /// Linux and every other Unix-like system
    Other,
}

impl Platform {
    /// Platform this binary was compiled for
    pub fn current() -> Self {
        if cfg!(target_os = "macos") {
            Platform::MacOs
        } else if cfg!(target_os = "windows") {
            Platform::Windows
        } else {
            Platform::Other
        }
    }

    /// Upper-case a leading drive letter (`c:\` -> `C:\`) on Windows.
    ///
    /// Some tools treat `c:\repo` and `C:\repo` as different paths. Other
    /// platforms get the path back untouched.
    pub fn sanitize_path(&self, path: &Path) -> PathBuf {
        if *self != Platform::Windows {
            return path.to_path_buf();
        }

        let Some(raw) = path.to_str() else {
            return path.to_path_buf();
        };

        let bytes = raw.as_bytes();
        if bytes.len() >= 3
            && bytes[0].is_ascii_lowercase()
            && bytes[1] == b':'
            && bytes[2] == b'\\'
        {
            let mut fixed = String::with_capacity(raw.len());
            fixed.push(bytes[0].to_ascii_uppercase() as char);
            fixed.push_str(&raw[1..]);
            return PathBuf::from(fixed);
        }

        path.to_path_buf()
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Platform::MacOs => write!(f, "macos"),
            Platform::Windows => write!(f, "windows"),
            Platform::Other => write!(f, "other"),
        }
    }
}
