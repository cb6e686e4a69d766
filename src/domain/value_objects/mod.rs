pub mod platform;
pub mod scm_type;
pub mod tool_version;

pub use platform::Platform;
pub use scm_type::{ScmType, ScmTypeError};
pub use tool_version::{parse_version, validate_version, VersionError};
