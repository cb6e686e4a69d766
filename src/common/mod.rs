pub mod error;
pub mod result;

pub use error::AppError;
pub use result::{AppResult, IoResultExt};
