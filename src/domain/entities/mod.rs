pub mod checkout;
pub mod tool;

pub use checkout::{CheckoutRequest, CheckoutResult, RefSelector};
pub use tool::{CheckoutCommand, CheckoutCommandError, GitReference, ResolvedTool, ToolDescriptor};
