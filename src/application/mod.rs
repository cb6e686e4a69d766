//! Application layer: the checkout and install workflows.

pub mod use_cases;

pub use use_cases::{
    CheckoutConfig,
    CheckoutRepositoryUseCase,
    InstallRepositoryError,
    InstallRepositoryUseCase,
    InstallResult,
    StagingLayout,
};
