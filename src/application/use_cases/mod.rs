pub mod checkout_repository;
pub mod install_repository;

pub use checkout_repository::{CheckoutConfig, CheckoutRepositoryUseCase, StagingLayout};
pub use install_repository::{InstallRepositoryError, InstallRepositoryUseCase, InstallResult};
