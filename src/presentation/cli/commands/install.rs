use super::InterruptGuard;
use crate::application::use_cases::InstallRepositoryUseCase;
use crate::common::result::AppResult;
use crate::infrastructure::filesystem::LocalFileSystem;
use crate::presentation::cli::{CommandContext, RepositoryArgs};
use crate::presentation::ui::progress::BarReporter;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Handler for the install command
pub struct InstallCommand {
    pub args: RepositoryArgs,
}

impl InstallCommand {
    pub fn new(args: RepositoryArgs) -> Self {
        Self { args }
    }

    pub async fn execute(&self, context: &CommandContext) -> AppResult<()> {
        let display = &context.display;
        let tool = context.registry.resolve(self.args.scm).await?;
        let request = self.args.to_request();

        display.info(&format!(
            "Installing {} into {}",
            display.format_url(&request.url),
            display.format_path(&request.target.display().to_string())
        ));

        let use_case = InstallRepositoryUseCase::new(
            Arc::new(context.checkout_use_case()),
            Arc::new(LocalFileSystem::new()),
        );

        let token = CancellationToken::new();
        let _interrupt = InterruptGuard::install(token.clone());
        let reporter = BarReporter::new(display.create_progress_bar("install"));
        let bar = reporter.bar().clone();

        let outcome = use_case
            .install(&tool, request, Arc::new(reporter), Some(token))
            .await;
        bar.finish_and_clear();

        let installed = outcome?;
        display.success(&format!(
            "Installed into {} ({} {})",
            display.format_path(&installed.target.display().to_string()),
            tool.descriptor.name,
            installed.tool_version
        ));

        Ok(())
    }
}
