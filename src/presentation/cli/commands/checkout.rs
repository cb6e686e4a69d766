use super::InterruptGuard;
use crate::common::result::AppResult;
use crate::presentation::cli::{CommandContext, RepositoryArgs};
use crate::presentation::ui::progress::BarReporter;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Handler for the checkout command
pub struct CheckoutCommand {
    pub args: RepositoryArgs,
}

impl CheckoutCommand {
    pub fn new(args: RepositoryArgs) -> Self {
        Self { args }
    }

    pub async fn execute(&self, context: &CommandContext) -> AppResult<()> {
        let display = &context.display;
        let tool = context.registry.resolve(self.args.scm).await?;
        let request = self.args.to_request();

        display.info(&format!(
            "Checking out {} with {} {}",
            display.format_url(&request.url),
            tool.descriptor.name,
            tool.version
        ));

        let token = CancellationToken::new();
        let _interrupt = InterruptGuard::install(token.clone());
        let reporter = BarReporter::new(display.create_progress_bar("checkout"));
        let bar = reporter.bar().clone();

        let outcome = context
            .checkout_use_case()
            .checkout(&tool, request, Arc::new(reporter), Some(token))
            .await;
        bar.finish_and_clear();

        let result = outcome?;
        display.success(&format!(
            "Checked out into {}",
            display.format_path(&result.checkout_dir.display().to_string())
        ));

        Ok(())
    }
}
