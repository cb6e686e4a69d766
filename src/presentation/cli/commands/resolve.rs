use crate::common::result::AppResult;
use crate::domain::value_objects::scm_type::ScmType;
use crate::presentation::cli::CommandContext;

/// Handler for the resolve command
pub struct ResolveCommand {
    pub scm: Option<ScmType>,
}

impl ResolveCommand {
    pub fn new(scm: Option<ScmType>) -> Self {
        Self { scm }
    }

    pub async fn execute(&self, context: &CommandContext) -> AppResult<()> {
        let display = &context.display;

        if let Some(scm) = self.scm {
            let tool = context.registry.resolve(scm).await?;
            display.success(&format!(
                "{} {} at {}",
                tool.descriptor.name,
                tool.version,
                display.format_path(&tool.path.display().to_string())
            ));
            return Ok(());
        }

        let found = context.registry.initial_scan().await;
        let rows = ScmType::ALL
            .iter()
            .map(|scm| match found.iter().find(|tool| tool.scm_type() == *scm) {
                Some(tool) => vec![
                    scm.to_string(),
                    tool.version.clone(),
                    tool.path.display().to_string(),
                ],
                None => vec![scm.to_string(), "-".to_string(), "not found".to_string()],
            })
            .collect::<Vec<_>>();

        display.print_table(&["TOOL", "VERSION", "PATH"], &rows);

        if found.is_empty() {
            display.warning("No supported tool was found");
        }

        Ok(())
    }
}
