use super::binary_locator::BinaryLocator;
use super::scm_error::{ScmError, ScmErrorCode};
use crate::domain::entities::tool::{ResolvedTool, ToolDescriptor};
use crate::domain::value_objects::scm_type::ScmType;
use crate::domain::value_objects::tool_version::{parse_version, validate_version};
use crate::infrastructure::filesystem::config_store::ToolsConfig;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};
use tracing::{info, warn};

/// Caches one resolved tool per kind and revalidates it on every lookup.
///
/// The lock is only held for map access, never across an await. Two resolves
/// racing for the same kind both discover; the last one stored wins.
pub struct ToolRegistry {
    locator: BinaryLocator,
    hints: ToolsConfig,
    cache: Mutex<HashMap<ScmType, ResolvedTool>>,
}

impl ToolRegistry {
    pub fn new(locator: BinaryLocator, hints: ToolsConfig) -> Self {
        Self {
            locator,
            hints,
            cache: Mutex::new(HashMap::new()),
        }
    }

    fn entries(&self) -> MutexGuard<'_, HashMap<ScmType, ResolvedTool>> {
        self.cache.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Cached entry without probing it
    pub fn cached(&self, scm_type: ScmType) -> Option<ResolvedTool> {
        self.entries().get(&scm_type).cloned()
    }

    /// Return a working, validated tool for `scm_type`.
    ///
    /// A cached entry is re-probed first; if it no longer answers it is
    /// dropped and discovery runs again. Discovery failures are returned as is.
    pub async fn resolve(&self, scm_type: ScmType) -> Result<ResolvedTool, ScmError> {
        if let Some(tool) = self.cached(scm_type) {
            if self.locator.is_alive(&tool).await {
                return Ok(tool);
            }
            warn!(
                "{} at {} stopped responding, rediscovering",
                tool.descriptor.name,
                tool.path.display()
            );
            self.entries().remove(&scm_type);
        }

        let tool = self.discover(scm_type).await?;
        self.entries().insert(scm_type, tool.clone());
        Ok(tool)
    }

    async fn discover(&self, scm_type: ScmType) -> Result<ResolvedTool, ScmError> {
        let descriptor = ToolDescriptor::for_scm(scm_type);
        let located = self
            .locator
            .locate(descriptor, self.hints.hint(scm_type))
            .await?;

        let version = parse_version(scm_type, &located.raw_version);
        let version = validate_version(&version, descriptor.min_version).map_err(|e| {
            ScmError::new(*descriptor, ScmErrorCode::InvalidVersion, e.to_string())
                .with_tool_path(&located.path)
        })?;

        info!(
            "Found {} {} at {}",
            descriptor.name,
            version,
            located.path.display()
        );

        Ok(ResolvedTool::new(*descriptor, located.path, version))
    }

    /// Resolve every supported kind once, logging failures
    pub async fn initial_scan(&self) -> Vec<ResolvedTool> {
        let mut found = Vec::new();
        for scm_type in ScmType::ALL {
            match self.resolve(scm_type).await {
                Ok(tool) => found.push(tool),
                Err(e) => warn!("{} unavailable: {}", scm_type, e),
            }
        }
        found
    }
}
