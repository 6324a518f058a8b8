use super::Finder;
use crate::context::GroupContext;
use crate::error::Result;
use crate::resource::operations::workspace::{WorkspaceOperations, WORKSPACE_SUBTYPE};
use crate::resource::wrapper::ResourceWrapper;
use async_trait::async_trait;

/// Binds workspace operations to schematics workspaces; finds nothing new
pub struct WorkspaceFinder;

#[async_trait]
impl Finder for WorkspaceFinder {
    fn name(&self) -> &'static str {
        "schematics"
    }

    async fn find(
        &self,
        _ctx: &GroupContext,
        mut wrappers: Vec<ResourceWrapper>,
    ) -> Result<Vec<ResourceWrapper>> {
        for wrapper in wrappers.iter_mut().filter(|w| {
            w.id().resource_type() == "schematics" && w.id().sub_type() == WORKSPACE_SUBTYPE
        }) {
            wrapper.bind(Box::new(WorkspaceOperations));
        }
        Ok(wrappers)
    }
}
