//! Schematics workspaces

use super::{format_line, observe, requested, string_at, Operations};
use crate::context::GroupContext;
use crate::resource::wrapper::{Outcome, Target};
use async_trait::async_trait;

/// Sub-type of workspace addresses
pub const WORKSPACE_SUBTYPE: &str = "workspace";

#[derive(Debug, Default, Clone, Copy)]
pub struct WorkspaceOperations;

fn workspace_url(ctx: &GroupContext, target: &Target<'_>) -> String {
    ctx.client.schematics_url(
        target.id.region(),
        &format!("workspaces/{}", target.id.sub_id()),
    )
}

#[async_trait]
impl Operations for WorkspaceOperations {
    async fn fetch(&mut self, ctx: &GroupContext, target: &Target<'_>) -> Outcome {
        let url = workspace_url(ctx, target);
        observe(ctx.client.get(&url).await, |body| {
            Outcome::exists(string_at(body, "name"))
        })
    }

    async fn destroy(&mut self, ctx: &GroupContext, target: &Target<'_>) -> Outcome {
        let url = workspace_url(ctx, target);
        requested(ctx.client.delete(&url).await)
    }

    fn format_instance(&self, target: &Target<'_>, _fast: bool) -> String {
        format_line(target, target.name.unwrap_or("-"), "schematics workspace")
    }
}
