//! Command flows shared by the CLI: `ls`, `rm` and `test`

use crate::context::{GroupContext, Scope};
use crate::error::{Error, Result};
use crate::resource::pipeline::fetch_scoped;
use crate::resource::present::write_listing;
use crate::resource::{drive, Pipeline, SweepReport};
use std::io::{BufRead, Write};

pub const CONFIRM_PROMPT: &str = "Remove these resources? Y/n: ";

/// Removal must be narrowed by a group, a VPC or a single address
pub fn require_removal_scope(scope: &Scope, crn: Option<&str>) -> Result<()> {
    let scoped = scope.group_name.is_some()
        || scope.group_id.is_some()
        || scope.vpc_id.is_some()
        || crn.is_some_and(|c| !c.is_empty());
    if !scoped {
        return Err(Error::config(
            "removing all resources is not supported, select a resource group, vpc or crn",
        ));
    }
    Ok(())
}

/// Empty input or anything starting with y/Y confirms
pub fn confirmed(input: &str) -> bool {
    let answer = input.trim().to_lowercase();
    answer.is_empty() || answer.starts_with('y')
}

pub async fn ls<W: Write>(
    ctx: &GroupContext,
    pipeline: &Pipeline,
    fast: bool,
    out: &mut W,
) -> Result<()> {
    let wrappers = pipeline.list(ctx, fast).await?;
    write_listing(out, ctx, &wrappers, fast).await
}

#[derive(Debug, Clone, Default)]
pub struct RemoveOptions {
    /// Restrict removal to this one address
    pub crn: Option<String>,
    /// Skip the confirmation prompt
    pub force: bool,
}

/// List the matching resources, confirm, then drive them to deletion.
/// Returns `None` when nothing was attempted.
pub async fn rm<R: BufRead, W: Write>(
    ctx: &GroupContext,
    pipeline: &Pipeline,
    options: &RemoveOptions,
    input: &mut R,
    out: &mut W,
) -> Result<Option<SweepReport>> {
    require_removal_scope(ctx.scope(), options.crn.as_deref())?;

    let wrappers = match &options.crn {
        Some(crn) => {
            // only the named resource is fetched
            let mut matching = pipeline.list_all(ctx).await?;
            matching.retain(|w| w.address() == crn);
            let matching = fetch_scoped(ctx, matching).await;
            if matching.is_empty() {
                writeln!(out, "crn not found, crn: {}", crn)?;
                return Ok(None);
            }
            matching
        }
        None => pipeline.list(ctx, false).await?,
    };

    write_listing(out, ctx, &wrappers, false).await?;

    if !options.force {
        write!(out, "{}", CONFIRM_PROMPT)?;
        out.flush()?;
        let mut answer = String::new();
        input.read_line(&mut answer)?;
        if !confirmed(&answer) {
            return Ok(None);
        }
    }

    let report = drive(ctx, pipeline, wrappers, out).await?;
    tracing::info!(
        "removed {} resources in {} sweeps",
        report.deleted,
        report.sweeps
    );
    Ok(Some(report))
}
