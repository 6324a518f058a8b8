//! Listing output
//!
//! Resources are partitioned into unimplemented, missing and existing
//! sections, then grouped by resource group and sorted by address:
//!
//! ```text
//! #Missing resource instances
//! # <group id> ( <group name> )
//! is subnet web vpc crn:v1:...
//! #Resource instances
//! # <group id> ( <group name> )
//! ...
//! ```

use super::wrapper::{LifecycleState, ResourceWrapper};
use crate::context::GroupContext;
use crate::error::Result;
use std::collections::BTreeMap;
use std::io::Write;

pub const UNIMPLEMENTED_HEADER: &str = "#Unimplemented resource instances";
pub const MISSING_HEADER: &str = "#Missing resource instances";
pub const EXISTING_HEADER: &str = "#Resource instances";

/// Write the sectioned listing. Only the existing section is always present;
/// in fast mode nothing was fetched and everything is listed there.
pub async fn write_listing<W: Write>(
    out: &mut W,
    ctx: &GroupContext,
    wrappers: &[ResourceWrapper],
    fast: bool,
) -> Result<()> {
    let mut unimplemented = Vec::new();
    let mut missing = Vec::new();
    let mut existing = Vec::new();

    for wrapper in wrappers {
        if fast {
            existing.push(wrapper);
        } else if !wrapper.capabilities().implemented {
            unimplemented.push(wrapper);
        } else if wrapper.state() == LifecycleState::Deleted {
            missing.push(wrapper);
        } else {
            existing.push(wrapper);
        }
    }

    if !unimplemented.is_empty() {
        writeln!(out, "{}", UNIMPLEMENTED_HEADER)?;
        write_groups(out, ctx, unimplemented, fast).await?;
    }
    if !missing.is_empty() {
        writeln!(out, "{}", MISSING_HEADER)?;
        write_groups(out, ctx, missing, fast).await?;
    }
    writeln!(out, "{}", EXISTING_HEADER)?;
    write_groups(out, ctx, existing, fast).await
}

/// One `# <id> ( <name> )` block per group, groups ordered by id
pub async fn write_groups<W: Write>(
    out: &mut W,
    ctx: &GroupContext,
    wrappers: Vec<&ResourceWrapper>,
    fast: bool,
) -> Result<()> {
    let mut by_group: BTreeMap<&str, Vec<&ResourceWrapper>> = BTreeMap::new();
    for wrapper in wrappers {
        by_group.entry(wrapper.group_id()).or_default().push(wrapper);
    }

    for (group_id, mut members) in by_group {
        members.sort_by(|a, b| a.address().cmp(b.address()));
        let group_name = ctx.group_name(group_id, fast).await;
        writeln!(out, "# {} ( {} )", group_id, group_name)?;
        for wrapper in members {
            writeln!(out, "{}", wrapper.format_instance(fast))?;
        }
    }
    Ok(())
}
