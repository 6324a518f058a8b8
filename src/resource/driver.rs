//! Lifecycle Driver
//!
//! Repeated sweeps over the active set until every resource is deleted or
//! the sweep budget runs out. Each sweep acts on every wrapper by state:
//!
//! | state      | action         |
//! |------------|----------------|
//! | Start      | fetch          |
//! | Exists     | destroy, fetch |
//! | Destroying | fetch          |
//!
//! A wrapper that is Deleted after its fetch is dropped and the sweep
//! budget starts over. After a sweep the set is pruned to what discovery
//! still finds.

use super::pipeline::Pipeline;
use super::wrapper::{LifecycleState, ResourceWrapper};
use crate::context::GroupContext;
use crate::error::{Error, Result};
use std::collections::HashSet;
use std::io::Write;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SweepReport {
    pub sweeps: usize,
    pub deleted: usize,
}

/// Drive `active` to deletion, reporting each transition to `out`
pub async fn drive<W: Write>(
    ctx: &GroupContext,
    pipeline: &Pipeline,
    mut active: Vec<ResourceWrapper>,
    out: &mut W,
) -> Result<SweepReport> {
    let mut report = SweepReport::default();
    let mut idle_sweeps = 0;

    while !active.is_empty() && idle_sweeps < ctx.settings.sweep_budget {
        report.sweeps += 1;
        idle_sweeps += 1;

        let mut next = Vec::with_capacity(active.len());
        for mut wrapper in active {
            let line = wrapper.format_instance(true);
            match wrapper.state() {
                LifecycleState::Start => writeln!(out, "start: {}", line)?,
                LifecycleState::Exists => {
                    writeln!(out, "destroying {}", line)?;
                    wrapper.destroy(ctx).await;
                }
                LifecycleState::Destroying => writeln!(out, "waiting {}", line)?,
                LifecycleState::Deleted => {}
            }
            wrapper.fetch(ctx).await;

            if wrapper.state() == LifecycleState::Deleted {
                writeln!(out, "deleted: {}", wrapper.format_instance(true))?;
                report.deleted += 1;
                idle_sweeps = 0;
                continue;
            }
            next.push(wrapper);
        }

        active = if next.is_empty() {
            next
        } else {
            prune_undiscovered(ctx, pipeline, next).await
        };
        if !active.is_empty() {
            tokio::time::sleep(ctx.settings.sweep_pause).await;
        }
    }

    if !active.is_empty() {
        return Err(Error::Incomplete {
            remaining: active.len(),
        });
    }
    Ok(report)
}

/// Keep only what discovery still reports; on discovery failure keep everything
async fn prune_undiscovered(
    ctx: &GroupContext,
    pipeline: &Pipeline,
    active: Vec<ResourceWrapper>,
) -> Vec<ResourceWrapper> {
    let discovered = match pipeline.list_all(ctx).await {
        Ok(discovered) => discovered,
        Err(e) => {
            tracing::warn!("can not prune resources: {}", e);
            return active;
        }
    };
    let addresses: HashSet<&str> = discovered.iter().map(|w| w.address()).collect();
    active
        .into_iter()
        .filter(|w| {
            let found = addresses.contains(w.address());
            if !found {
                tracing::debug!("{} no longer discovered, dropping", w.address());
            }
            found
        })
        .collect()
}
