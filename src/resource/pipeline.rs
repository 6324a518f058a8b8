//! Aggregation Pipeline
//!
//! Runs the finder chain, applies the scope filters and optionally fetches
//! every discovered resource so the listing reflects the cloud as it is.

use super::finder::{default_finders, Finder};
use super::wrapper::ResourceWrapper;
use crate::context::{GroupContext, Scope};
use crate::error::{Error, Result};
use futures::stream::{self, StreamExt};
use std::collections::HashSet;
use tokio::sync::Mutex;
use tokio::time::MissedTickBehavior;

pub struct Pipeline {
    finders: Vec<Box<dyn Finder>>,
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::new(default_finders())
    }
}

/// Reject flag combinations that cannot be honored. The VPC filter needs
/// fetched state, which fast mode never has.
pub fn check_list_flags(fast: bool, scope: &Scope) -> Result<()> {
    if fast && scope.vpc_id.is_some() {
        return Err(Error::config("fast and vpcid are not compatible"));
    }
    Ok(())
}

impl Pipeline {
    pub fn new(finders: Vec<Box<dyn Finder>>) -> Self {
        Self { finders }
    }

    /// Discover without fetching: finder chain, infrastructure-only prune
    /// when a VPC filter is set, then the group filter.
    pub async fn list_all(&self, ctx: &GroupContext) -> Result<Vec<ResourceWrapper>> {
        let mut wrappers = Vec::new();
        for finder in &self.finders {
            tracing::debug!("find {}", finder.name());
            wrappers = finder
                .find(ctx, wrappers)
                .await
                .map_err(|e| Error::discovery(finder.name(), e))?;
        }

        let mut seen = HashSet::new();
        wrappers.retain(|w| {
            let first = seen.insert(w.address().to_string());
            if !first {
                tracing::warn!("multiple resources have the same address: {}", w.address());
            }
            first
        });

        let scope = ctx.scope();
        if scope.infrastructure_only() {
            wrappers.retain(|w| w.id().resource_type() == "is");
        }
        // finders may add resources from other groups
        if let Some(group_id) = &scope.group_id {
            wrappers.retain(|w| w.group_id() == group_id);
        }

        tracing::info!("discovered {} resources", wrappers.len());
        Ok(wrappers)
    }

    /// The resources of the current scope, fetched unless `fast`
    pub async fn list(&self, ctx: &GroupContext, fast: bool) -> Result<Vec<ResourceWrapper>> {
        check_list_flags(fast, ctx.scope())?;
        let wrappers = self.list_all(ctx).await?;
        if fast {
            return Ok(wrappers);
        }
        Ok(fetch_scoped(ctx, wrappers).await)
    }
}

/// Fetch `wrappers` and apply the VPC filter, which needs fetched state
pub async fn fetch_scoped(
    ctx: &GroupContext,
    mut wrappers: Vec<ResourceWrapper>,
) -> Vec<ResourceWrapper> {
    fetch_all(ctx, &mut wrappers).await;

    if let Some(vpc_id) = &ctx.scope().vpc_id {
        wrappers.retain(|w| {
            w.capabilities().network_affiliation && w.vpc_id() == Some(vpc_id.as_str())
        });
    }
    wrappers
}

/// Fetch every wrapper with bounded concurrency, one dispatch per pacing tick
pub async fn fetch_all(ctx: &GroupContext, wrappers: &mut [ResourceWrapper]) {
    let pacing = ctx.settings.fetch_pacing;
    let ticker = (!pacing.is_zero()).then(|| {
        let mut interval = tokio::time::interval(pacing);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        Mutex::new(interval)
    });
    let ticker = &ticker;

    stream::iter(wrappers.iter_mut())
        .for_each_concurrent(ctx.settings.fetch_concurrency.max(1), |wrapper| async move {
            if let Some(ticker) = ticker {
                ticker.lock().await.tick().await;
            }
            wrapper.fetch(ctx).await;
        })
        .await;
}
