//! VPC infrastructure
//!
//! Instance templates and IKE policies are not tracked by the resource
//! controller and are listed from every VPC region directly. Every `is`
//! wrapper, listed or not, is then rebound to the VPC operations.

use super::Finder;
use crate::cloud::paging::{start_cursor, with_query, MAX_PAGES};
use crate::context::GroupContext;
use crate::error::Result;
use crate::resource::identifier::ResourceIdentifier;
use crate::resource::operations::vpc;
use crate::resource::wrapper::ResourceWrapper;
use async_trait::async_trait;
use futures::stream::{self, StreamExt, TryStreamExt};
use serde_json::Value;
use std::collections::HashSet;

pub struct VpcFinder;

/// Every item of a regional VPC collection, following `next.href`
async fn list_vpc_collection(
    ctx: &GroupContext,
    region: &str,
    collection: &str,
    key: &str,
) -> Result<Vec<Value>> {
    let base_url = ctx.client.vpc_url(region, collection);
    let mut items = Vec::new();
    let mut start: Option<String> = None;

    for _ in 0..MAX_PAGES {
        let url = match &start {
            Some(start) => with_query(&base_url, "start", start),
            None => base_url.clone(),
        };
        let response = ctx.client.get(&url).await?;
        if let Some(page) = response.get(key).and_then(|v| v.as_array()) {
            items.extend(page.iter().cloned());
        }
        start = response
            .get("next")
            .and_then(|next| next.get("href"))
            .and_then(|v| v.as_str())
            .and_then(start_cursor);
        if start.is_none() {
            break;
        }
    }

    Ok(items)
}

fn group_of(item: &Value) -> String {
    item.get("resource_group")
        .and_then(|g| g.get("id"))
        .and_then(|v| v.as_str())
        .unwrap_or_default()
        .to_string()
}

fn name_of(item: &Value) -> Option<String> {
    item.get("name").and_then(|v| v.as_str()).map(str::to_string)
}

/// Instance templates and IKE policies of one region
async fn region_extras(ctx: &GroupContext, region: &str) -> Result<Vec<ResourceWrapper>> {
    let mut extras = Vec::new();

    for template in list_vpc_collection(ctx, region, "instance_templates", "templates").await? {
        let Some(address) = template.get("crn").and_then(|v| v.as_str()) else {
            continue;
        };
        match ResourceIdentifier::parse(address) {
            Ok(id) => {
                let operations = vpc::operations_for(id.sub_type());
                extras.push(ResourceWrapper::new(
                    id,
                    group_of(&template),
                    name_of(&template),
                    operations,
                ));
            }
            Err(e) => tracing::warn!("Skipping instance template: {}", e),
        }
    }

    for policy in list_vpc_collection(ctx, region, "ike_policies", "ike_policies").await? {
        let Some(policy_id) = policy.get("id").and_then(|v| v.as_str()) else {
            continue;
        };
        let id = ResourceIdentifier::synthetic("is", "", "ikepolicy", policy_id, region);
        extras.push(ResourceWrapper::new(
            id,
            group_of(&policy),
            name_of(&policy),
            vpc::operations_for("ikepolicy"),
        ));
    }

    Ok(extras)
}

#[async_trait]
impl Finder for VpcFinder {
    fn name(&self) -> &'static str {
        "vpc"
    }

    async fn find(
        &self,
        ctx: &GroupContext,
        mut wrappers: Vec<ResourceWrapper>,
    ) -> Result<Vec<ResourceWrapper>> {
        let regions: Vec<String> = ctx
            .client
            .endpoints
            .vpc_regions
            .iter()
            .filter(|region| ctx.scope().region_matches(region))
            .cloned()
            .collect();
        let pacing = ctx.settings.fetch_pacing;

        let per_region: Vec<Vec<ResourceWrapper>> = stream::iter(regions.into_iter().enumerate())
            .map(|(index, region)| async move {
                tokio::time::sleep(pacing * index as u32).await;
                region_extras(ctx, &region).await
            })
            .buffered(ctx.settings.fetch_concurrency.max(1))
            .try_collect()
            .await?;

        let mut known: HashSet<String> = wrappers.iter().map(|w| w.address().to_string()).collect();
        for extra in per_region.into_iter().flatten() {
            if known.insert(extra.address().to_string()) {
                wrappers.push(extra);
            }
        }

        for wrapper in wrappers
            .iter_mut()
            .filter(|w| w.id().resource_type() == "is")
        {
            let operations = vpc::operations_for(wrapper.id().sub_type());
            wrapper.bind(operations);
        }
        Ok(wrappers)
    }
}
