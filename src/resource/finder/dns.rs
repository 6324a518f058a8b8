//! DNS services
//!
//! Expands each DNS service instance into its zones, global load balancer
//! pools and monitors, custom resolvers, and per zone its permitted
//! networks and load balancers.

use super::Finder;
use crate::context::GroupContext;
use crate::error::Result;
use crate::resource::operations::dns::{DnsKind, DnsOperations};
use crate::resource::wrapper::ResourceWrapper;
use async_trait::async_trait;
use serde_json::Value;

pub struct DnsFinder;

fn is_dns_instance(wrapper: &ResourceWrapper) -> bool {
    wrapper.id().resource_type() == "dns-svcs" && wrapper.id().sub_type().is_empty()
}

async fn list(ctx: &GroupContext, instance_id: &str, path: &str, key: &str) -> Result<Vec<Value>> {
    let response = ctx.client.get(&ctx.client.dns_url(instance_id, path)).await?;
    Ok(response
        .get(key)
        .and_then(|v| v.as_array())
        .cloned()
        .unwrap_or_default())
}

fn child(parent: &ResourceWrapper, kind: DnsKind, item: &Value) -> Option<ResourceWrapper> {
    let id = item.get("id").and_then(|v| v.as_str())?;
    let name = item.get("name").and_then(|v| v.as_str()).map(str::to_string);
    Some(ResourceWrapper::sub_resource(
        parent,
        kind.marker(),
        id,
        name,
        Box::new(DnsOperations::new(kind)),
    ))
}

async fn expand(ctx: &GroupContext, parent: &ResourceWrapper) -> Result<Vec<ResourceWrapper>> {
    let instance_id = parent.id().primary_id();
    let mut children = Vec::new();

    for pool in list(ctx, instance_id, "pools", "pools").await? {
        children.extend(child(parent, DnsKind::Pool, &pool));
    }
    for monitor in list(ctx, instance_id, "monitors", "monitors").await? {
        children.extend(child(parent, DnsKind::Monitor, &monitor));
    }
    for resolver in list(ctx, instance_id, "custom_resolvers", "custom_resolvers").await? {
        children.extend(child(parent, DnsKind::CustomResolver, &resolver));
    }

    for zone in list(ctx, instance_id, "dnszones", "dnszones").await? {
        let Some(zone_id) = zone.get("id").and_then(|v| v.as_str()) else {
            continue;
        };
        children.extend(child(parent, DnsKind::Zone, &zone));

        let networks_path = format!("dnszones/{}/permitted_networks", zone_id);
        for network in list(ctx, instance_id, &networks_path, "permitted_networks").await? {
            let kind = DnsKind::PermittedNetwork {
                zone_id: zone_id.to_string(),
            };
            children.extend(child(parent, kind, &network));
        }

        let balancers_path = format!("dnszones/{}/load_balancers", zone_id);
        for balancer in list(ctx, instance_id, &balancers_path, "load_balancers").await? {
            let kind = DnsKind::LoadBalancer {
                zone_id: zone_id.to_string(),
            };
            children.extend(child(parent, kind, &balancer));
        }
    }

    Ok(children)
}

#[async_trait]
impl Finder for DnsFinder {
    fn name(&self) -> &'static str {
        "dns"
    }

    async fn find(
        &self,
        ctx: &GroupContext,
        mut wrappers: Vec<ResourceWrapper>,
    ) -> Result<Vec<ResourceWrapper>> {
        let mut children = Vec::new();
        for parent in wrappers.iter().filter(|w| is_dns_instance(w)) {
            children.extend(expand(ctx, parent).await?);
        }
        tracing::debug!("dns instances expanded into {} objects", children.len());
        wrappers.extend(children);
        Ok(wrappers)
    }
}
