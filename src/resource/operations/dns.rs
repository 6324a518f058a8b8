//! DNS services objects
//!
//! Children of a DNS service instance, addressed as sub-resources of it
//! (`iww-zone`, `iww-pool`, ...). The instance guid is the address
//! `primary_id`, the object id its `sub_id`. Permitted networks and load
//! balancers live inside a zone and carry the zone id with them.

use super::{format_line, observe, requested, string_at, Operations};
use crate::context::GroupContext;
use crate::resource::wrapper::{Outcome, Target};
use async_trait::async_trait;
use serde_json::json;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DnsKind {
    Zone,
    Pool,
    Monitor,
    CustomResolver,
    PermittedNetwork { zone_id: String },
    LoadBalancer { zone_id: String },
}

impl DnsKind {
    /// Sub-type marker suffix, `iww-<marker>` in the address
    pub fn marker(&self) -> &'static str {
        match self {
            DnsKind::Zone => "zone",
            DnsKind::Pool => "pool",
            DnsKind::Monitor => "monitor",
            DnsKind::CustomResolver => "cr",
            DnsKind::PermittedNetwork { .. } => "pn",
            DnsKind::LoadBalancer { .. } => "lb",
        }
    }

    /// Kind of an address sub-type; zone children cannot be rebuilt from
    /// the address alone and yield `None`.
    pub fn from_sub_type(sub_type: &str) -> Option<Self> {
        match sub_type {
            "iww-zone" => Some(DnsKind::Zone),
            "iww-pool" => Some(DnsKind::Pool),
            "iww-monitor" => Some(DnsKind::Monitor),
            "iww-cr" => Some(DnsKind::CustomResolver),
            _ => None,
        }
    }

    fn path(&self, object_id: &str) -> String {
        match self {
            DnsKind::Zone => format!("dnszones/{}", object_id),
            DnsKind::Pool => format!("pools/{}", object_id),
            DnsKind::Monitor => format!("monitors/{}", object_id),
            DnsKind::CustomResolver => format!("custom_resolvers/{}", object_id),
            DnsKind::PermittedNetwork { zone_id } => {
                format!("dnszones/{}/permitted_networks/{}", zone_id, object_id)
            }
            DnsKind::LoadBalancer { zone_id } => {
                format!("dnszones/{}/load_balancers/{}", zone_id, object_id)
            }
        }
    }

    fn zone_id(&self) -> Option<&str> {
        match self {
            DnsKind::PermittedNetwork { zone_id } | DnsKind::LoadBalancer { zone_id } => {
                Some(zone_id)
            }
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct DnsOperations {
    kind: DnsKind,
}

impl DnsOperations {
    pub fn new(kind: DnsKind) -> Self {
        Self { kind }
    }

    fn object_url(&self, ctx: &GroupContext, target: &Target<'_>) -> String {
        ctx.client
            .dns_url(target.id.primary_id(), &self.kind.path(target.id.sub_id()))
    }
}

#[async_trait]
impl Operations for DnsOperations {
    async fn fetch(&mut self, ctx: &GroupContext, target: &Target<'_>) -> Outcome {
        let url = self.object_url(ctx, target);
        let keeps_name = self.kind.zone_id().is_none();
        observe(ctx.client.get(&url).await, |body| {
            Outcome::exists(string_at(body, "name").filter(|_| keeps_name))
        })
    }

    async fn destroy(&mut self, ctx: &GroupContext, target: &Target<'_>) -> Outcome {
        let url = self.object_url(ctx, target);
        let mut disable_error = None;
        if self.kind == DnsKind::CustomResolver {
            // a resolver must be disabled before it can be deleted
            if let Err(e) = ctx.client.patch(&url, &json!({ "enabled": false })).await {
                disable_error = Some(e);
            }
        }
        let outcome = requested(ctx.client.delete(&url).await);
        match disable_error {
            Some(e) => outcome.and_error(e),
            None => outcome,
        }
    }

    fn format_instance(&self, target: &Target<'_>, _fast: bool) -> String {
        match self.kind.zone_id() {
            Some(zone_id) => format_line(target, &format!("zoneid-{}", zone_id), "dns"),
            None => format_line(target, target.name.unwrap_or("-"), "dns"),
        }
    }
}
