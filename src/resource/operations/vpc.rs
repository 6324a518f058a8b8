//! VPC infrastructure objects
//!
//! Every `is` sub-type maps to a collection of the regional VPC API. The
//! object id is the address `sub_id`. Network ACLs and security groups go
//! away with their VPC and are never deleted directly; instance groups need
//! their membership drained and managers removed first.

use super::unimplemented::UnimplementedOperations;
use super::{format_line, observe, previously_existed, requested, string_at, Operations};
use crate::context::GroupContext;
use crate::resource::wrapper::{Capabilities, Outcome, Target};
use async_trait::async_trait;
use serde_json::{json, Value};

/// Where the owning VPC id is found in a fetched object
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Network {
    /// The object is the VPC
    Own,
    /// `vpc.id` of the object
    Field,
    /// Not affiliated with a VPC
    None,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VpcSubtype {
    pub sub_type: &'static str,
    pub collection: &'static str,
    pub network: Network,
}

const fn subtype(sub_type: &'static str, collection: &'static str, network: Network) -> VpcSubtype {
    VpcSubtype {
        sub_type,
        collection,
        network,
    }
}

pub const VPC_SUBTYPES: &[VpcSubtype] = &[
    subtype("vpc", "vpcs", Network::Own),
    subtype("subnet", "subnets", Network::Field),
    subtype("instance", "instances", Network::Field),
    subtype("volume", "volumes", Network::None),
    subtype("key", "keys", Network::None),
    subtype("load-balancer", "load_balancers", Network::None),
    subtype("floating-ip", "floating_ips", Network::None),
    subtype("image", "images", Network::None),
    subtype("public-gateway", "public_gateways", Network::Field),
    subtype("network-acl", "network_acls", Network::Field),
    subtype("security-group", "security_groups", Network::Field),
    subtype("flow-log-collector", "flow_log_collectors", Network::Field),
    subtype("instance-group", "instance_groups", Network::Field),
    subtype("snapshot", "snapshots", Network::None),
];

/// Sub-types whose API responses are polymorphic or that only the VPC
/// finder discovers
pub const VPC_IRREGULAR_SUBTYPES: &[VpcSubtype] = &[
    subtype("vpn", "vpn_gateways", Network::None),
    subtype("instance-template", "instance_templates", Network::None),
    subtype("ikepolicy", "ike_policies", Network::None),
];

/// Sub-types removed together with their VPC
const NO_DELETE_SUBTYPES: &[&str] = &["network-acl", "security-group"];

const INSTANCE_GROUP: &str = "instance-group";

pub fn find_subtype(sub_type: &str) -> Option<&'static VpcSubtype> {
    VPC_SUBTYPES
        .iter()
        .chain(VPC_IRREGULAR_SUBTYPES.iter())
        .find(|s| s.sub_type == sub_type)
}

/// Operations for an `is` sub-type; unknown sub-types are unimplemented
pub fn operations_for(sub_type: &str) -> Box<dyn Operations> {
    let Some(subtype) = find_subtype(sub_type) else {
        return Box::new(UnimplementedOperations);
    };
    let generic = VpcOperations::new(*subtype);
    if NO_DELETE_SUBTYPES.contains(&sub_type) {
        Box::new(NoDeleteOperations::new(generic))
    } else if sub_type == INSTANCE_GROUP {
        Box::new(InstanceGroupOperations::new(generic))
    } else {
        Box::new(generic)
    }
}

/// Generic fetch/delete of one VPC API object
#[derive(Debug, Clone)]
pub struct VpcOperations {
    subtype: VpcSubtype,
}

impl VpcOperations {
    pub fn new(subtype: VpcSubtype) -> Self {
        Self { subtype }
    }

    fn object_url(&self, ctx: &GroupContext, target: &Target<'_>, suffix: &str) -> String {
        ctx.client.vpc_url(
            target.id.region(),
            &format!("{}/{}{}", self.subtype.collection, target.id.sub_id(), suffix),
        )
    }

    fn network_id(&self, target: &Target<'_>, body: &Value) -> Option<String> {
        match self.subtype.network {
            Network::Own => Some(target.id.sub_id().to_string()),
            Network::Field => body
                .get("vpc")
                .and_then(|vpc| vpc.get("id"))
                .and_then(|id| id.as_str())
                .map(str::to_string),
            Network::None => None,
        }
    }
}

#[async_trait]
impl Operations for VpcOperations {
    async fn fetch(&mut self, ctx: &GroupContext, target: &Target<'_>) -> Outcome {
        let url = self.object_url(ctx, target, "");
        observe(ctx.client.get(&url).await, |body| {
            Outcome::exists(string_at(body, "name")).with_vpc_id(self.network_id(target, body))
        })
    }

    async fn destroy(&mut self, ctx: &GroupContext, target: &Target<'_>) -> Outcome {
        let url = self.object_url(ctx, target, "");
        requested(ctx.client.delete(&url).await)
    }

    fn format_instance(&self, target: &Target<'_>, _fast: bool) -> String {
        format_line(target, target.name.unwrap_or("--"), "vpc")
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities {
            implemented: true,
            network_affiliation: true,
        }
    }
}

/// Never deletes; reports Deleted once destroy was requested on a live object
#[derive(Debug, Clone)]
pub struct NoDeleteOperations {
    inner: VpcOperations,
    destroy_requested: bool,
}

impl NoDeleteOperations {
    pub fn new(inner: VpcOperations) -> Self {
        Self {
            inner,
            destroy_requested: false,
        }
    }
}

#[async_trait]
impl Operations for NoDeleteOperations {
    async fn fetch(&mut self, ctx: &GroupContext, target: &Target<'_>) -> Outcome {
        if self.destroy_requested && previously_existed(target.state) {
            return Outcome::deleted();
        }
        self.inner.fetch(ctx, target).await
    }

    async fn destroy(&mut self, _ctx: &GroupContext, target: &Target<'_>) -> Outcome {
        tracing::debug!("{} is removed with its VPC, skipping delete", target.id);
        self.destroy_requested = true;
        Outcome::unchanged()
    }

    fn format_instance(&self, target: &Target<'_>, fast: bool) -> String {
        self.inner.format_instance(target, fast)
    }

    fn capabilities(&self) -> Capabilities {
        self.inner.capabilities()
    }
}

/// Drains the group and removes its managers before the generic delete.
/// Every step is attempted even when an earlier one failed.
#[derive(Debug, Clone)]
pub struct InstanceGroupOperations {
    inner: VpcOperations,
}

impl InstanceGroupOperations {
    pub fn new(inner: VpcOperations) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl Operations for InstanceGroupOperations {
    async fn fetch(&mut self, ctx: &GroupContext, target: &Target<'_>) -> Outcome {
        self.inner.fetch(ctx, target).await
    }

    async fn destroy(&mut self, ctx: &GroupContext, target: &Target<'_>) -> Outcome {
        let mut errors = Vec::new();

        let group_url = self.inner.object_url(ctx, target, "");
        if let Err(e) = ctx
            .client
            .patch(&group_url, &json!({ "membership_count": 0 }))
            .await
        {
            errors.push(e);
        }

        let managers_url = self.inner.object_url(ctx, target, "/managers");
        match ctx.client.get(&managers_url).await {
            Ok(body) => {
                let manager_ids = body
                    .get("managers")
                    .and_then(|v| v.as_array())
                    .map(|managers| {
                        managers
                            .iter()
                            .filter_map(|m| string_at(m, "id"))
                            .collect::<Vec<_>>()
                    })
                    .unwrap_or_default();
                for manager_id in manager_ids {
                    let url = self
                        .inner
                        .object_url(ctx, target, &format!("/managers/{}", manager_id));
                    if let Err(e) = ctx.client.delete(&url).await {
                        errors.push(e);
                    }
                }
            }
            Err(e) => errors.push(e),
        }

        let mut outcome = self.inner.destroy(ctx, target).await;
        errors.append(&mut outcome.errors);
        outcome.errors = errors;
        outcome
    }

    fn format_instance(&self, target: &Target<'_>, fast: bool) -> String {
        self.inner.format_instance(target, fast)
    }

    fn capabilities(&self) -> Capabilities {
        self.inner.capabilities()
    }
}
