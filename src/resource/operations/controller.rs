//! Resource controller service instances and credentials

use super::{format_line, observe, requested, string_at, Operations};
use crate::cloud::client::CloudClient;
use crate::context::GroupContext;
use crate::resource::wrapper::{Outcome, Target};
use async_trait::async_trait;
use serde_json::Value;

/// Controller state of a soft-deleted object
pub const REMOVED_STATE: &str = "removed";

/// Controller collection an address lives in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Collection {
    Instances,
    Keys,
}

impl Collection {
    fn path(self) -> &'static str {
        match self {
            Collection::Instances => "resource_instances",
            Collection::Keys => "resource_keys",
        }
    }
}

pub fn controller_object_url(client: &CloudClient, collection: Collection, address: &str) -> String {
    client.resource_controller_url(&format!(
        "{}/{}",
        collection.path(),
        urlencoding::encode(address)
    ))
}

/// Exists unless the controller reports the object as removed
pub fn observe_controller_object(body: &Value) -> Outcome {
    if body.get("state").and_then(|v| v.as_str()) == Some(REMOVED_STATE) {
        return Outcome::deleted();
    }
    Outcome::exists(string_at(body, "name"))
}

pub async fn fetch_controller_object(
    ctx: &GroupContext,
    collection: Collection,
    target: &Target<'_>,
) -> Outcome {
    let url = controller_object_url(&ctx.client, collection, target.id.address());
    observe(ctx.client.get(&url).await, observe_controller_object)
}

pub async fn delete_controller_object(
    ctx: &GroupContext,
    collection: Collection,
    target: &Target<'_>,
) -> Outcome {
    let url = controller_object_url(&ctx.client, collection, target.id.address());
    requested(ctx.client.delete(&url).await)
}

/// Any service instance known to the resource controller
#[derive(Debug, Default, Clone, Copy)]
pub struct ServiceInstanceOperations;

#[async_trait]
impl Operations for ServiceInstanceOperations {
    async fn fetch(&mut self, ctx: &GroupContext, target: &Target<'_>) -> Outcome {
        fetch_controller_object(ctx, Collection::Instances, target).await
    }

    async fn destroy(&mut self, ctx: &GroupContext, target: &Target<'_>) -> Outcome {
        delete_controller_object(ctx, Collection::Instances, target).await
    }

    fn format_instance(&self, target: &Target<'_>, _fast: bool) -> String {
        format_line(target, target.name.unwrap_or("-"), "-")
    }
}

/// Service credential (`resource-key` sub-type)
#[derive(Debug, Default, Clone, Copy)]
pub struct CredentialOperations;

#[async_trait]
impl Operations for CredentialOperations {
    async fn fetch(&mut self, ctx: &GroupContext, target: &Target<'_>) -> Outcome {
        fetch_controller_object(ctx, Collection::Keys, target).await
    }

    async fn destroy(&mut self, ctx: &GroupContext, target: &Target<'_>) -> Outcome {
        delete_controller_object(ctx, Collection::Keys, target).await
    }

    fn format_instance(&self, target: &Target<'_>, _fast: bool) -> String {
        format_line(target, target.name.unwrap_or("-"), "-")
    }
}
