//! Key management instances and their keys
//!
//! An instance can only be deleted once it holds no keys, so destroying it
//! force-deletes every key first. Key calls are scoped to the instance with
//! the `bluemix-instance` header.

use super::controller::ServiceInstanceOperations;
use super::{format_line, observe, requested, string_at, Operations};
use crate::context::GroupContext;
use crate::error::Result;
use crate::resource::identifier::ResourceIdentifier;
use crate::resource::wrapper::{Outcome, Target};
use async_trait::async_trait;
use reqwest::Method;
use serde_json::Value;

/// Keys requested per page
pub const KEY_PAGE_SIZE: usize = 3;

/// Upper bound on key pages read from one instance
pub const MAX_KEY_PAGES: usize = 100;

/// Key state reported once a key is destroyed
const DESTROYED_KEY_STATE: i64 = 5;

pub const KEY_SUBTYPE: &str = "iww-key";

const INSTANCE_HEADER: &str = "bluemix-instance";

/// All keys of the instance the identifier belongs to
pub async fn list_keys(ctx: &GroupContext, id: &ResourceIdentifier) -> Result<Vec<Value>> {
    let headers = [(INSTANCE_HEADER, id.primary_id())];
    let mut keys = Vec::new();

    for page in 0..MAX_KEY_PAGES {
        let url = ctx.client.kms_url(
            id.region(),
            &format!(
                "keys?limit={}&offset={}",
                KEY_PAGE_SIZE,
                page * KEY_PAGE_SIZE
            ),
        );
        let response = ctx
            .client
            .request_with_headers(Method::GET, &url, &headers)
            .await?;
        let page_keys = response
            .get("resources")
            .and_then(|v| v.as_array())
            .cloned()
            .unwrap_or_default();
        let count = page_keys.len();
        keys.extend(page_keys);
        if count < KEY_PAGE_SIZE {
            break;
        }
    }

    Ok(keys)
}

async fn force_delete_key(ctx: &GroupContext, id: &ResourceIdentifier, key_id: &str) -> Result<Value> {
    let url = ctx
        .client
        .kms_url(id.region(), &format!("keys/{}?force=true", key_id));
    let headers = [
        (INSTANCE_HEADER, id.primary_id()),
        ("prefer", "return=representation"),
    ];
    ctx.client
        .request_with_headers(Method::DELETE, &url, &headers)
        .await
}

/// Key management service instance: drains its keys before deletion
#[derive(Debug, Default, Clone, Copy)]
pub struct KeyManagementOperations {
    inner: ServiceInstanceOperations,
}

#[async_trait]
impl Operations for KeyManagementOperations {
    async fn fetch(&mut self, ctx: &GroupContext, target: &Target<'_>) -> Outcome {
        self.inner.fetch(ctx, target).await
    }

    async fn destroy(&mut self, ctx: &GroupContext, target: &Target<'_>) -> Outcome {
        let mut errors = Vec::new();
        match list_keys(ctx, target.id).await {
            Ok(keys) => {
                for key_id in keys.iter().filter_map(|k| string_at(k, "id")) {
                    tracing::debug!("force deleting key {} of {}", key_id, target.id);
                    if let Err(e) = force_delete_key(ctx, target.id, &key_id).await {
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
}

/// One key inside a key management instance
#[derive(Debug, Default, Clone, Copy)]
pub struct KeyOperations;

fn observe_key(body: &Value) -> Outcome {
    let key = body
        .get("resources")
        .and_then(|v| v.as_array())
        .and_then(|keys| keys.first())
        .unwrap_or(body);
    if key.get("state").and_then(|v| v.as_i64()) == Some(DESTROYED_KEY_STATE) {
        return Outcome::deleted();
    }
    Outcome::exists(string_at(key, "name"))
}

#[async_trait]
impl Operations for KeyOperations {
    async fn fetch(&mut self, ctx: &GroupContext, target: &Target<'_>) -> Outcome {
        let url = ctx
            .client
            .kms_url(target.id.region(), &format!("keys/{}", target.id.sub_id()));
        let headers = [(INSTANCE_HEADER, target.id.primary_id())];
        observe(
            ctx.client
                .request_with_headers(Method::GET, &url, &headers)
                .await,
            observe_key,
        )
    }

    async fn destroy(&mut self, ctx: &GroupContext, target: &Target<'_>) -> Outcome {
        requested(force_delete_key(ctx, target.id, target.id.sub_id()).await)
    }

    fn format_instance(&self, target: &Target<'_>, _fast: bool) -> String {
        format_line(target, target.name.unwrap_or("-"), "kp key")
    }
}
