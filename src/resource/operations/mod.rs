//! Per-resource-family operations
//!
//! Every discovered resource is bound to one [`Operations`] value that knows
//! how to fetch, destroy and format it. Families:
//!
//! - [`controller`] - service instances and credentials of the resource controller
//! - [`vpc`] - infrastructure objects, including the no-delete and
//!   instance-group decorators
//! - [`dns`] - zones, pools, monitors, custom resolvers and zone children
//! - [`kms`] - key management instances and their keys
//! - [`transit`] - transit gateways
//! - [`workspace`] - schematics workspaces
//! - [`unimplemented`] - resources nothing knows how to handle

pub mod controller;
pub mod dns;
pub mod kms;
pub mod transit;
pub mod unimplemented;
pub mod vpc;
pub mod workspace;

use super::wrapper::{Capabilities, LifecycleState, Outcome, Target};
use crate::context::GroupContext;
use crate::error::Result;
use async_trait::async_trait;
use serde_json::Value;

#[async_trait]
pub trait Operations: Send + Sync {
    /// Observe the remote object. 404/410 and soft-deleted objects map to Deleted.
    async fn fetch(&mut self, ctx: &GroupContext, target: &Target<'_>) -> Outcome;

    /// Issue the deletion request(s)
    async fn destroy(&mut self, ctx: &GroupContext, target: &Target<'_>) -> Outcome;

    /// One listing line: `<type> <sub-type> <name> <description> <address>`
    fn format_instance(&self, target: &Target<'_>, fast: bool) -> String;

    fn capabilities(&self) -> Capabilities {
        Capabilities::default()
    }
}

/// Shared line layout of every listing entry
pub fn format_line(target: &Target<'_>, name: &str, description: &str) -> String {
    format!(
        "{} {} {} {} {}",
        target.id.resource_type(),
        target.id.sub_type(),
        name,
        description,
        target.id.address()
    )
}

/// Map a GET result onto a transition: 404/410 is Deleted, any other error
/// leaves the state unchanged.
pub fn observe(result: Result<Value>, observed: impl FnOnce(&Value) -> Outcome) -> Outcome {
    match result {
        Ok(body) => observed(&body),
        Err(e) if e.is_gone() => Outcome::deleted(),
        Err(e) => Outcome::failed(e),
    }
}

/// Turn a DELETE result into an outcome. The state is left for the next fetch.
pub fn requested(result: Result<Value>) -> Outcome {
    match result {
        Ok(_) => Outcome::unchanged(),
        Err(e) if e.is_gone() => Outcome::deleted(),
        Err(e) => Outcome::failed(e),
    }
}

pub fn string_at(body: &Value, key: &str) -> Option<String> {
    body.get(key).and_then(|v| v.as_str()).map(str::to_string)
}

/// True once the wrapper has seen the object alive
pub fn previously_existed(state: LifecycleState) -> bool {
    matches!(state, LifecycleState::Exists | LifecycleState::Destroying)
}
