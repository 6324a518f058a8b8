//! Discovery Finders
//!
//! An ordered chain of finders, each receiving the accumulated wrappers and
//! returning them extended and/or rebound. Later finders depend on earlier
//! ones: the controller listing must come first, credentials only attach to
//! instances already found, DNS and key management expand instances.

mod controller;
mod credentials;
mod dns;
mod kms;
mod transit;
mod vpc;
mod workspace;

pub use controller::ControllerFinder;
pub use credentials::CredentialFinder;
pub use dns::DnsFinder;
pub use kms::KeyManagementFinder;
pub use transit::TransitGatewayFinder;
pub use vpc::VpcFinder;
pub use workspace::WorkspaceFinder;

use super::identifier::ResourceIdentifier;
use super::wrapper::ResourceWrapper;
use crate::context::GroupContext;
use crate::error::Result;
use async_trait::async_trait;
use serde_json::Value;

#[async_trait]
pub trait Finder: Send + Sync {
    fn name(&self) -> &'static str;

    async fn find(
        &self,
        ctx: &GroupContext,
        wrappers: Vec<ResourceWrapper>,
    ) -> Result<Vec<ResourceWrapper>>;
}

/// The finder chain in dependency order
pub fn default_finders() -> Vec<Box<dyn Finder>> {
    vec![
        Box::new(ControllerFinder),
        Box::new(WorkspaceFinder),
        Box::new(TransitGatewayFinder),
        Box::new(VpcFinder),
        Box::new(CredentialFinder),
        Box::new(DnsFinder),
        Box::new(KeyManagementFinder),
    ]
}

/// Wrap one controller listing entry (`crn`, `name`, `resource_group_id`),
/// bound to the registry's operations for its address.
fn wrap_listed(item: &Value) -> Option<ResourceWrapper> {
    let address = item.get("crn").and_then(|v| v.as_str())?;
    let id = match ResourceIdentifier::parse(address) {
        Ok(id) => id,
        Err(e) => {
            tracing::warn!("Skipping listed resource: {}", e);
            return None;
        }
    };
    let group_id = item
        .get("resource_group_id")
        .and_then(|v| v.as_str())
        .unwrap_or_default()
        .to_string();
    let name = item.get("name").and_then(|v| v.as_str()).map(str::to_string);
    let operations = super::registry::lookup(&id);
    Some(ResourceWrapper::new(id, group_id, name, operations))
}

/// Controller collection URL narrowed to the group filter
fn controller_listing_url(ctx: &GroupContext, collection: &str) -> String {
    let url = ctx.client.resource_controller_url(collection);
    match &ctx.scope().group_id {
        Some(group_id) => crate::cloud::paging::with_query(&url, "resource_group_id", group_id),
        None => url,
    }
}
