//! Service credentials of already discovered instances

use super::{controller_listing_url, wrap_listed, Finder};
use crate::cloud::paging::list_all_pages;
use crate::context::GroupContext;
use crate::error::Result;
use crate::resource::operations::controller::CredentialOperations;
use crate::resource::wrapper::ResourceWrapper;
use async_trait::async_trait;
use std::collections::HashSet;

pub struct CredentialFinder;

#[async_trait]
impl Finder for CredentialFinder {
    fn name(&self) -> &'static str {
        "resource keys"
    }

    async fn find(
        &self,
        ctx: &GroupContext,
        mut wrappers: Vec<ResourceWrapper>,
    ) -> Result<Vec<ResourceWrapper>> {
        let url = controller_listing_url(ctx, "resource_keys");
        let items = list_all_pages(&ctx.client, &url).await?;

        let sources: HashSet<&str> = wrappers.iter().map(|w| w.address()).collect();
        let credentials: Vec<ResourceWrapper> = items
            .iter()
            .filter(|item| {
                item.get("source_crn")
                    .and_then(|v| v.as_str())
                    .is_some_and(|source| sources.contains(source))
            })
            .filter_map(wrap_listed)
            .filter(|w| ctx.scope().region_matches(w.id().region()))
            .map(|mut w| {
                w.bind(Box::new(CredentialOperations));
                w
            })
            .collect();
        tracing::debug!("{} credentials attached to discovered instances", credentials.len());

        wrappers.extend(credentials);
        Ok(wrappers)
    }
}
