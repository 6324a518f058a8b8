//! Service instances tracked by the resource controller

use super::{controller_listing_url, wrap_listed, Finder};
use crate::cloud::paging::list_all_pages;
use crate::context::GroupContext;
use crate::error::Result;
use crate::resource::wrapper::ResourceWrapper;
use async_trait::async_trait;

pub struct ControllerFinder;

#[async_trait]
impl Finder for ControllerFinder {
    fn name(&self) -> &'static str {
        "resource controller"
    }

    async fn find(
        &self,
        ctx: &GroupContext,
        mut wrappers: Vec<ResourceWrapper>,
    ) -> Result<Vec<ResourceWrapper>> {
        let url = controller_listing_url(ctx, "resource_instances");
        let items = list_all_pages(&ctx.client, &url).await?;
        tracing::debug!("resource controller listed {} instances", items.len());

        wrappers.extend(
            items
                .iter()
                .filter_map(wrap_listed)
                .filter(|w| ctx.scope().region_matches(w.id().region())),
        );
        Ok(wrappers)
    }
}
