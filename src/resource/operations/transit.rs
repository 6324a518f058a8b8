//! Transit gateways
//!
//! Observed through the resource controller, deleted through the transit API.

use super::controller::{fetch_controller_object, Collection};
use super::{format_line, requested, Operations};
use crate::context::GroupContext;
use crate::resource::wrapper::{Outcome, Target};
use async_trait::async_trait;

#[derive(Debug, Default, Clone, Copy)]
pub struct TransitGatewayOperations;

#[async_trait]
impl Operations for TransitGatewayOperations {
    async fn fetch(&mut self, ctx: &GroupContext, target: &Target<'_>) -> Outcome {
        fetch_controller_object(ctx, Collection::Instances, target).await
    }

    async fn destroy(&mut self, ctx: &GroupContext, target: &Target<'_>) -> Outcome {
        let url = ctx
            .client
            .transit_url(&format!("transit_gateways/{}", target.id.sub_id()));
        requested(ctx.client.delete(&url).await)
    }

    fn format_instance(&self, target: &Target<'_>, _fast: bool) -> String {
        format_line(target, target.name.unwrap_or("-"), "-")
    }
}
