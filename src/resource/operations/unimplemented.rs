//! Resources no operations family handles
//!
//! Listed in their own section and otherwise ignored: a fetch reports them
//! Deleted so the driver drops them, and destroy never reaches the cloud.

use super::Operations;
use crate::context::GroupContext;
use crate::resource::wrapper::{Capabilities, Outcome, Target};
use async_trait::async_trait;

#[derive(Debug, Default, Clone, Copy)]
pub struct UnimplementedOperations;

#[async_trait]
impl Operations for UnimplementedOperations {
    async fn fetch(&mut self, _ctx: &GroupContext, target: &Target<'_>) -> Outcome {
        tracing::info!("unimplemented resource {}, treating as deleted", target.id);
        Outcome::deleted()
    }

    async fn destroy(&mut self, _ctx: &GroupContext, target: &Target<'_>) -> Outcome {
        tracing::error!("destroy called on unimplemented resource {}", target.id);
        Outcome::unchanged()
    }

    fn format_instance(&self, target: &Target<'_>, _fast: bool) -> String {
        let resource_type = target.id.resource_type();
        format!(
            "#-- {} {} {} {}",
            resource_type,
            resource_type,
            target.id.sub_type(),
            target.id.address()
        )
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities {
            implemented: false,
            network_affiliation: false,
        }
    }
}
