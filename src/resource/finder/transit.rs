use super::Finder;
use crate::context::GroupContext;
use crate::error::Result;
use crate::resource::operations::transit::TransitGatewayOperations;
use crate::resource::wrapper::ResourceWrapper;
use async_trait::async_trait;

/// Binds transit gateway operations; finds nothing new
pub struct TransitGatewayFinder;

#[async_trait]
impl Finder for TransitGatewayFinder {
    fn name(&self) -> &'static str {
        "transit gateway"
    }

    async fn find(
        &self,
        _ctx: &GroupContext,
        mut wrappers: Vec<ResourceWrapper>,
    ) -> Result<Vec<ResourceWrapper>> {
        for wrapper in wrappers
            .iter_mut()
            .filter(|w| w.id().resource_type() == "transit")
        {
            wrapper.bind(Box::new(TransitGatewayOperations));
        }
        Ok(wrappers)
    }
}
