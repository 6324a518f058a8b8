//! Key management
//!
//! Binds the key-draining operations to every key management instance and
//! adds each of its keys as a sub-resource.

use super::Finder;
use crate::context::GroupContext;
use crate::error::Result;
use crate::resource::operations::kms::{list_keys, KeyManagementOperations, KeyOperations};
use crate::resource::wrapper::ResourceWrapper;
use async_trait::async_trait;

pub struct KeyManagementFinder;

#[async_trait]
impl Finder for KeyManagementFinder {
    fn name(&self) -> &'static str {
        "key protect"
    }

    async fn find(
        &self,
        ctx: &GroupContext,
        mut wrappers: Vec<ResourceWrapper>,
    ) -> Result<Vec<ResourceWrapper>> {
        let mut keys = Vec::new();
        for instance in wrappers
            .iter_mut()
            .filter(|w| w.id().resource_type() == "kms" && w.id().sub_type().is_empty())
        {
            instance.bind(Box::new(KeyManagementOperations::default()));
            for key in list_keys(ctx, instance.id()).await? {
                let Some(key_id) = key.get("id").and_then(|v| v.as_str()) else {
                    continue;
                };
                let name = key.get("name").and_then(|v| v.as_str()).map(str::to_string);
                keys.push(ResourceWrapper::sub_resource(
                    instance,
                    "key",
                    key_id,
                    name,
                    Box::new(KeyOperations),
                ));
            }
        }
        wrappers.extend(keys);
        Ok(wrappers)
    }
}
