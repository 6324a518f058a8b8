//! Group Context
//!
//! Process-scoped configuration built once per invocation and passed by
//! reference to every component: the client, account identity, active
//! filters and the lazily filled resource group lookup table.

use crate::cloud::client::CloudClient;
use crate::cloud::groups::{account_id_for_apikey, list_resource_groups};
use crate::error::{Error, Result};
use std::collections::HashMap;
use std::time::Duration;
use tokio::sync::OnceCell;

/// Active filters of one invocation
#[derive(Debug, Clone, Default)]
pub struct Scope {
    pub region: Option<String>,
    pub group_name: Option<String>,
    pub group_id: Option<String>,
    /// Sub-network filter: only infrastructure resources of this VPC
    pub vpc_id: Option<String>,
}

impl Scope {
    /// Only infrastructure-service resources are considered when a VPC filter is active
    pub fn infrastructure_only(&self) -> bool {
        self.vpc_id.is_some()
    }

    pub fn region_matches(&self, region: &str) -> bool {
        match &self.region {
            Some(filter) => filter == region,
            None => true,
        }
    }
}

/// Pacing and budget knobs
#[derive(Debug, Clone)]
pub struct Settings {
    /// Concurrency ceiling of the bulk fetch
    pub fetch_concurrency: usize,
    /// Minimum delay between two fetch dispatches
    pub fetch_pacing: Duration,
    /// Pause between lifecycle sweeps
    pub sweep_pause: Duration,
    /// Sweeps without progress before giving up
    pub sweep_budget: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            fetch_concurrency: 8,
            fetch_pacing: Duration::from_millis(10),
            sweep_pause: Duration::from_secs(2),
            sweep_budget: 100,
        }
    }
}

#[derive(Debug, Default)]
struct GroupTable {
    name_to_id: HashMap<String, String>,
    id_to_name: HashMap<String, String>,
}

pub struct GroupContext {
    pub client: CloudClient,
    account_id: Option<String>,
    scope: Scope,
    pub settings: Settings,
    groups: OnceCell<GroupTable>,
}

impl GroupContext {
    /// Build a context without any remote call
    pub fn new(
        client: CloudClient,
        account_id: Option<String>,
        scope: Scope,
        settings: Settings,
    ) -> Self {
        Self {
            client,
            account_id: account_id.filter(|a| !a.is_empty()),
            scope,
            settings,
            groups: OnceCell::new(),
        }
    }

    /// Build a context, resolving the account from the API key and the
    /// group id from the group name when they were not supplied.
    pub async fn connect(
        client: CloudClient,
        account_id: Option<String>,
        scope: Scope,
        settings: Settings,
    ) -> Result<Self> {
        let mut context = Self::new(client, account_id, scope, settings);

        if context.account_id.is_none() {
            if let Some(apikey) = context.client.credentials.apikey() {
                let account = account_id_for_apikey(&context.client, apikey).await?;
                tracing::info!("Resolved account id {}", account);
                context.account_id = Some(account);
            }
        }

        if context.scope.group_id.is_none() {
            if let Some(name) = context.scope.group_name.clone() {
                let id = context.resolve_group_id(&name).await?;
                context.scope.group_id = Some(id);
            }
        }

        Ok(context)
    }

    pub fn scope(&self) -> &Scope {
        &self.scope
    }

    pub fn account_id(&self) -> Option<&str> {
        self.account_id.as_deref()
    }

    /// Fill the group table at most once; concurrent callers wait on the same fill.
    async fn group_table(&self) -> Result<&GroupTable> {
        self.groups
            .get_or_try_init(|| async {
                let account = self.account_id.as_deref().ok_or_else(|| {
                    Error::config(
                        "resource group name provided but without an account ID there is no way to get the group ID",
                    )
                })?;
                let groups = list_resource_groups(&self.client, account).await?;
                let mut table = GroupTable::default();
                for group in groups {
                    table.id_to_name.insert(group.id.clone(), group.name.clone());
                    table.name_to_id.insert(group.name, group.id);
                }
                Ok::<_, Error>(table)
            })
            .await
    }

    pub async fn resolve_group_id(&self, name: &str) -> Result<String> {
        let table = self.group_table().await?;
        table
            .name_to_id
            .get(name)
            .cloned()
            .ok_or_else(|| Error::config(format!("resource group not found, name: {}", name)))
    }

    /// Display name of a group. In fast mode the table is never filled just for display.
    pub async fn group_name(&self, id: &str, fast: bool) -> String {
        if self.scope.group_id.as_deref() == Some(id) {
            if let Some(name) = &self.scope.group_name {
                return name.clone();
            }
        }
        if self.groups.get().is_none() && (fast || self.account_id.is_none()) {
            return String::new();
        }
        match self.group_table().await {
            Ok(table) => table.id_to_name.get(id).cloned().unwrap_or_default(),
            Err(e) => {
                tracing::warn!("Failed to read resource groups: {}", e);
                String::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scope_region_matches() {
        let scope = Scope {
            region: Some("us-south".into()),
            ..Default::default()
        };
        assert!(scope.region_matches("us-south"));
        assert!(!scope.region_matches("eu-de"));
        assert!(Scope::default().region_matches("anything"));
    }

    #[test]
    fn test_vpc_filter_is_infrastructure_only() {
        let scope = Scope {
            vpc_id: Some("r006-1".into()),
            ..Default::default()
        };
        assert!(scope.infrastructure_only());
        assert!(!Scope::default().infrastructure_only());
    }
}
