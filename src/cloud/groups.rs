//! Resource groups and account identity

use super::client::CloudClient;
use crate::error::{Error, Result};
use reqwest::Method;
use serde_json::Value;

/// Resource group information
#[derive(Debug, Clone, PartialEq)]
pub struct ResourceGroup {
    pub id: String,
    pub name: String,
}

impl From<&Value> for ResourceGroup {
    fn from(value: &Value) -> Self {
        Self {
            id: value
                .get("id")
                .and_then(|v| v.as_str())
                .unwrap_or_default()
                .to_string(),
            name: value
                .get("name")
                .and_then(|v| v.as_str())
                .unwrap_or_default()
                .to_string(),
        }
    }
}

/// List all resource groups of an account
pub async fn list_resource_groups(
    client: &CloudClient,
    account_id: &str,
) -> Result<Vec<ResourceGroup>> {
    let url = format!(
        "{}?account_id={}",
        client.resource_manager_url("resource_groups"),
        urlencoding::encode(account_id)
    );
    let response = client.get(&url).await?;

    Ok(response
        .get("resources")
        .and_then(|v| v.as_array())
        .map(|arr| arr.iter().map(ResourceGroup::from).collect())
        .unwrap_or_default())
}

/// Resolve the account that owns an API key. IAM wants both the key and a
/// bearer token for it.
pub async fn account_id_for_apikey(client: &CloudClient, apikey: &str) -> Result<String> {
    let url = client.iam_url("v1/apikeys/details");
    let response = client
        .request_with_headers(Method::GET, &url, &[("IAM-ApiKey", apikey)])
        .await?;

    response
        .get("account_id")
        .and_then(|v| v.as_str())
        .map(|s| s.to_string())
        .ok_or_else(|| Error::config("api key details did not include an account id"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_resource_group_from_value() {
        let group = ResourceGroup::from(&json!({"id": "abc", "name": "default", "state": "ACTIVE"}));
        assert_eq!(group.id, "abc");
        assert_eq!(group.name, "default");

        let empty = ResourceGroup::from(&json!({}));
        assert_eq!(empty.id, "");
    }
}
