//! IBM Cloud Client
//!
//! Main client for interacting with IBM Cloud APIs, combining authentication,
//! HTTP functionality and the per-service endpoint table.

use super::auth::Credentials;
use super::http::HttpClient;
use crate::error::Result;
use reqwest::Method;
use serde_json::Value;

/// VPC API version date sent with every infrastructure call
const VPC_API_VERSION: &str = "2022-09-13";

/// Transit gateway API version date
const TRANSIT_API_VERSION: &str = "2021-12-30";

/// Regions queried directly by the VPC finder
pub const VPC_REGIONS: &[&str] = &[
    "au-syd", "br-sao", "ca-tor", "eu-de", "eu-gb", "jp-osa", "jp-tok", "us-east", "us-south",
];

/// Base URLs for every remote service. Templates containing `<region>` are
/// expanded per call.
#[derive(Debug, Clone)]
pub struct Endpoints {
    pub iam: String,
    pub resource_controller: String,
    pub resource_manager: String,
    pub vpc: String,
    pub dns: String,
    pub transit: String,
    pub schematics: String,
    pub kms: String,
    pub vpc_regions: Vec<String>,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            iam: "https://iam.cloud.ibm.com".to_string(),
            resource_controller: "https://resource-controller.cloud.ibm.com".to_string(),
            resource_manager: "https://resource-controller.cloud.ibm.com".to_string(),
            vpc: "https://<region>.iaas.cloud.ibm.com/v1".to_string(),
            dns: "https://api.dns-svcs.cloud.ibm.com/v1".to_string(),
            transit: "https://transit.cloud.ibm.com/v1".to_string(),
            schematics: "https://<region>.schematics.cloud.ibm.com/v1".to_string(),
            kms: "https://<region>.kms.cloud.ibm.com/api/v2".to_string(),
            vpc_regions: VPC_REGIONS.iter().map(|r| r.to_string()).collect(),
        }
    }
}

impl Endpoints {
    /// Point every service at one base URL (mock servers, proxies)
    pub fn uniform(base: &str) -> Self {
        let base = base.trim_end_matches('/').to_string();
        Self {
            iam: base.clone(),
            resource_controller: base.clone(),
            resource_manager: base.clone(),
            vpc: base.clone(),
            dns: base.clone(),
            transit: base.clone(),
            schematics: base.clone(),
            kms: base,
            vpc_regions: vec!["us-south".to_string()],
        }
    }
}

/// Replace the `<region>` placeholder of a documented endpoint
pub fn api_endpoint(documented: &str, region: &str) -> String {
    documented.replacen("<region>", region, 1)
}

/// Main IBM Cloud client
#[derive(Clone)]
pub struct CloudClient {
    pub credentials: Credentials,
    pub http: HttpClient,
    pub endpoints: Endpoints,
}

impl CloudClient {
    pub fn new(credentials: Credentials, endpoints: Endpoints) -> Result<Self> {
        Ok(Self {
            credentials,
            http: HttpClient::new()?,
            endpoints,
        })
    }

    pub async fn get_token(&self) -> Result<String> {
        self.credentials.get_token(&self.http).await
    }

    pub async fn get(&self, url: &str) -> Result<Value> {
        let token = self.get_token().await?;
        self.http.get(url, &token).await
    }

    pub async fn post(&self, url: &str, body: Option<&Value>) -> Result<Value> {
        let token = self.get_token().await?;
        self.http.post(url, &token, body).await
    }

    pub async fn patch(&self, url: &str, body: &Value) -> Result<Value> {
        let token = self.get_token().await?;
        self.http.patch(url, &token, body).await
    }

    pub async fn delete(&self, url: &str) -> Result<Value> {
        let token = self.get_token().await?;
        self.http.delete(url, &token).await
    }

    /// Request with service specific headers (key management instance id)
    pub async fn request_with_headers(
        &self,
        method: Method,
        url: &str,
        headers: &[(&str, &str)],
    ) -> Result<Value> {
        let token = self.get_token().await?;
        self.http.request(method, url, &token, headers, None).await
    }

    // =========================================================================
    // IAM / Resource Manager / Resource Controller
    // =========================================================================

    pub fn iam_url(&self, path: &str) -> String {
        format!("{}/{}", self.endpoints.iam, path)
    }

    pub fn resource_manager_url(&self, path: &str) -> String {
        format!("{}/v2/{}", self.endpoints.resource_manager, path)
    }

    pub fn resource_controller_url(&self, path: &str) -> String {
        format!("{}/v2/{}", self.endpoints.resource_controller, path)
    }

    // =========================================================================
    // VPC infrastructure
    // =========================================================================

    pub fn vpc_url(&self, region: &str, path: &str) -> String {
        format!(
            "{}/{}?version={}&generation=2",
            api_endpoint(&self.endpoints.vpc, region),
            path,
            VPC_API_VERSION
        )
    }

    // =========================================================================
    // Networking and platform services
    // =========================================================================

    /// DNS services URL scoped to a service instance
    pub fn dns_url(&self, instance_id: &str, path: &str) -> String {
        format!("{}/instances/{}/{}", self.endpoints.dns, instance_id, path)
    }

    pub fn transit_url(&self, path: &str) -> String {
        format!(
            "{}/{}?version={}",
            self.endpoints.transit, path, TRANSIT_API_VERSION
        )
    }

    pub fn schematics_url(&self, region: &str, path: &str) -> String {
        format!("{}/{}", api_endpoint(&self.endpoints.schematics, region), path)
    }

    pub fn kms_url(&self, region: &str, path: &str) -> String {
        format!("{}/{}", api_endpoint(&self.endpoints.kms, region), path)
    }
}
