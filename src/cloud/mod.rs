//! IBM Cloud API interaction module
//!
//! # Module Structure
//!
//! - [`auth`] - API key / bearer token credentials with IAM token caching
//! - [`client`] - Main client and per-service endpoint table
//! - [`http`] - HTTP utilities for REST API calls
//! - [`groups`] - Resource groups and account identity
//! - [`paging`] - Cursor pagination for controller collections
//!
//! # Example
//!
//! ```ignore
//! use iww::cloud::{auth::Credentials, client::{CloudClient, Endpoints}};
//!
//! async fn example() -> iww::Result<()> {
//!     let endpoints = Endpoints::default();
//!     let credentials = Credentials::new(Some("apikey"), None, &endpoints.iam)?;
//!     let client = CloudClient::new(credentials, endpoints)?;
//!     let vpcs = client.get(&client.vpc_url("us-south", "vpcs")).await?;
//!     Ok(())
//! }
//! ```

pub mod auth;
pub mod client;
pub mod groups;
pub mod http;
pub mod paging;
