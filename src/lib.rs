//! iww: discover, list and delete IBM Cloud resources scoped by resource
//! group, region or VPC.

pub mod cloud;
pub mod commands;
pub mod config;
pub mod context;
pub mod error;
pub mod resource;

pub use error::{Error, Result};
