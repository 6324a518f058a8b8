//! Resource Identifier
//!
//! Parsed form of a composite resource address (CRN):
//!
//! ```text
//!  0   1  2       3      4  5        6          7    8   9
//! "crn:v1:bluemix:public:is:us-south:a/<acct>:<id>:vpc:r006-ea19..."
//! ```
//!
//! The original address string is kept verbatim and is the identity used
//! for equality and de-duplication.

use crate::error::{Error, Result};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

/// Segments required by the short form (position 7 is the only id)
const MIN_SEGMENTS: usize = 8;

/// Marks sub-resources fabricated by discovery, e.g. `iww-zone`
pub const SUB_RESOURCE_MARKER: &str = "iww-";

/// Account segment of fabricated addresses
const SYNTHETIC_ACCOUNT: &str = "a/ACCOUNT";

#[derive(Debug, Clone)]
pub struct ResourceIdentifier {
    address: String,
    resource_type: String,
    primary_id: String,
    sub_type: String,
    sub_id: String,
    region: String,
    zone: String,
}

impl ResourceIdentifier {
    pub fn parse(address: &str) -> Result<Self> {
        let parts: Vec<&str> = address.splitn(10, ':').collect();
        if parts.len() < MIN_SEGMENTS {
            return Err(Error::MalformedAddress(address.to_string()));
        }
        let (region, zone) = split_zone(parts[5]);

        Ok(Self {
            address: address.to_string(),
            resource_type: parts[4].to_string(),
            primary_id: parts[7].to_string(),
            sub_type: parts.get(8).copied().unwrap_or_default().to_string(),
            sub_id: parts.get(9).copied().unwrap_or_default().to_string(),
            region,
            zone,
        })
    }

    /// Fabricate an address for resources without a native one
    pub fn synthetic(
        resource_type: &str,
        id: &str,
        sub_type: &str,
        sub_id: &str,
        region: &str,
    ) -> Self {
        let address = format!(
            "crn:v1:bluemix:public:{}:{}:{}:{}:{}:{}",
            resource_type, region, SYNTHETIC_ACCOUNT, id, sub_type, sub_id
        );
        Self {
            address,
            resource_type: resource_type.to_string(),
            primary_id: id.to_string(),
            sub_type: sub_type.to_string(),
            sub_id: sub_id.to_string(),
            region: region.to_string(),
            zone: String::new(),
        }
    }

    /// Address of a child object discovered under this resource: the parent's
    /// first eight segments, a `iww-<sub_type>` marker and the child's id.
    pub fn sub_resource(&self, sub_type: &str, child_id: &str) -> Self {
        let prefix: Vec<&str> = self.address.splitn(10, ':').take(MIN_SEGMENTS).collect();
        let address = format!(
            "{}:{}{}:{}",
            prefix.join(":"),
            SUB_RESOURCE_MARKER,
            sub_type,
            child_id
        );
        Self {
            address,
            resource_type: self.resource_type.clone(),
            primary_id: self.primary_id.clone(),
            sub_type: format!("{}{}", SUB_RESOURCE_MARKER, sub_type),
            sub_id: child_id.to_string(),
            region: self.region.clone(),
            zone: self.zone.clone(),
        }
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    pub fn resource_type(&self) -> &str {
        &self.resource_type
    }

    pub fn primary_id(&self) -> &str {
        &self.primary_id
    }

    pub fn sub_type(&self) -> &str {
        &self.sub_type
    }

    pub fn sub_id(&self) -> &str {
        &self.sub_id
    }

    pub fn region(&self) -> &str {
        &self.region
    }

    pub fn zone(&self) -> &str {
        &self.zone
    }
}

/// Strip a trailing `-<digit>` zone marker: `us-south-1` -> (`us-south`, `1`)
fn split_zone(region: &str) -> (String, String) {
    let bytes = region.as_bytes();
    if bytes.len() >= 2 && bytes[bytes.len() - 2] == b'-' && bytes[bytes.len() - 1].is_ascii_digit()
    {
        let split = region.len() - 2;
        return (region[..split].to_string(), region[split + 1..].to_string());
    }
    (region.to_string(), String::new())
}

impl PartialEq for ResourceIdentifier {
    fn eq(&self, other: &Self) -> bool {
        self.address == other.address
    }
}

impl Eq for ResourceIdentifier {}

impl Hash for ResourceIdentifier {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.address.hash(state);
    }
}

impl FromStr for ResourceIdentifier {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for ResourceIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.address)
    }
}
