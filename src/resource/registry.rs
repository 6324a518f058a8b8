//! Operation Registry
//!
//! Maps an address's resource type and sub-type to the operations family
//! that handles it.

use super::identifier::ResourceIdentifier;
use super::operations::controller::{CredentialOperations, ServiceInstanceOperations};
use super::operations::dns::{DnsKind, DnsOperations};
use super::operations::kms::{KeyManagementOperations, KeyOperations, KEY_SUBTYPE};
use super::operations::transit::TransitGatewayOperations;
use super::operations::vpc;
use super::operations::workspace::{WorkspaceOperations, WORKSPACE_SUBTYPE};
use super::operations::Operations;

/// Sub-type of controller credentials, whatever the service
pub const CREDENTIAL_SUBTYPE: &str = "resource-key";

/// Operations for an address. Unknown service types get the plain
/// controller operations; only unknown infrastructure sub-types are
/// unimplemented.
pub fn lookup(id: &ResourceIdentifier) -> Box<dyn Operations> {
    if id.sub_type() == CREDENTIAL_SUBTYPE {
        return Box::new(CredentialOperations);
    }

    match id.resource_type() {
        "is" => vpc::operations_for(id.sub_type()),
        "kms" if id.sub_type() == KEY_SUBTYPE => Box::new(KeyOperations),
        "kms" => Box::new(KeyManagementOperations::default()),
        "transit" => Box::new(TransitGatewayOperations),
        "schematics" if id.sub_type() == WORKSPACE_SUBTYPE => Box::new(WorkspaceOperations),
        "dns-svcs" => match DnsKind::from_sub_type(id.sub_type()) {
            Some(kind) => Box::new(DnsOperations::new(kind)),
            None => Box::new(ServiceInstanceOperations),
        },
        _ => Box::new(ServiceInstanceOperations),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resource::wrapper::{LifecycleState, Target};

    fn line(address: &str) -> String {
        let id = ResourceIdentifier::parse(address).unwrap();
        let target = Target {
            id: &id,
            name: Some("n"),
            state: LifecycleState::Exists,
        };
        lookup(&id).format_instance(&target, false)
    }

    #[test]
    fn test_credential_wins_over_service_type() {
        let addr = "crn:v1:bluemix:public:is:us-south:a/1:guid:resource-key:k1";
        assert_eq!(line(addr), format!("is resource-key n - {}", addr));
    }

    #[test]
    fn test_vpc_subtypes() {
        let addr = "crn:v1:bluemix:public:is:us-south:a/1::subnet:0717-s";
        assert_eq!(line(addr), format!("is subnet n vpc {}", addr));
    }

    #[test]
    fn test_unknown_vpc_subtype_is_unimplemented() {
        let addr = "crn:v1:bluemix:public:is:us-south:a/1::dedicated-host:0717-d";
        assert_eq!(line(addr), format!("#-- is is dedicated-host {}", addr));
    }

    #[test]
    fn test_unknown_service_is_typical() {
        let addr = "crn:v1:bluemix:public:logdna:us-south:a/1:guid::";
        let id = ResourceIdentifier::parse(addr).unwrap();
        assert!(lookup(&id).capabilities().implemented);
        assert_eq!(line(addr), format!("logdna  n - {}", addr));
    }

    #[test]
    fn test_service_families() {
        let ws = "crn:v1:bluemix:public:schematics:us-south:a/1:guid:workspace:us-south.ws-1";
        assert_eq!(line(ws), format!("schematics workspace n schematics workspace {}", ws));
        let key = "crn:v1:bluemix:public:kms:us-south:a/1:guid:iww-key:k1";
        assert_eq!(line(key), format!("kms iww-key n kp key {}", key));
        let zone = "crn:v1:bluemix:public:dns-svcs:global:a/1:guid:iww-zone:z1";
        assert_eq!(line(zone), format!("dns-svcs iww-zone n dns {}", zone));
    }
}
