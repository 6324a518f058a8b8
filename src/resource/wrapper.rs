//! Resource Wrapper
//!
//! Couples an identifier with its lifecycle state and the operations bound
//! to it. Fetch and Destroy never fail: whatever the bound operations
//! observed comes back as an [`Outcome`] and errors are logged here.

use super::identifier::ResourceIdentifier;
use super::operations::Operations;
use crate::context::GroupContext;
use crate::error::Error;

/// Lifecycle of one resource
///
/// ```text
/// Start      -fetch->   Exists | Deleted
/// Exists     -fetch->   Exists | Deleted
/// Exists     -destroy-> Destroying
/// Destroying -fetch->   Exists | Destroying | Deleted
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleState {
    Start,
    Exists,
    Destroying,
    Deleted,
}

/// What the bound operations can do beyond Fetch/Destroy/Format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capabilities {
    /// False for resources nothing knows how to handle
    pub implemented: bool,
    /// Fetch reports the VPC the resource belongs to
    pub network_affiliation: bool,
}

impl Default for Capabilities {
    fn default() -> Self {
        Self {
            implemented: true,
            network_affiliation: false,
        }
    }
}

/// Read-only view handed to the operations
#[derive(Debug, Clone, Copy)]
pub struct Target<'a> {
    pub id: &'a ResourceIdentifier,
    pub name: Option<&'a str>,
    pub state: LifecycleState,
}

impl<'a> Target<'a> {
    pub fn new(id: &'a ResourceIdentifier, name: Option<&'a str>, state: LifecycleState) -> Self {
        Self { id, name, state }
    }
}

/// Result of one Fetch or Destroy
#[derive(Debug, Default)]
pub struct Outcome {
    /// New state, `None` leaves the state unchanged
    pub state: Option<LifecycleState>,
    pub name: Option<String>,
    pub vpc_id: Option<String>,
    pub errors: Vec<Error>,
}

impl Outcome {
    pub fn unchanged() -> Self {
        Self::default()
    }

    pub fn exists(name: Option<String>) -> Self {
        Self {
            state: Some(LifecycleState::Exists),
            name,
            ..Default::default()
        }
    }

    pub fn deleted() -> Self {
        Self {
            state: Some(LifecycleState::Deleted),
            ..Default::default()
        }
    }

    pub fn failed(error: Error) -> Self {
        Self {
            errors: vec![error],
            ..Default::default()
        }
    }

    pub fn with_vpc_id(mut self, vpc_id: Option<String>) -> Self {
        self.vpc_id = vpc_id;
        self
    }

    /// Record an error without changing the transition
    pub fn and_error(mut self, error: Error) -> Self {
        self.errors.push(error);
        self
    }
}

pub struct ResourceWrapper {
    id: ResourceIdentifier,
    group_id: String,
    name: Option<String>,
    state: LifecycleState,
    vpc_id: Option<String>,
    capabilities: Capabilities,
    operations: Box<dyn Operations>,
}

impl ResourceWrapper {
    pub fn new(
        id: ResourceIdentifier,
        group_id: impl Into<String>,
        name: Option<String>,
        operations: Box<dyn Operations>,
    ) -> Self {
        let capabilities = operations.capabilities();
        Self {
            id,
            group_id: group_id.into(),
            name,
            state: LifecycleState::Start,
            vpc_id: None,
            capabilities,
            operations,
        }
    }

    /// A child object discovered under `parent`; inherits its group.
    pub fn sub_resource(
        parent: &ResourceWrapper,
        sub_type: &str,
        child_id: &str,
        name: Option<String>,
        operations: Box<dyn Operations>,
    ) -> Self {
        Self::new(
            parent.id.sub_resource(sub_type, child_id),
            parent.group_id.clone(),
            name,
            operations,
        )
    }

    /// Replace the bound operations
    pub fn bind(&mut self, operations: Box<dyn Operations>) {
        self.capabilities = operations.capabilities();
        self.operations = operations;
    }

    pub fn id(&self) -> &ResourceIdentifier {
        &self.id
    }

    pub fn address(&self) -> &str {
        self.id.address()
    }

    pub fn group_id(&self) -> &str {
        &self.group_id
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn state(&self) -> LifecycleState {
        self.state
    }

    pub fn vpc_id(&self) -> Option<&str> {
        self.vpc_id.as_deref()
    }

    pub fn capabilities(&self) -> Capabilities {
        self.capabilities
    }

    /// Refresh the state from the cloud. Errors leave the state unchanged.
    pub async fn fetch(&mut self, ctx: &GroupContext) {
        if self.state == LifecycleState::Deleted {
            return;
        }
        let target = Target::new(&self.id, self.name.as_deref(), self.state);
        let outcome = self.operations.fetch(ctx, &target).await;
        self.apply(outcome, "fetch");
    }

    /// Request deletion. The request is assumed accepted; the next fetch tells.
    pub async fn destroy(&mut self, ctx: &GroupContext) {
        if self.state == LifecycleState::Deleted {
            return;
        }
        let target = Target::new(&self.id, self.name.as_deref(), self.state);
        let outcome = self.operations.destroy(ctx, &target).await;
        if self.state == LifecycleState::Exists && outcome.state.is_none() {
            self.state = LifecycleState::Destroying;
        }
        self.apply(outcome, "destroy");
    }

    pub fn format_instance(&self, fast: bool) -> String {
        let target = Target::new(&self.id, self.name.as_deref(), self.state);
        self.operations.format_instance(&target, fast)
    }

    fn apply(&mut self, outcome: Outcome, operation: &str) {
        for error in &outcome.errors {
            tracing::warn!("{} {}: {}", operation, self.id, error);
        }
        if let Some(state) = outcome.state {
            self.state = state;
        }
        if let Some(name) = outcome.name {
            if let Some(previous) = &self.name {
                if previous != &name {
                    tracing::debug!("name of {} changed from {} to {}", self.id, previous, name);
                }
            }
            self.name = Some(name);
        }
        if let Some(vpc_id) = outcome.vpc_id {
            self.vpc_id = Some(vpc_id);
        }
    }
}

impl std::fmt::Debug for ResourceWrapper {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResourceWrapper")
            .field("id", &self.id.address())
            .field("group_id", &self.group_id)
            .field("name", &self.name)
            .field("state", &self.state)
            .field("vpc_id", &self.vpc_id)
            .finish()
    }
}
