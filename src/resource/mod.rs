//! Resource discovery and lifecycle
//!
//! # Architecture
//!
//! - [`identifier`] - Parsed composite resource addresses
//! - [`wrapper`] - A resource, its lifecycle state and its bound operations
//! - [`operations`] - Fetch/Destroy/Format per resource family
//! - [`registry`] - Address to operations family lookup
//! - [`finder`] - The ordered discovery chain
//! - [`pipeline`] - Discovery, filtering and bulk fetch
//! - [`driver`] - Sweeps resources to deletion
//! - [`present`] - Sectioned, grouped listing output
//!
//! # Example
//!
//! ```ignore
//! use iww::resource::{Pipeline, present::write_listing};
//!
//! async fn list(ctx: &iww::context::GroupContext) -> iww::Result<()> {
//!     let pipeline = Pipeline::default();
//!     let wrappers = pipeline.list(ctx, false).await?;
//!     write_listing(&mut std::io::stdout(), ctx, &wrappers, false).await
//! }
//! ```

pub mod driver;
pub mod finder;
pub mod identifier;
pub mod operations;
pub mod pipeline;
pub mod present;
pub mod registry;
pub mod wrapper;

pub use driver::{drive, SweepReport};
pub use identifier::ResourceIdentifier;
pub use operations::Operations;
pub use pipeline::Pipeline;
pub use wrapper::{Capabilities, LifecycleState, Outcome, ResourceWrapper, Target};
