//! Lifecycle and aggregation tests with scripted finders and operations
//!
//! No remote service is involved: finders hand out wrappers bound to
//! scripted operations, so discovery, filtering, listing output and the
//! sweep loop can be checked deterministically.

use async_trait::async_trait;
use iww::cloud::auth::Credentials;
use iww::cloud::client::{CloudClient, Endpoints};
use iww::commands::{self, RemoveOptions};
use iww::context::{GroupContext, Scope, Settings};
use iww::resource::finder::Finder;
use iww::resource::operations::Operations;
use iww::resource::present::write_listing;
use iww::resource::{
    drive, Capabilities, LifecycleState, Outcome, Pipeline, ResourceIdentifier, ResourceWrapper,
    Target,
};
use iww::Error;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

const VPC: &str = "crn:v1:bluemix:public:is:us-south:a/1::vpc:r006-1";
const SUBNET: &str = "crn:v1:bluemix:public:is:us-south:a/1::subnet:0717-s1";
const LOGS: &str = "crn:v1:bluemix:public:logdna:us-south:a/1:guid-logs::";

#[derive(Debug, Clone, Copy)]
enum Behavior {
    /// Exists until destroy was called
    AliveUntilDestroyed,
    /// Always reports not found
    Gone,
    /// Never goes away
    Stubborn,
    /// Exists inside the given VPC
    InVpc(&'static str),
}

struct Scripted {
    behavior: Behavior,
    destroyed: bool,
    fetch_calls: Arc<AtomicUsize>,
    destroy_calls: Arc<AtomicUsize>,
}

#[async_trait]
impl Operations for Scripted {
    async fn fetch(&mut self, _ctx: &GroupContext, _target: &Target<'_>) -> Outcome {
        self.fetch_calls.fetch_add(1, Ordering::SeqCst);
        match self.behavior {
            Behavior::AliveUntilDestroyed if self.destroyed => Outcome::deleted(),
            Behavior::AliveUntilDestroyed | Behavior::Stubborn => Outcome::exists(None),
            Behavior::Gone => Outcome::deleted(),
            Behavior::InVpc(vpc) => Outcome::exists(None).with_vpc_id(Some(vpc.to_string())),
        }
    }

    async fn destroy(&mut self, _ctx: &GroupContext, _target: &Target<'_>) -> Outcome {
        self.destroyed = true;
        self.destroy_calls.fetch_add(1, Ordering::SeqCst);
        Outcome::unchanged()
    }

    fn format_instance(&self, target: &Target<'_>, _fast: bool) -> String {
        format!("stub {}", target.id)
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities {
            implemented: true,
            network_affiliation: matches!(self.behavior, Behavior::InVpc(_)),
        }
    }
}

/// Hands out one wrapper per entry. `rounds` limits how many listings
/// include the entries; later listings come back empty.
struct StaticFinder {
    entries: Vec<(&'static str, &'static str, Behavior)>,
    calls: Arc<AtomicUsize>,
    fetch_calls: Arc<AtomicUsize>,
    destroy_calls: Arc<AtomicUsize>,
    rounds: usize,
}

impl StaticFinder {
    fn new(entries: Vec<(&'static str, &'static str, Behavior)>) -> Self {
        Self {
            entries,
            calls: Arc::new(AtomicUsize::new(0)),
            fetch_calls: Arc::new(AtomicUsize::new(0)),
            destroy_calls: Arc::new(AtomicUsize::new(0)),
            rounds: usize::MAX,
        }
    }
}

#[async_trait]
impl Finder for StaticFinder {
    fn name(&self) -> &'static str {
        "static"
    }

    async fn find(
        &self,
        _ctx: &GroupContext,
        mut wrappers: Vec<ResourceWrapper>,
    ) -> iww::Result<Vec<ResourceWrapper>> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        if call >= self.rounds {
            return Ok(wrappers);
        }
        for (address, group, behavior) in &self.entries {
            let operations = Scripted {
                behavior: *behavior,
                destroyed: false,
                fetch_calls: self.fetch_calls.clone(),
                destroy_calls: self.destroy_calls.clone(),
            };
            wrappers.push(ResourceWrapper::new(
                ResourceIdentifier::parse(address)?,
                *group,
                None,
                Box::new(operations),
            ));
        }
        Ok(wrappers)
    }
}

struct FailingFinder;

#[async_trait]
impl Finder for FailingFinder {
    fn name(&self) -> &'static str {
        "failing"
    }

    async fn find(
        &self,
        _ctx: &GroupContext,
        _wrappers: Vec<ResourceWrapper>,
    ) -> iww::Result<Vec<ResourceWrapper>> {
        Err(Error::Api {
            status: 500,
            message: "boom".into(),
        })
    }
}

fn context(scope: Scope) -> GroupContext {
    let endpoints = Endpoints::uniform("http://127.0.0.1:9");
    let credentials = Credentials::new(None, Some("test-token"), &endpoints.iam).unwrap();
    let client = CloudClient::new(credentials, endpoints).unwrap();
    let settings = Settings {
        fetch_concurrency: 4,
        fetch_pacing: Duration::ZERO,
        sweep_pause: Duration::ZERO,
        sweep_budget: 5,
    };
    GroupContext::new(client, None, scope, settings)
}

fn output(buffer: Vec<u8>) -> String {
    String::from_utf8(buffer).unwrap()
}

mod aggregation_tests {
    use super::*;

    /// An empty inventory lists nothing and prints only the main section header
    #[tokio::test]
    async fn test_empty_inventory_listing() {
        let ctx = context(Scope::default());
        let pipeline = Pipeline::new(vec![Box::new(StaticFinder::new(vec![]))]);

        let wrappers = pipeline.list(&ctx, true).await.unwrap();
        assert!(wrappers.is_empty());

        let mut out = Vec::new();
        commands::ls(&ctx, &pipeline, false, &mut out).await.unwrap();
        assert_eq!(output(out), "#Resource instances\n");
    }

    /// Fast mode with a VPC filter fails before any finder runs
    #[tokio::test]
    async fn test_fast_with_vpc_filter_is_configuration_error() {
        let ctx = context(Scope {
            vpc_id: Some("r006-1".into()),
            ..Default::default()
        });
        let finder = StaticFinder::new(vec![(VPC, "g1", Behavior::Stubborn)]);
        let calls = finder.calls.clone();
        let pipeline = Pipeline::new(vec![Box::new(finder)]);

        let result = pipeline.list(&ctx, true).await;
        assert!(matches!(result, Err(Error::Configuration(_))));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    /// A failing finder aborts discovery with the finder's name attached
    #[tokio::test]
    async fn test_finder_failure_aborts_discovery() {
        let ctx = context(Scope::default());
        let pipeline = Pipeline::new(vec![
            Box::new(StaticFinder::new(vec![(VPC, "g1", Behavior::Stubborn)])),
            Box::new(FailingFinder),
        ]);

        match pipeline.list_all(&ctx).await {
            Err(Error::Discovery { finder, source }) => {
                assert_eq!(finder, "failing");
                assert_eq!(source.status(), Some(500));
            }
            other => panic!("expected discovery error, got {:?}", other.map(|w| w.len())),
        }
    }

    /// Resources of other groups added by finders are dropped
    #[tokio::test]
    async fn test_group_filter_applies_last() {
        let ctx = context(Scope {
            group_id: Some("g1".into()),
            ..Default::default()
        });
        let pipeline = Pipeline::new(vec![Box::new(StaticFinder::new(vec![
            (VPC, "g1", Behavior::Stubborn),
            (SUBNET, "g2", Behavior::Stubborn),
            (LOGS, "g1", Behavior::Stubborn),
        ]))]);

        let wrappers = pipeline.list_all(&ctx).await.unwrap();
        let addresses: Vec<&str> = wrappers.iter().map(|w| w.address()).collect();
        assert_eq!(addresses, vec![VPC, LOGS]);
    }

    /// Duplicate addresses are kept once
    #[tokio::test]
    async fn test_duplicates_are_removed() {
        let ctx = context(Scope::default());
        let pipeline = Pipeline::new(vec![
            Box::new(StaticFinder::new(vec![(VPC, "g1", Behavior::Stubborn)])),
            Box::new(StaticFinder::new(vec![(VPC, "g1", Behavior::Stubborn)])),
        ]);

        assert_eq!(pipeline.list_all(&ctx).await.unwrap().len(), 1);
    }

    /// The VPC filter keeps only affiliated infrastructure of that VPC
    #[tokio::test]
    async fn test_vpc_filter() {
        let ctx = context(Scope {
            vpc_id: Some("r006-1".into()),
            ..Default::default()
        });
        let other = "crn:v1:bluemix:public:is:us-south:a/1::subnet:0717-s2";
        let pipeline = Pipeline::new(vec![Box::new(StaticFinder::new(vec![
            (SUBNET, "g1", Behavior::InVpc("r006-1")),
            (other, "g1", Behavior::InVpc("r006-2")),
            (VPC, "g1", Behavior::Stubborn),
            (LOGS, "g1", Behavior::InVpc("r006-1")),
        ]))]);

        let wrappers = pipeline.list(&ctx, false).await.unwrap();
        let addresses: Vec<&str> = wrappers.iter().map(|w| w.address()).collect();
        assert_eq!(addresses, vec![SUBNET]);
    }

    /// Fetching twice without remote change gives the same state
    #[tokio::test]
    async fn test_fetch_is_idempotent() {
        let ctx = context(Scope::default());
        let pipeline = Pipeline::new(vec![Box::new(StaticFinder::new(vec![
            (VPC, "g1", Behavior::Stubborn),
            (SUBNET, "g1", Behavior::Gone),
        ]))]);

        let mut wrappers = pipeline.list(&ctx, false).await.unwrap();
        let first: Vec<LifecycleState> = wrappers.iter().map(|w| w.state()).collect();
        for wrapper in wrappers.iter_mut() {
            wrapper.fetch(&ctx).await;
        }
        let second: Vec<LifecycleState> = wrappers.iter().map(|w| w.state()).collect();
        assert_eq!(first, second);
        assert_eq!(first, vec![LifecycleState::Exists, LifecycleState::Deleted]);
    }
}

mod listing_tests {
    use super::*;

    /// Sections, group headers and address ordering
    #[tokio::test]
    async fn test_sections_and_grouping() {
        let ctx = context(Scope::default());
        let unknown = "crn:v1:bluemix:public:is:us-south:a/1::dedicated-host:0717-d";
        let pipeline = Pipeline::new(vec![Box::new(StaticFinder::new(vec![
            (VPC, "g2", Behavior::Stubborn),
            (LOGS, "g1", Behavior::Gone),
            (SUBNET, "g2", Behavior::Stubborn),
        ]))]);
        let mut wrappers = pipeline.list(&ctx, false).await.unwrap();
        let id = ResourceIdentifier::parse(unknown).unwrap();
        let operations = iww::resource::registry::lookup(&id);
        wrappers.push(ResourceWrapper::new(id, "g1", None, operations));

        let mut out = Vec::new();
        write_listing(&mut out, &ctx, &wrappers, false).await.unwrap();

        let expected = format!(
            "#Unimplemented resource instances\n\
             # g1 (  )\n\
             #-- is is dedicated-host {unknown}\n\
             #Missing resource instances\n\
             # g1 (  )\n\
             stub {LOGS}\n\
             #Resource instances\n\
             # g2 (  )\n\
             stub {SUBNET}\n\
             stub {VPC}\n"
        );
        assert_eq!(output(out), expected);
    }

    /// Fast mode lists everything as existing
    #[tokio::test]
    async fn test_fast_listing_has_single_section() {
        let ctx = context(Scope::default());
        let pipeline = Pipeline::new(vec![Box::new(StaticFinder::new(vec![
            (LOGS, "g1", Behavior::Gone),
        ]))]);

        let mut out = Vec::new();
        commands::ls(&ctx, &pipeline, true, &mut out).await.unwrap();
        assert_eq!(output(out), format!("#Resource instances\n# g1 (  )\nstub {LOGS}\n"));
    }
}

mod driver_tests {
    use super::*;

    /// A VPC that exists, then is gone after destroy, completes within two sweeps
    #[tokio::test]
    async fn test_vpc_deleted_within_two_sweeps() {
        let ctx = context(Scope::default());
        let finder = StaticFinder::new(vec![(VPC, "g1", Behavior::AliveUntilDestroyed)]);
        let destroy_calls = finder.destroy_calls.clone();
        let pipeline = Pipeline::new(vec![Box::new(finder)]);

        let wrappers = pipeline.list_all(&ctx).await.unwrap();
        let mut out = Vec::new();
        let report = drive(&ctx, &pipeline, wrappers, &mut out).await.unwrap();

        assert!(report.sweeps <= 2);
        assert_eq!(report.deleted, 1);
        assert_eq!(destroy_calls.load(Ordering::SeqCst), 1);
        let text = output(out);
        assert!(text.contains(&format!("start: stub {VPC}")));
        assert!(text.contains(&format!("destroying stub {VPC}")));
        assert!(text.contains(&format!("deleted: stub {VPC}")));
    }

    /// Running out of sweeps is reported as incomplete
    #[tokio::test]
    async fn test_budget_exhaustion_is_incomplete() {
        let ctx = context(Scope::default());
        let pipeline = Pipeline::new(vec![Box::new(StaticFinder::new(vec![
            (VPC, "g1", Behavior::Stubborn),
            (LOGS, "g1", Behavior::Gone),
        ]))]);

        let wrappers = pipeline.list(&ctx, false).await.unwrap();
        let mut out = Vec::new();
        let result = drive(&ctx, &pipeline, wrappers, &mut out).await;
        assert!(matches!(result, Err(Error::Incomplete { remaining: 1 })));
    }

    /// Resources no longer discovered are pruned from the active set
    #[tokio::test]
    async fn test_undiscovered_resources_are_pruned() {
        let ctx = context(Scope::default());
        let mut finder = StaticFinder::new(vec![(VPC, "g1", Behavior::Stubborn)]);
        finder.rounds = 1;
        let pipeline = Pipeline::new(vec![Box::new(finder)]);

        let wrappers = pipeline.list(&ctx, false).await.unwrap();
        let mut out = Vec::new();
        let report = drive(&ctx, &pipeline, wrappers, &mut out).await.unwrap();
        assert_eq!(report.sweeps, 1);
        assert_eq!(report.deleted, 0);
    }

    /// A deleted wrapper stays deleted whatever its operations report later
    #[tokio::test]
    async fn test_deleted_is_terminal() {
        let ctx = context(Scope::default());
        let pipeline = Pipeline::new(vec![Box::new(StaticFinder::new(vec![(
            VPC,
            "g1",
            Behavior::Gone,
        )]))]);
        let mut wrapper = pipeline.list_all(&ctx).await.unwrap().remove(0);

        wrapper.fetch(&ctx).await;
        assert_eq!(wrapper.state(), LifecycleState::Deleted);

        wrapper.bind(Box::new(Scripted {
            behavior: Behavior::Stubborn,
            destroyed: false,
            fetch_calls: Arc::new(AtomicUsize::new(0)),
            destroy_calls: Arc::new(AtomicUsize::new(0)),
        }));
        wrapper.destroy(&ctx).await;
        wrapper.fetch(&ctx).await;
        assert_eq!(wrapper.state(), LifecycleState::Deleted);
    }
}

mod command_tests {
    use super::*;
    use std::io::Cursor;

    fn scoped() -> Scope {
        Scope {
            group_id: Some("g1".into()),
            group_name: Some("dev".into()),
            ..Default::default()
        }
    }

    /// Declining the prompt destroys nothing
    #[tokio::test]
    async fn test_rm_declined() {
        let ctx = context(scoped());
        let finder = StaticFinder::new(vec![(VPC, "g1", Behavior::AliveUntilDestroyed)]);
        let destroy_calls = finder.destroy_calls.clone();
        let pipeline = Pipeline::new(vec![Box::new(finder)]);

        let mut input = Cursor::new("n\n");
        let mut out = Vec::new();
        let report = commands::rm(
            &ctx,
            &pipeline,
            &RemoveOptions::default(),
            &mut input,
            &mut out,
        )
        .await
        .unwrap();

        assert!(report.is_none());
        assert_eq!(destroy_calls.load(Ordering::SeqCst), 0);
        let text = output(out);
        assert!(text.contains("# g1 ( dev )"));
        assert!(text.ends_with(commands::CONFIRM_PROMPT));
    }

    /// An empty answer confirms
    #[tokio::test]
    async fn test_rm_confirmed_by_empty_answer() {
        let ctx = context(scoped());
        let pipeline = Pipeline::new(vec![Box::new(StaticFinder::new(vec![(
            VPC,
            "g1",
            Behavior::AliveUntilDestroyed,
        )]))]);

        let mut input = Cursor::new("\n");
        let mut out = Vec::new();
        let report = commands::rm(
            &ctx,
            &pipeline,
            &RemoveOptions::default(),
            &mut input,
            &mut out,
        )
        .await
        .unwrap()
        .unwrap();
        assert_eq!(report.deleted, 1);
    }

    /// An unknown address removes nothing and is not an error
    #[tokio::test]
    async fn test_rm_unknown_crn() {
        let ctx = context(Scope::default());
        let finder = StaticFinder::new(vec![(VPC, "g1", Behavior::AliveUntilDestroyed)]);
        let destroy_calls = finder.destroy_calls.clone();
        let pipeline = Pipeline::new(vec![Box::new(finder)]);
        let options = RemoveOptions {
            crn: Some(SUBNET.into()),
            force: true,
        };

        let mut out = Vec::new();
        let report = commands::rm(&ctx, &pipeline, &options, &mut std::io::empty(), &mut out)
            .await
            .unwrap();
        assert!(report.is_none());
        assert_eq!(output(out), format!("crn not found, crn: {SUBNET}\n"));
        assert_eq!(destroy_calls.load(Ordering::SeqCst), 0);
    }

    /// The address filter narrows removal to one resource
    #[tokio::test]
    async fn test_rm_single_crn() {
        let ctx = context(Scope::default());
        let pipeline = Pipeline::new(vec![Box::new(StaticFinder::new(vec![
            (VPC, "g1", Behavior::AliveUntilDestroyed),
            (SUBNET, "g1", Behavior::AliveUntilDestroyed),
        ]))]);
        let options = RemoveOptions {
            crn: Some(SUBNET.into()),
            force: true,
        };

        let mut out = Vec::new();
        let report = commands::rm(&ctx, &pipeline, &options, &mut std::io::empty(), &mut out)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(report.deleted, 1);
        assert!(!output(out).contains(&format!("destroying stub {VPC}")));
    }

    /// Naming one address fetches only that resource
    #[tokio::test]
    async fn test_rm_crn_fetches_only_named_resource() {
        let ctx = context(Scope::default());
        let finder = StaticFinder::new(vec![
            (VPC, "g1", Behavior::Stubborn),
            (SUBNET, "g1", Behavior::Stubborn),
            (LOGS, "g2", Behavior::Stubborn),
        ]);
        let fetch_calls = finder.fetch_calls.clone();
        let pipeline = Pipeline::new(vec![Box::new(finder)]);
        let options = RemoveOptions {
            crn: Some(LOGS.into()),
            force: false,
        };

        let mut out = Vec::new();
        let mut input = "n\n".as_bytes();
        let report = commands::rm(&ctx, &pipeline, &options, &mut input, &mut out)
            .await
            .unwrap();
        assert!(report.is_none());
        assert_eq!(fetch_calls.load(Ordering::SeqCst), 1);
        assert!(output(out).contains(&format!("stub {LOGS}")));
    }

    /// Removal without any scope is refused before discovery
    #[tokio::test]
    async fn test_rm_unscoped_refused() {
        let ctx = context(Scope::default());
        let finder = StaticFinder::new(vec![(VPC, "g1", Behavior::Stubborn)]);
        let calls = finder.calls.clone();
        let pipeline = Pipeline::new(vec![Box::new(finder)]);

        let mut out = Vec::new();
        let result = commands::rm(
            &ctx,
            &pipeline,
            &RemoveOptions {
                crn: None,
                force: true,
            },
            &mut std::io::empty(),
            &mut out,
        )
        .await;
        assert!(matches!(result, Err(Error::Configuration(_))));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }
}
