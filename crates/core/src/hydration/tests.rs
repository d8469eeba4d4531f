//! Resolver tests against an in-memory store.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use rstest::rstest;
use roster_shared::types::PageResponse;

use super::*;

#[derive(Debug, Clone, PartialEq)]
struct Team {
    id: u32,
    members: Slot<String>,
    projects: Slot<String>,
}

impl Team {
    fn new(id: u32) -> Self {
        Self {
            id,
            members: Slot::Unloaded,
            projects: Slot::Unloaded,
        }
    }
}

impl Hydratable for Team {
    type Id = u32;
    const TYPE_NAME: &'static str = "team";

    fn id(&self) -> Self::Id {
        self.id
    }
}

#[derive(Debug, Default)]
struct Store {
    members: Vec<(u32, String)>,
    projects: Vec<(u32, String)>,
    projects_offline: bool,
}

#[derive(Debug, Clone, Copy)]
enum Table {
    Members,
    Projects,
}

struct TableFetcher {
    table: Table,
    calls: Arc<AtomicUsize>,
    /// Returns every row instead of filtering, like a store that raced a writer.
    leaky: bool,
}

#[async_trait]
impl BatchFetch<Store, u32, String> for TableFetcher {
    async fn fetch(&self, store: &Store, ids: &[u32]) -> Result<Vec<(u32, String)>, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let rows = match self.table {
            Table::Members => &store.members,
            Table::Projects if store.projects_offline => return Err("projects table offline".into()),
            Table::Projects => &store.projects,
        };
        Ok(rows
            .iter()
            .filter(|(parent, _)| self.leaky || ids.contains(parent))
            .cloned()
            .collect())
    }
}

struct Fixture {
    hydrator: Hydrator<Team, Store>,
    member_calls: Arc<AtomicUsize>,
    project_calls: Arc<AtomicUsize>,
    metrics: Arc<CountingMetrics>,
}

fn fixture(concurrent: bool, leaky: bool) -> Fixture {
    let member_calls = Arc::new(AtomicUsize::new(0));
    let project_calls = Arc::new(AtomicUsize::new(0));
    let metrics = Arc::new(CountingMetrics::new());

    let registry = AssociationRegistry::new()
        .with(
            "members",
            TableFetcher {
                table: Table::Members,
                calls: Arc::clone(&member_calls),
                leaky,
            },
            |team: &mut Team, children| team.members.set(children),
        )
        .unwrap()
        .with(
            "projects",
            TableFetcher {
                table: Table::Projects,
                calls: Arc::clone(&project_calls),
                leaky,
            },
            |team: &mut Team, children| team.projects.set(children),
        )
        .unwrap();

    let hydrator = Hydrator::new(Arc::new(registry))
        .with_metrics(metrics.clone())
        .with_options(HydrationOptions {
            concurrent_fetches: concurrent,
        });

    Fixture {
        hydrator,
        member_calls,
        project_calls,
        metrics,
    }
}

fn rows(pairs: &[(u32, &str)]) -> Vec<(u32, String)> {
    pairs.iter().map(|(id, name)| (*id, (*name).to_string())).collect()
}

fn names(slot: &Slot<String>) -> Vec<&str> {
    slot.get()
        .expect("slot should be loaded")
        .iter()
        .map(String::as_str)
        .collect()
}

#[rstest]
#[case(false)]
#[case(true)]
#[tokio::test]
async fn test_children_attached_in_parent_order(#[case] concurrent: bool) {
    let f = fixture(concurrent, false);
    let store = Store {
        members: rows(&[(2, "c1"), (1, "c2"), (1, "c3")]),
        ..Store::default()
    };

    let teams = f
        .hydrator
        .hydrate_list(&store, vec![Team::new(1), Team::new(2), Team::new(3)])
        .await
        .unwrap();

    assert_eq!(teams.iter().map(|t| t.id).collect::<Vec<_>>(), vec![1, 2, 3]);
    assert_eq!(names(&teams[0].members), vec!["c2", "c3"]);
    assert_eq!(names(&teams[1].members), vec!["c1"]);
    assert!(names(&teams[2].members).is_empty());
}

#[tokio::test]
async fn test_empty_list_makes_no_fetches() {
    let f = fixture(false, false);

    let teams = f.hydrator.hydrate_list(&Store::default(), Vec::new()).await.unwrap();

    assert!(teams.is_empty());
    assert_eq!(f.member_calls.load(Ordering::SeqCst), 0);
    assert_eq!(f.project_calls.load(Ordering::SeqCst), 0);
    assert_eq!(f.metrics.fetches(), 0);
}

#[rstest]
#[case(false)]
#[case(true)]
#[tokio::test]
async fn test_each_association_fetched_once(#[case] concurrent: bool) {
    let f = fixture(concurrent, false);
    let store = Store {
        members: (0..200).map(|i| (i % 50, format!("m{i}"))).collect(),
        projects: (0..50).map(|i| (i, format!("p{i}"))).collect(),
        ..Store::default()
    };

    let teams = f
        .hydrator
        .hydrate_list(&store, (0..50).map(Team::new).collect())
        .await
        .unwrap();

    assert_eq!(f.member_calls.load(Ordering::SeqCst), 1);
    assert_eq!(f.project_calls.load(Ordering::SeqCst), 1);
    assert_eq!(f.metrics.fetches_for("team", "members"), 1);
    assert_eq!(f.metrics.fetches_for("team", "projects"), 1);
    assert!(teams.iter().all(|t| t.members.as_slice().len() == 4));
    assert!(teams.iter().all(|t| t.projects.as_slice().len() == 1));
}

#[tokio::test]
async fn test_unknown_parent_pairs_ignored() {
    let f = fixture(false, true);
    let store = Store {
        members: rows(&[(1, "a"), (99, "stale")]),
        ..Store::default()
    };

    let teams = f.hydrator.hydrate_list(&store, vec![Team::new(1)]).await.unwrap();

    assert_eq!(names(&teams[0].members), vec!["a"]);
    assert!(names(&teams[0].projects).is_empty());
    assert_eq!(f.metrics.orphans(), 1);
}

#[tokio::test]
async fn test_hydrate_one() {
    let f = fixture(false, false);
    let store = Store {
        members: rows(&[(7, "solo")]),
        ..Store::default()
    };

    let missing = f.hydrator.hydrate_one(&store, None).await.unwrap();
    assert!(missing.is_none());
    assert_eq!(f.member_calls.load(Ordering::SeqCst), 0);

    let team = f
        .hydrator
        .hydrate_one(&store, Some(Team::new(7)))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(team.id, 7);
    assert_eq!(names(&team.members), vec!["solo"]);
    assert!(team.projects.is_loaded());
}

#[tokio::test]
async fn test_hydrate_page_keeps_meta() {
    let f = fixture(false, false);
    let store = Store {
        members: rows(&[(4, "x"), (4, "y"), (5, "z")]),
        ..Store::default()
    };
    let page = PageResponse::new(vec![Team::new(4), Team::new(5)], 3, 2, 41);
    let meta = page.meta;

    let hydrated = f.hydrator.hydrate_page(&store, page).await.unwrap();

    assert_eq!(hydrated.meta, meta);
    assert_eq!(hydrated.meta.total, 41);
    assert_eq!(hydrated.meta.total_pages, 21);
    assert_eq!(hydrated.data.len(), 2);
    assert_eq!(names(&hydrated.data[0].members), vec!["x", "y"]);
}

#[tokio::test]
async fn test_rehydration_is_idempotent() {
    let f = fixture(false, false);
    let store = Store {
        members: rows(&[(1, "a"), (2, "b")]),
        projects: rows(&[(2, "p")]),
        ..Store::default()
    };

    let once = f
        .hydrator
        .hydrate_list(&store, vec![Team::new(2), Team::new(1)])
        .await
        .unwrap();
    let twice = f.hydrator.hydrate_list(&store, once.clone()).await.unwrap();

    assert_eq!(once, twice);
}

#[rstest]
#[case(false)]
#[case(true)]
#[tokio::test]
async fn test_fetch_failure_tagged_with_association(#[case] concurrent: bool) {
    let f = fixture(concurrent, false);
    let store = Store {
        projects_offline: true,
        ..Store::default()
    };

    let err = f
        .hydrator
        .hydrate_list(&store, vec![Team::new(1)])
        .await
        .unwrap_err();

    assert_eq!(err.association(), "projects");
    assert!(matches!(
        err,
        HydrationError::DataAccess {
            parent_type: "team",
            association: "projects",
            ..
        }
    ));
}

#[test]
fn test_duplicate_registration_rejected() {
    let calls = Arc::new(AtomicUsize::new(0));
    let fetcher = || TableFetcher {
        table: Table::Members,
        calls: Arc::clone(&calls),
        leaky: false,
    };

    let result = AssociationRegistry::<Team, Store>::new()
        .with("members", fetcher(), |team: &mut Team, c| team.members.set(c))
        .unwrap()
        .with("members", fetcher(), |team: &mut Team, c| team.projects.set(c));

    let err = result.unwrap_err();
    assert!(matches!(
        err,
        HydrationError::DuplicateAssociation {
            parent_type: "team",
            association: "members",
        }
    ));
}

#[test]
fn test_registry_keeps_registration_order() {
    let f = fixture(false, false);
    let registry = f.hydrator.registry();

    assert_eq!(
        registry.association_names().collect::<Vec<_>>(),
        vec!["members", "projects"]
    );
    assert!(registry.contains("projects"));
    assert!(!registry.contains("budgets"));
    assert_eq!(registry.len(), 2);
}

#[tokio::test]
async fn test_empty_registry_leaves_parents_untouched() {
    let hydrator = Hydrator::new(Arc::new(AssociationRegistry::<Team, Store>::new()));

    let teams = hydrator
        .hydrate_list(&Store::default(), vec![Team::new(1)])
        .await
        .unwrap();

    assert_eq!(teams, vec![Team::new(1)]);
}
