use super::{CacheStats, DigestCache, StatementContext};
use crate::{
    config::Config,
    normalize::{NormalizeError, normalize_plan},
    plan::*,
    test_support::{JoinAlgo, join_plan, paging_plan},
};
use std::{sync::Arc, thread};

fn explain_tree() -> PlanTree {
    let inner = paging_plan(10, true);

    PlanTree::new(PlanNode::new(Explain::new(false)).with_child(inner.root().clone()))
        .expect("wrapper should build")
}

#[test]
fn first_lookup_misses_then_hits() {
    let cache = DigestCache::default();
    let tree = paging_plan(960, true);

    let first = cache.get_or_normalize(&tree).expect("plan should normalize");
    let second = cache.get_or_normalize(&tree).expect("plan should normalize");

    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(
        cache.stats(),
        CacheStats {
            hits: 1,
            misses: 1,
            size: 1,
        }
    );

    let direct = normalize_plan(&tree, &Config::default()).expect("plan should normalize");
    assert_eq!(*first, direct);
}

#[test]
fn concurrent_callers_share_one_computation() {
    let cache = DigestCache::default();
    let tree = join_plan(7, JoinAlgo::Hash, false);

    let results: Vec<_> = thread::scope(|scope| {
        let handles: Vec<_> = (0..8)
            .map(|_| scope.spawn(|| cache.get_or_normalize(&tree)))
            .collect();

        handles
            .into_iter()
            .map(|handle| handle.join().expect("worker should not panic"))
            .collect()
    });

    let first = results[0].as_ref().expect("plan should normalize");
    for result in &results {
        let plan = result.as_ref().expect("plan should normalize");
        assert!(Arc::ptr_eq(first, plan));
    }

    let stats = cache.stats();
    assert_eq!(stats.misses, 1);
    assert_eq!(stats.hits, 7);
    assert_eq!(stats.size, 1);
}

#[test]
fn failures_are_memoized() {
    let cache = DigestCache::default();
    let tree = explain_tree();

    let first = cache.get_or_normalize(&tree).expect_err("wrapper should fail");
    let second = cache.get_or_normalize(&tree).expect_err("wrapper should fail");

    assert_eq!(first, NormalizeError::UnsupportedNodeKind { kind: "Explain" });
    assert_eq!(first, second);
    assert_eq!(cache.stats().misses, 1);
    assert_eq!(cache.stats().hits, 1);
}

#[test]
fn entries_are_keyed_by_identity_not_content() {
    let cache = DigestCache::default();
    let first = paging_plan(960, true);
    let second = paging_plan(960, true);

    let a = cache.get_or_normalize(&first).expect("plan should normalize");
    let b = cache.get_or_normalize(&second).expect("plan should normalize");

    assert_eq!(a.digest(), b.digest());
    assert!(!Arc::ptr_eq(&a, &b));
    assert_eq!(cache.stats().size, 2);
    assert_eq!(cache.stats().misses, 2);
}

#[test]
fn evict_and_clear_drop_entries() {
    let cache = DigestCache::default();
    let first = paging_plan(1, true);
    let second = paging_plan(2, false);

    cache.get_or_normalize(&first).expect("plan should normalize");
    cache.get_or_normalize(&second).expect("plan should normalize");

    assert!(cache.evict(&first));
    assert!(!cache.evict(&first));
    assert_eq!(cache.stats().size, 1);

    cache.get_or_normalize(&first).expect("plan should normalize");
    assert_eq!(cache.stats().misses, 3);

    cache.clear();
    assert_eq!(cache.stats().size, 0);
    assert_eq!(cache.stats().misses, 3);
}

#[test]
fn statement_context_digests_its_plan_once() {
    let context = StatementContext::new(paging_plan(960, true), Config::default());

    let first = context.digest().expect("plan should normalize");
    let second = context.digest().expect("plan should normalize");

    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(context.plan().root().name(), "Limit");
    assert_eq!(context.digests().stats().hits, 1);
}

#[test]
fn cache_and_context_are_thread_safe() {
    fn assert_send_sync<T: Send + Sync>() {}

    assert_send_sync::<DigestCache>();
    assert_send_sync::<StatementContext>();
    assert_send_sync::<PlanTree>();
}
