//! A test that stores resolutions durably and serves them when live
//! resolution fails.

use std::sync::Arc;

use dweb_dns::{Error, MAX_TTL};

use crate::{
    harness::{
        mock_world::{MockWorld, DOH_HOST},
        MockTxt, Test, TestConfig,
    },
    tests::helpers::{key, resolver, run_async, MemoryStore, KEY},
};

/// Resolve names through a resolver backed by a persistent cache.
pub static TEST_PERSISTENT_CACHE: Test = Test {
    name: "test_persistent_cache",
    run: test_persistent_cache,
    config: &TestConfig {
        txt_records: &[MockTxt::new(
            "dwebs.io.",
            "dwebkey=40a7f6b6147ae695bcbcff432f684c7bb5291ea339c28c1755896cdeb80bd2f9",
            99_999_999,
        )],
        documents: &[],
    },
};

/// Test implementation of [`TEST_PERSISTENT_CACHE`].
fn test_persistent_cache(world: MockWorld) {
    TEST_PERSISTENT_CACHE.config.validate();

    let world = Arc::new(world);
    run_async(async {
        let store = Arc::new(MemoryStore::default());
        let resolver = resolver(&world).persistent_cache(store.clone());

        // Live resolutions are written with their clamped TTL
        assert_eq!(resolver.resolve_name("dwebs.io").await, Ok(key(KEY)));
        assert_eq!(store.get("dwebs.io"), Some((key(KEY), MAX_TTL)));

        // A fresh resolver with the same store, pointed at a dead world,
        // still answers for names it has seen
        let dead = Arc::new(MockWorld::new(&crate::tests::DEFAULT_TEST_CONFIG));
        let offline = resolver.transport(dead.clone());
        assert_eq!(offline.resolve_name("dwebs.io").await, Ok(key(KEY)));
        assert_eq!(dead.requests(DOH_HOST), 1);
        assert_eq!(dead.requests("dwebs.io"), 1);

        // Names it has not seen fail with the live error
        assert_eq!(
            offline.resolve_name("unseen.example").await,
            Err(Error::NotFound {
                name: String::from("unseen.example")
            })
        );

        // Invalid names are not handed to the store
        assert!(matches!(
            offline.resolve_name("?").await,
            Err(Error::InvalidName { .. })
        ));
    });
}
