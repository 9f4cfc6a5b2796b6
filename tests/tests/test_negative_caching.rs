//! A test that remembers names known not to resolve, and only those.

use std::sync::Arc;

use dweb_dns::{Cached, Error, ResolveOptions};

use crate::{
    harness::{mock_world::MockWorld, MockDocument, Test, TestConfig},
    tests::helpers::{resolver, run_async},
};

/// Resolve names whose hosts are missing, lack a record, or are broken.
pub static TEST_NEGATIVE_CACHING: Test = Test {
    name: "test_negative_caching",
    run: test_negative_caching,
    config: &TestConfig {
        txt_records: &[],
        documents: &[
            MockDocument::new("norecord.example", "/index.html", 200, "<html></html>"),
            MockDocument::new("broken.example", "/.well-known/dweb", 500, "oops"),
        ],
    },
};

/// Test implementation of [`TEST_NEGATIVE_CACHING`].
fn test_negative_caching(world: MockWorld) {
    TEST_NEGATIVE_CACHING.config.validate();

    let world = Arc::new(world);
    run_async(async {
        let resolver = resolver(&world);

        // Unreachable hosts and missing documents are cached misses
        for host in ["nowhere.example", "norecord.example"] {
            for _ in 0..3 {
                assert_eq!(
                    resolver.resolve_name(host).await,
                    Err(Error::NotFound {
                        name: host.to_owned()
                    })
                );
            }
            assert_eq!(world.requests(host), 1, "miss for {host} was not cached");
        }
        let cached = resolver.list_cache();
        assert_eq!(cached.len(), 2);
        assert!(cached.iter().all(|entry| entry.value == Cached::Missing));

        // Cached misses can be skipped
        let options = ResolveOptions {
            ignore_cached_miss: true,
            ..Default::default()
        };
        assert!(resolver.resolve_name_with("nowhere.example", options).await.is_err());
        assert_eq!(world.requests("nowhere.example"), 2);

        // Server errors may be transient, so they are not cached
        for attempt in 1..=2 {
            assert_eq!(
                resolver.resolve_name("broken.example").await,
                Err(Error::Lookup {
                    name: String::from("broken.example"),
                    status: 500,
                })
            );
            assert_eq!(world.requests("broken.example"), attempt);
        }

        // Disabling both protocols is a miss that is not remembered
        let options = ResolveOptions {
            no_dns_over_https: true,
            no_well_known: true,
            ..Default::default()
        };
        assert!(matches!(
            resolver.resolve_name_with("elsewhere.example", options).await,
            Err(Error::NotFound { .. })
        ));
        assert_eq!(world.requests("elsewhere.example"), 0);
        assert_eq!(resolver.list_cache().len(), 2);

        // Invalid names never reach the network
        let before = world.total_requests();
        assert!(matches!(
            resolver.resolve_name("").await,
            Err(Error::InvalidName { .. })
        ));
        assert_eq!(world.total_requests(), before);
    });
}
