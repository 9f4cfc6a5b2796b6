//! A test that falls back to `.well-known` documents when TXT lookup fails.

use std::sync::Arc;

use dweb_dns::{events::Event, resolver::Method, Error, ResolveOptions, DEFAULT_TTL};

use crate::{
    harness::{
        mock_world::{MockWorld, DOH_HOST},
        MockDocument, Test, TestConfig,
    },
    tests::helpers::{key, resolver, run_async, EventLog, KEY, OTHER_KEY},
};

/// Resolve names whose only record is a `.well-known/dweb` document.
pub static TEST_WELL_KNOWN_FALLBACK: Test = Test {
    name: "test_well_known_fallback",
    run: test_well_known_fallback,
    config: &TestConfig {
        txt_records: &[],
        documents: &[
            MockDocument::new(
                "dwebs.io",
                "/.well-known/dweb",
                200,
                "dweb://40a7f6b6147ae695bcbcff432f684c7bb5291ea339c28c1755896cdeb80bd2f9\nttl=120\n",
            ),
            MockDocument::new(
                "sloppy.example",
                "/.well-known/dweb",
                200,
                "DWEB://14BC77D788FDAF07B89B28E9D276E47F2E44011F4ADB981921056E1B3B40E99E/\r\nttl=later\r\n",
            ),
            MockDocument::new("html.example", "/.well-known/dweb", 200, "<html></html>"),
            MockDocument::new("empty.example", "/.well-known/dweb", 200, ""),
        ],
    },
};

/// Test implementation of [`TEST_WELL_KNOWN_FALLBACK`].
fn test_well_known_fallback(world: MockWorld) {
    TEST_WELL_KNOWN_FALLBACK.config.validate();

    let world = Arc::new(world);
    run_async(async {
        let log = EventLog::default();
        let resolver = resolver(&world).observer(log.observer());

        assert_eq!(resolver.resolve_name("dwebs.io").await, Ok(key(KEY)));
        assert_eq!(world.requests(DOH_HOST), 1);
        assert_eq!(world.requests("dwebs.io"), 1);
        assert!(matches!(
            log.events().as_slice(),
            [
                Event::Failed { method: Method::DnsOverHttps, .. },
                Event::Resolved { method: Method::WellKnown, .. },
            ]
        ));
        assert_eq!(resolver.list_cache()[0].name, "dwebs.io");

        // Cased keys are accepted and a bad TTL line is reported but tolerated
        let sloppy = resolver.resolve_name("sloppy.example").await.unwrap();
        assert!(sloppy.as_str().eq_ignore_ascii_case(OTHER_KEY));
        assert!(log.events().iter().any(|event| matches!(
            event,
            Event::Failed { method: Method::WellKnown, name, err }
                if name == "sloppy.example" && err.contains("TTL")
        )));
        let entry = resolver
            .list_cache()
            .into_iter()
            .find(|entry| entry.name == "sloppy.example")
            .unwrap();
        let remaining = entry.valid_until - std::time::Instant::now();
        assert!(remaining.as_secs() > DEFAULT_TTL - 60, "expected the default TTL");

        assert!(matches!(
            resolver.resolve_name("html.example").await,
            Err(Error::InvalidRecord { .. })
        ));
        assert!(matches!(
            resolver.resolve_name("empty.example").await,
            Err(Error::NotFound { .. })
        ));

        // Disabling DNS-over-HTTPS goes straight to the document
        let options = ResolveOptions {
            ignore_cache: true,
            no_dns_over_https: true,
            ..Default::default()
        };
        let lookups = world.requests(DOH_HOST);
        assert_eq!(resolver.resolve_name_with("dwebs.io", options).await, Ok(key(KEY)));
        assert_eq!(world.requests(DOH_HOST), lookups);
        assert_eq!(world.requests("dwebs.io"), 2);
    });
}
