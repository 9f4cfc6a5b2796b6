use crate::harness::TestConfig;

/// Configuration to use for all tests unless otherwise specified.
static DEFAULT_TEST_CONFIG: TestConfig = TestConfig {
    txt_records: &[],
    documents: &[],
};


mod test_negative_caching;
mod test_persistent_cache;
mod test_well_known_fallback;

pub use test_dns_over_https_lookup::TEST_DNS_OVER_HTTPS_LOOKUP;
pub use test_negative_caching::TEST_NEGATIVE_CACHING;
pub use test_persistent_cache::TEST_PERSISTENT_CACHE;
pub use test_trivial_with_default_config::TEST_TRIVIAL_WITH_DEFAULT_CONFIG;
pub use test_well_known_custom_record::TEST_WELL_KNOWN_CUSTOM_RECORD;
pub use test_well_known_fallback::TEST_WELL_KNOWN_FALLBACK;
