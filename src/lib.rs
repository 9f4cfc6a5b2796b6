#![deny(missing_docs)]
#![warn(rustdoc::broken_intra_doc_links)]

/*!
Rust resolver of dweb names to the 64-character hex keys they point to.

# Introduction

Peer-to-peer sites are addressed by 32-byte public keys, usually written as
64 hexadecimal characters. Such keys are hard to remember, so a site can
publish the key it currently uses under a regular domain name, in one of
two ways:

- a DNS TXT record on the name, for instance

  ```text
  dwebs.io. 3600 IN TXT "dwebkey=40a7f6b6147ae695bcbcff432f684c7bb5291ea339c28c1755896cdeb80bd2f9"
  ```

- a document served at `https://dwebs.io/.well-known/dweb`, whose first line
  holds the key and whose optional second line holds a TTL in seconds:

  ```text
  dweb://40a7f6b6147ae695bcbcff432f684c7bb5291ea339c28c1755896cdeb80bd2f9
  ttl=3600
  ```

`dweb-dns` looks up TXT records through a public DNS-over-HTTPS provider,
falls back to the `.well-known` document, and caches what it finds (including
names known not to resolve) for as long as the record allows. It presents this
service in the following interface:

```no_run
# #[tokio::main]
# async fn main() {
use dweb_dns::NameResolver;
let resolver = NameResolver::<reqwest::Client>::new();
let key = resolver.resolve_name("dweb://dwebs.io/index.html").await;
# }
```

[`NameResolver::new`] creates a resolver (that should be reused to take
advantage of caching). [`NameResolver::resolve_name`] accepts bare names,
URLs, versioned names such as `dwebs.io+5`, and keys themselves, which are
returned as-is without any network activity.

# Customization

The record format is configurable, so the same machinery can resolve
other protocols' names: see [`NameResolver::txt_regex`],
[`NameResolver::protocol_regex`] and [`NameResolver::record_name`].
Requests go through a [`Transport`], implemented for [`reqwest::Client`] when
the `reqwest` feature is enabled (the default). Results can additionally be
stored durably, and served when live resolution fails, by a
[`PersistentCache`]. Resolution activity can be observed through
[`events`].

[`Transport`]: transport::Transport
*/

mod client;
pub use client::{
    cache::{CacheEntry, Cached},
    Error, NameResolver, PersistentCache, ResolveOptions,
};

pub mod events;

mod name;
pub use name::{default_hash_regex, normalize, NormalizedName};

mod record;
pub use record::{sanitize_ttl, Key, KeyParseError, KeyRecord, DEFAULT_TTL, KEY_LEN, MAX_TTL};

pub mod resolver;

pub mod transport;

#[doc(hidden)]
pub const EXAMPLE_KEY: &str = "40a7f6b6147ae695bcbcff432f684c7bb5291ea339c28c1755896cdeb80bd2f9";
