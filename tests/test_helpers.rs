#![allow(dead_code)]

use godesk_cli::context::RequestContext;
use godesk_cli::request::{ApiBases, Transport};

/// Initialize the rustls crypto provider before any tests run.
/// This runs once per test binary when `test_helpers` is included.
#[ctor::ctor]
fn init_crypto_provider() {
    let _ = rustls::crypto::ring::default_provider().install_default();
}

/// Transport with both API bases pointed at `uri`.
#[must_use]
pub fn transport_for(uri: &str) -> Transport {
    transport_with_context(uri, RequestContext::default())
}

#[must_use]
pub fn transport_with_context(uri: &str, context: RequestContext) -> Transport {
    Transport::new(
        reqwest::Client::new(),
        ApiBases::new(uri, uri),
        context,
    )
}
