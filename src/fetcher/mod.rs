//! Remote JSON retrieval.
//!
//! [`Transport`] is the network seam, [`RemoteFetcher`] layers in-flight
//! deduplication and last-good caching on top of it.

mod remote;
#[cfg(test)]
pub(crate) mod testing;
mod transport;

pub use remote::RemoteFetcher;
pub use transport::{build_http_client, HttpTransport, Transport};
