//! HTTP-level building blocks: fingerprint-preserving header maps,
//! HTTP/2 fingerprint types and the collected response.

pub mod h2fingerprint;
pub mod orderedheaders;
pub mod response;

pub use h2fingerprint::H2Fingerprint;
pub use orderedheaders::OrderedHeaderMap;
pub use response::CollectedResponse;
