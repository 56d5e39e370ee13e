//! The boundary layer: JSON wire types, the protocol operations and the
//! registry of buffers owned by the far side of the call boundary.

pub mod protocol;
pub mod registry;
pub mod types;

pub use protocol::{Bridge, EncodedReply};
pub use registry::MemoryRegistry;
pub use types::{RequestInput, Response};
