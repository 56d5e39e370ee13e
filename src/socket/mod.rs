//! Socket layer: proxy configuration, the unified stream type and the
//! connect job.

pub mod connect;
pub mod proxy;
pub mod stream;

pub use connect::ConnectJob;
pub use proxy::{ProxySettings, ProxyType};
pub use stream::SocketStream;
