// sitelens-api: Async page retrieval for site analysis (direct + proxied)

pub mod error;
pub mod fetch;
pub mod transport;

pub use error::Error;
pub use fetch::{HttpFetcher, PageFetcher, ProxyFetcher};
pub use transport::{TlsMode, TransportConfig};
