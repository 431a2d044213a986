//! `taskstream-transport`: opens the long-lived streaming request and
//! delivers its body as decoded text chunks.

pub mod decode;
pub mod error;
pub mod http;
pub mod transport;

pub use decode::Utf8ChunkDecoder;
pub use error::TransportError;
pub use http::HttpTransport;
pub use transport::{StreamRequest, Transport, TransportEvent};
