//! HTTP connection handling module
//!
//! [`HttpConnection`] owns one accepted connection end to end: it reads a single request
//! head and its fixed-length body, hands the request to a
//! [`Handler`](crate::handler::Handler), writes the response and shuts the write half down.
//! There is no keep-alive, every connection carries exactly one exchange.

mod http_connection;

pub use http_connection::ConnectionConfig;
pub use http_connection::DEFAULT_MAX_BODY_BYTES;
pub use http_connection::HttpConnection;
