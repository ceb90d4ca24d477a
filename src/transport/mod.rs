//! HTTP transport shared by every vendor adapter.

mod http;

pub use http::HttpTransport;
