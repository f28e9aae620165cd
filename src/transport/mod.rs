//! HTTP transport for OpenAI-compatible completion APIs.

mod http;

pub use http::HttpTransport;
