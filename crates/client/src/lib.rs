//! Network-facing types for the MoonLight offline cache worker.
//!
//! This crate provides the request/response model the worker intercepts,
//! the `Network` transport trait with its reqwest implementation, and URL
//! resolution and scoping rules.

pub mod fetch;
pub mod request;
pub mod response;

pub use fetch::{HttpConfig, HttpNetwork, Network, Scope, ScopeError, UrlError, resolve};
pub use request::{Request, RequestMode};
pub use response::{Response, ResponseSource};

pub use reqwest::{Method, StatusCode};
