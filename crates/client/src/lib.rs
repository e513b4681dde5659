//! Network client for pwakit.
//!
//! This crate provides the reqwest-backed [`HttpNetwork`] the worker uses to
//! reach origin servers, plus URL canonicalization shared by the hosts.

pub mod fetch;

pub use fetch::{FetchConfig, HttpNetwork, UrlError, canonicalize, resolve};
