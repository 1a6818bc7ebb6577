//! Client library for the European Nucleotide Archive (ENA) REST services.
//!
//! Requests are described by explicit parameter records ([`request`]),
//! checked against an [`catalog::Catalog`] of legal values ([`validate`]),
//! turned into URLs ([`url`]), fetched through a [`client::Fetcher`], and
//! decoded into rows or sequence records ([`decode`]).

pub mod app;
pub mod catalog;
pub mod client;
pub mod config;
pub mod decode;
pub mod domain;
pub mod error;
pub mod output;
pub mod request;
pub mod url;
pub mod validate;
