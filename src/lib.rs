//! # News Digest
//!
//! Acquires Korean news article stubs through a chain of fallback
//! strategies, extracts readable bodies from arbitrary article HTML, and
//! recommends search keywords from a user's favorited articles.
//!
//! ## Architecture
//!
//! 1. **Fetching** ([`fetcher`]): browser-like HTTP GET, no retries
//! 2. **Extraction** ([`extractor`]): ordered CSS selector chains, first match wins
//! 3. **Acquisition** ([`pipeline`]): listing fan-out and the search strategy
//!    chain (structured [`search_api`] first, results page second), with
//!    [`placeholder`] stubs as the last resort
//! 4. **Recommendation** ([`recommend`]): keyword frequency over liked titles
//!
//! [`summarize`] and [`store`] are the collaborators the command-line driver
//! wires around the pipeline.

pub mod config;
pub mod dates;
pub mod error;
pub mod extractor;
pub mod fetcher;
pub mod models;
pub mod output;
pub mod pipeline;
pub mod placeholder;
pub mod recommend;
pub mod search_api;
pub mod store;
pub mod summarize;
pub mod utils;
