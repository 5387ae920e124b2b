//! Integration tests for the mirror
//!
//! These tests use wiremock to stand in for a MediaWiki instance and run the
//! client and the full mirror cycle end-to-end.

mod client_tests;
mod common;
mod mirror_tests;
