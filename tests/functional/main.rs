//! HTTP-level tests against the full router

mod common;
mod rate_limit_test;
