//! Integration tests.
//!
//! `router_tests` drives the full router in process against the in-memory
//! store. `api_tests` targets a running server over HTTP and is ignored by
//! default.

mod api_tests;
mod router_tests;
