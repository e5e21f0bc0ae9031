//! HTTP API Tests

mod health_tests;
mod rpc_tests;
