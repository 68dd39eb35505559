//! Integration tests for http_profiler
//!
//! The middleware is driven through its public API with a scripted sampler
//! and a stub graph renderer, so no real profiler or Graphviz install is
//! needed. `http_roundtrip` additionally serves it on a loopback port.
//!
//! Run with: cargo test --test integration


mod adhoc;
mod http_roundtrip;
mod passthrough;
mod password;
mod session;
