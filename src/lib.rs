//! rustgate - a layer-7 reverse proxy with health-checked upstream balancing
//!
//! This crate provides a reverse proxy that routes requests to registered
//! applications and balances each application's traffic across a dynamic
//! set of health-checked upstream instances:
//! - Request matchers (path prefix, methods, headers, query parameters)
//! - Round-robin, weighted and interleaved election strategies
//! - Active health probing with per-upstream probe tasks
//! - Hop and identity header rewriting on both legs of the proxy

pub mod balancer;
pub mod client;
pub mod config;
pub mod error;
pub mod frontend;
pub mod matcher;
pub mod proxy;
pub mod util;

pub use config::Config;
