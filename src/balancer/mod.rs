//! Service balancer: upstream pool, health probing, and election.

mod service;
pub mod strategy;
mod upstream;

pub use service::{BalancerConfig, ServiceBalancer};
pub use upstream::{HealthCheckConfig, Upstream};
