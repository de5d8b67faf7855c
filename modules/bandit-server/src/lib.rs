//! HTTP surface for the bandit stat service: feedback ingestion and
//! ranked stat listing per domain.

pub mod config;
pub mod routes;
