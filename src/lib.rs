//! Retail DNA - behavioral analytics for shopper data.
//!
//! Learns a dataset's "Domain DNA" through a generative model, discovers
//! shopper segments, synthesizes feedback and merchandising recommendations,
//! and deploys segments as campaign strategies.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
