//! WallSt Subscriptions - Card subscription backend
//!
//! Takes card details from a web form through the Stripe subscription
//! sequence, keeps minimal billing records in PostgreSQL and syncs
//! subscription status from Stripe webhooks.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
