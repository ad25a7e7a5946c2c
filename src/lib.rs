//! MEV alert bot
//!
//! Polls a Solana address for transactions, flags the ones a detection strategy
//! considers notable and relays alerts to a Discord channel.

pub mod api;
pub mod commands;
pub mod config;
pub mod models;
pub mod services;
pub mod utils;

#[cfg(test)]
mod test_support;
