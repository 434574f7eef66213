//! PR Thread Relay - keeps one Discord thread per GitHub pull request.
//!
//! GitHub delivers pull request, review and review-request webhooks; the
//! relay verifies them, creates a thread when a PR opens, and posts each
//! later lifecycle change into that thread (archiving it on close).

pub mod chat;
pub mod config;
pub mod server;
pub mod sync;
pub mod types;
pub mod webhooks;

#[cfg(test)]
mod test_utils;
