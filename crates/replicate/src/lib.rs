//! Replicate prediction client.
//!
//! Submits coloring-page and mandala generations to a Replicate-style
//! prediction API and polls each job until it reaches a terminal state.
//! The HTTP layer sits behind [`provider::PredictionProvider`] so the
//! submit and poll logic can run against any implementation.

pub mod api;
pub mod backoff;
pub mod config;
pub mod error;
pub mod generator;
pub mod poller;
pub mod prediction;
pub mod provider;
pub mod submitter;
