//! Tool Factory - turns course content into interactive decision tools.
//!
//! A submission runs through AI-driven extraction, design and generation,
//! gated by structural validation at every step, and lands in human review.
//! Reviewers approve (deploy), reject or request revisions; failed passes
//! can be retried until the pass limit escalates the job.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
