//! Domain layer: pure types and rules, no I/O.
//!
//! # Module Organization
//!
//! - `foundation` - ids, timestamps, error codes, the `StateMachine` trait
//! - `job` - job aggregate, lifecycle status, audit entries, QA report
//! - `knowledge` - extraction and design shapes returned by the AI stages
//! - `validation` - the validation engine
//! - `builder` - context handed to artifact generation
//! - `pipeline` - stage order, budgets, prompts and response parsing

pub mod builder;
pub mod foundation;
pub mod job;
pub mod knowledge;
pub mod pipeline;
pub mod validation;
