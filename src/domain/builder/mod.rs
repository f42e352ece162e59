//! Builder Context Assembler.

mod context;

pub use context::{
    BuilderContext, BuilderError, ContextItem, ContextQuote, ContextTerm, TermPlacement,
    VerdictCriteria,
};
