//! Answer verification: citation syntax, semantic attribution and truncation.
//!
//! Stages run in order on a generated answer:
//!
//! 1. [`CitationChecker`] validates `[n]` markers against the evidence list.
//! 2. [`Attributor`] matches every sentence to its most similar evidence chunk.
//! 3. [`truncate`] cuts the answer at the first unsupported sentence.

mod attribution;
mod citations;
mod config;
mod truncate;
mod types;


pub use attribution::{Attributor, attribute};
pub use citations::{CitationChecker, cited_in_order, citation_markers, resolve_marker};
pub use config::AttributionConfig;
pub use truncate::{reconstruct, truncate};
pub use types::{
    AttributionResult, OutOfBoundsCitation, SentenceDetail, SyntaxResult, VerificationStatus,
};
