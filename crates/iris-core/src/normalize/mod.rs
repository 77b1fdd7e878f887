//! Provider response normalization.
//!
//! Each backend answers in its own shape; these modules turn those answers
//! into a [`NormalizedAnalysis`](crate::types::NormalizedAnalysis).

pub mod google;
pub mod openai;
