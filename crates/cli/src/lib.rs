//! Terminal output shared by the grvlfinder commands
//!
//! [`output`] prints status lines and formats distances, percentages and score
//! classes. [`progress`] wraps `indicatif` for spinners and the analysis bar.

#![warn(missing_docs)]

pub mod output;
pub mod progress;
