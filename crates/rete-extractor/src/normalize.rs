//! Name normalization
//!
//! A coarse comparison key for display names: lower-case, split on
//! whitespace, sort the tokens and concatenate them without a separator.
//! "Mario Rossi" and "ROSSI  mario" share a key. Punctuation, accents and
//! partial names are not reconciled.

/// Comparison key for a display name
pub fn normalize(name: &str) -> String {
    let lowered = name.to_lowercase();
    let mut tokens: Vec<&str> = lowered.split_whitespace().collect();
    tokens.sort_unstable();
    tokens.concat()
}
