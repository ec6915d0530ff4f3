//! Constants used throughout the MedRef core crate.
//!
//! File names, defaults and tuning values are kept here so the server, the tests and the
//! configuration layer agree on them.

/// Filename of the medication knowledge base inside the data directory.
pub const MEDICATIONS_FILENAME: &str = "medications.json";

/// Filename of the provider preference store inside the data directory.
pub const PROVIDERS_FILENAME: &str = "providers.json";

/// Default data directory when no explicit directory is configured.
pub const DEFAULT_DATA_DIR: &str = ".";

/// Maximum number of fuzzy-only suggestions appended after substring matches.
pub const DEFAULT_FUZZY_LIMIT: usize = 5;

/// A fuzzy candidate must score strictly above this to be suggested.
pub const FUZZY_THRESHOLD: u32 = 50;

/// Suggestion queries are cut to this many characters before matching.
pub const MAX_QUERY_CHARS: usize = 100;

/// Score bonus for a candidate that starts with the query.
pub const PREFIX_BONUS: u32 = 20;

/// Default chat-completion model for the remote HPI engine.
pub const DEFAULT_HPI_MODEL: &str = "gpt-3.5-turbo";

/// Default request timeout for the remote HPI engine.
pub const DEFAULT_HPI_TIMEOUT_SECS: u64 = 30;

/// Past-medical-history values that mean "nothing relevant".
pub const NO_PMH_MARKERS: [&str; 4] = ["none", "no significant pmh", "n/a", ""];
