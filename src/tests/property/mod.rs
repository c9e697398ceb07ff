//! Property-based tests for Etymon
//!
//! Property tests verify invariants that should hold for all inputs, rather
//! than testing specific cases.
//!
//! ## Running Property Tests
//!
//! ```sh
//! cargo test property --release
//! ```
//!
//! ## Test Modules
//!
//! - `canon_props`: lookup key derivation
//!   - Idempotent
//!   - Insensitive to case and diacritics
//!   - Script independent (Greek script and Beta Code agree)
//!
//! - `index_props`: homonym merging and scoring
//!   - Merged citations do not depend on insertion order
//!   - Scores only grow as citations are added
//!   - Citations stay in rank order
//!
//! - `resolver_props`: etymology resolution
//!   - Exactly one terminal result per entry
//!   - Blacklisted keys are never returned
//!   - Returned keys are always indexed
//!   - Direct hits carry a one-step path
//!
//! By default, proptest runs 256 cases per property. Set `PROPTEST_CASES`
//! to change that.

mod canon_props;
mod index_props;
mod resolver_props;
