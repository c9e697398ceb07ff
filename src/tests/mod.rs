//! Cross-module tests.
//!
//! Unit tests live next to the code they cover; this tree holds the
//! property tests that span modules.

mod property;
