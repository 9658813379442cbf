//! Filesystem engine contract tests
//!
//! These tests pin the engine's observable behavior: one test per
//! guaranteed property, each naming the exact error kind or byte-level
//! outcome callers may rely on.
