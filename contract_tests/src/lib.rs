//! # Behavioral Contract Tests
//!
//! This crate provides "golden" tests for the filesystem engine to ensure
//! its observable behavior doesn't drift accidentally over time.
//!
//! ## Philosophy
//!
//! - **Explicit over implicit**: The behavioral contract is written as code
//! - **Testability first**: Contract tests fail when semantics change
//! - **Compatibility over taste**: Deliberate quirks (ownership asymmetry,
//!   error-kind translations) are pinned exactly, not "fixed"
//!
//! ## Structure
//!
//! Each area has a module with contract tests that verify:
//! - Error kinds for every rejection path
//! - Block chunking and content round-trips
//! - Re-parenting and deep-copy semantics
//! - Serialized listing shapes

pub mod fs_engine;
