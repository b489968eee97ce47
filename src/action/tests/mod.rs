//! Tests for actions
//!
//! Organized by action kind, plus the JSON factory

mod email_tests;
mod helpers;
mod loop_tests;
