//! Cross-module tests for the editor core.
//!
//! These tests drive reconciliation and interaction together and check the
//! properties that must hold across any sequence of external updates and
//! user input.
