//! Tests for the template front end
//!
//! Organized into focused submodules, one per concern.

use super::*;

// Test helper functions
mod helpers;



// Error and edge case tests
mod errors;
