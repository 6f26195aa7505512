//! Integration tests of the tree operations.
//!
//! These tests exercise insertion, search, nearest-neighbour and deletion
//! through the public API only.

mod scenario_test;
