//! Shared helpers for the `ksn_rtree` integration tests and stress run.

pub mod test_util;
