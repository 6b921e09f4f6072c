//! Integration test crate. All tests live under `tests/`.
