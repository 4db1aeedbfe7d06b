//! Cross-crate integration tests for logweave. See `tests/`.
