//! End-to-end tests against a deployed stack live in `tests/`. They are ignored by default.
