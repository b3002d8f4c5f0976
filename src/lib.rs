//! Workspace-level integration tests for resoscan live under `tests/`.
