//! Unit tests for the pipeline controller: caches, forwarding, and the
//! fetch-path fault handling.
