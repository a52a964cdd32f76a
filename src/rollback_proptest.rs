//! Property-based tests for rollback target resolution, down plans and
//! compiler parsing.
