//! Cats resource: public reads, owner-scoped writes.

pub mod handlers;
