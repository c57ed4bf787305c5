//! Local output artifacts produced alongside the store writes.

pub mod json;
