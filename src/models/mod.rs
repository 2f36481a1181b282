//! Data models for the family points application.

mod member;

pub use member::*;
