//! Base types and error handling.
//!
//! Provides the crate-wide error taxonomy ([`NetError`]) that every
//! component reports through and that the boundary layer flattens into
//! `status: 0` responses.

pub mod neterror;

pub use neterror::NetError;
