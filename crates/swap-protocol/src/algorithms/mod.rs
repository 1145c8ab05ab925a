//! # Algorithms Module
//!
//! Signing digests, signature pre-checks and transition guards.

pub mod authorization;
pub mod state_machine;

pub use authorization::{
    check_signature, release_digest, request_digest, sign_for_release, sign_for_request,
    Authorization,
};
pub use state_machine::{guard_execute, guard_lock, guard_post, guard_release, guard_sweep};
