// src/services/mod.rs

//! External service clients.

pub mod guardian;

pub use guardian::GuardianClient;
