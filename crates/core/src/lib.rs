//! Core business logic for yatube.
//!
//! Services sit between the HTTP layer and the repositories: they resolve
//! slugs and usernames, enforce authorship and validate form input.

pub mod services;

pub use services::*;
