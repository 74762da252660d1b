//! Domain services used by the HTTP routes and the session CLI.
//!
//! ARCHITECTURE
//! ============
//! Service modules own the directory and its business rules so route
//! handlers can stay focused on protocol translation and cookie plumbing.

pub mod auth;
