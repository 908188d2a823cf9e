//! Brigade: a role-gated task assignment service for venue staff.
//!
//! A supervisor or admin creates and prioritizes tasks for the venue's
//! operational areas and assigns them to workers; the assigned worker drives
//! the task through its lifecycle. Authentication is a signed bearer token,
//! authorization a closed role set checked per endpoint.

pub mod api;
pub mod auth;
pub mod config;
pub mod db;
pub mod task;
pub mod user;
