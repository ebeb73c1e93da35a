//! Department activity tracking: tasks scoped to setores, one-time-code
//! authentication, and an admin-gated completion-approval workflow.

pub mod auth;
pub mod cli;
pub mod db;
pub mod error;
pub mod filter;
pub mod models;
pub mod output;
pub mod seq_id;
pub mod workflow;
