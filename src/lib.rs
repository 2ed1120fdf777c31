//! Library crate for songchain-back, exposing modules for the binary and
//! integration tests.

pub mod config;
pub mod dto;
pub mod error;
pub mod gateway;
pub mod routes;
pub mod services;
pub mod state;
