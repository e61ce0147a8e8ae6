//! Shared building blocks for safenet: the configuration model and loader,
//! configuration errors and address range helpers.

pub mod config;
pub mod error;
pub mod network;
