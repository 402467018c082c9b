//! Client and response shaping for the Azure DevOps work item tracking API.

pub mod auth;
pub mod client;
pub mod config;
pub mod settings;
pub mod shape;
pub mod types;
pub mod wiql;

pub use client::{Client, ClientError};
pub use settings::{ConnectionSettings, Overrides};
