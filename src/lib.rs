#![doc = "The `todovault` library crate."]
#![doc = ""]
#![doc = "This crate contains the domain models, the authentication and authorization"]
#![doc = "machinery (password hashing, token issuance and revocation, request guarding),"]
#![doc = "the user directory, routing configuration, and error handling for the"]
#![doc = "TodoVault service. The binary (`main.rs`) wires these pieces together."]

pub mod auth;
pub mod config;
pub mod directory;
pub mod error;
pub mod models;
pub mod routes;
