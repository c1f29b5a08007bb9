//! HTTP surface for dexsim
//!
//! JSON routes over the query engine, served with actix-web.

pub mod rest;

pub use rest::{AppState, RestApi};
