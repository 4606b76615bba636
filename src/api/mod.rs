//! HTTP surface - Router and handlers

pub mod handlers;
pub mod routes;
