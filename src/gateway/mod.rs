//! Gateway module - Request validation and upstream dispatch

pub mod request;
pub mod service;

pub use request::{merge_input, Action, GatewayRequest, InputMap};
pub use service::{GatewayResponse, GatewayService};
