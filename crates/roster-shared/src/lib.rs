//! Types shared between the account service and its clients

#![warn(unused_crate_dependencies)]

#[cfg(target_arch = "wasm32")]
mod suppress_wasm_warnings {
    // Only the native-only telemetry module exercises tracing directly
    use tracing as _;
}

pub mod const_config;
pub mod errors;
pub mod id;
mod macros;
pub mod req_args;
pub mod session;
pub mod token;
pub mod uac;

#[cfg(not(target_arch = "wasm32"))]
pub mod telemetry;
