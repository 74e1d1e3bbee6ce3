//! Stores the session and access-control functionality that should be shared
//! between different clients
//! NB: The assumption is made that the async runtime has already been started
//! before any functions from this library are called

#![warn(unused_crate_dependencies)]

#[cfg(test)] // Included to prevent unused crate warning
mod warning_suppress {
    use wasm_bindgen_test as _;
}

mod client;
pub mod flow;

pub use client::{
    api::admin::AdminAction,
    storage::{MemoryTokenStore, TokenStore},
    Client, LoginOutcome, SignupOutcome, UiCallBack, DUMMY_ARGUMENT,
};

#[cfg(target_arch = "wasm32")]
pub use client::storage::WebStorageTokenStore;
