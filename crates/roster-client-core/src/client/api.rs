//! Bearer-authenticated endpoint calls, one module per resource

pub mod admin;
pub mod profile;
