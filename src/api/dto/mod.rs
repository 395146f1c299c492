//! Data Transfer Objects for the internal producer API.

pub mod notify_dto;

pub use notify_dto::*;
