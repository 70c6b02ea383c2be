//! Data Transfer Objects for REST request/response serialization.
//!
//! All field names are camelCase on the wire.

pub mod common_dto;
pub mod like_dto;
pub mod match_dto;
pub mod message_dto;

pub use common_dto::*;
pub use like_dto::*;
pub use match_dto::*;
pub use message_dto::*;
