#![forbid(unsafe_code)]

//! Client for a personal notes API.
//!
//! - [`http::ApiClient`]: base address, timeout, JSON verbs, error mapping
//! - [`session::SessionStore`]: the bearer token, optionally persisted
//! - [`auth`] and [`notes`]: one function per remote operation
//! - [`view`]: list and editor page logic driven by the above

pub mod auth;
pub mod config;
pub mod error;
pub mod http;
pub mod notes;
pub mod session;
pub mod view;

pub use error::ClientError;
pub use http::{with_auth_headers, ApiClient, RequestOptions};
pub use notes::{NewNote, Note, NotePatch, Notes};
pub use session::SessionStore;
