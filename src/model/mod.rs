//! Data model for request chains.
//!
//! - [`RequestMold`] - an authored request, declarative or scripted
//! - [`Profile`] - named substitution variables
//! - [`ResolvedRequest`] - an evaluated request ready to send
//! - [`Response`] - the recorded result of sending one

mod body;
mod headers;
mod mold;
mod profile;
mod request;
mod response;

pub use body::{Body, RequestBody};
pub use headers::Headers;
pub use mold::{DeclarativeRequest, Payload, RequestMold, ScriptDialect, ScriptRequest};
pub use profile::{select_profile, Profile, DEFAULT_PROFILE};
pub use request::{Auth, BasicAuth, Options, ResolvedRequest, TransportOptions};
pub use response::{Response, TransportResponse};
