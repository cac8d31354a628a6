//! api
//!
//! Request handlers for the REST surface, independent of any HTTP server.
//!
//! Each handler validates its raw parameters, calls one [`ConfigStore`]
//! operation, and maps the outcome to a status code and JSON body. Failures
//! always carry an [`ErrorPayload`]. Storage faults are logged and answered
//! with a generic message.
//!
//! [`ConfigStore`]: crate::store::ConfigStore

pub mod handlers;
pub mod models;

pub use handlers::ApiResponse;
pub use models::{
    ErrorPayload, ProjectPayload, ResourcePayload, Resources, StagePayload, Stages, VersionPayload,
};
