//! Request handlers — the handler trait, the method registry, and the
//! `session/*` bindings.

pub mod base;
pub mod registry;
pub mod session;

pub use base::{HandlerError, RequestHandler};
pub use registry::HandlerRegistry;
pub use session::{
    register_session_handlers, OwnerFn, SessionCreateHandler, SessionDeleteHandler,
    SessionResumeHandler,
};
