//! HTTP middleware stack for the storefront.
//!
//! # Middleware Order (outermost first)
//!
//! 1. Sentry layers (capture errors, transactions)
//! 2. `TraceLayer` (request span with a `request_id` field)
//! 3. Request ID (fill the span field, echo `x-request-id`)
//! 4. Security headers (CSP, frame options, etc.)
//! 5. Session lock (one request per session at a time)
//! 6. Session layer (tower-sessions with `PostgreSQL` store)
//! 7. Rate limiting on login and registration (governor)

pub mod auth;
pub mod context;
pub mod rate_limit;
pub mod request_id;
pub mod security_headers;
pub mod session;

pub use auth::{
    OptionalAuth, RequireAuth, RequireStaff, clear_current_user, current_user, safe_next,
    set_current_user,
};
pub use context::PageContext;
pub use rate_limit::auth_rate_limiter;
pub use request_id::request_id_middleware;
pub use security_headers::security_headers_middleware;
pub use session::{SessionLocks, create_session_layer, session_lock_middleware};
