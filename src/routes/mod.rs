/// Router Module Index
///
/// Routing is split by required access level so that each group gets its
/// access layer applied once, in `create_router`.

/// Routes accessible without a session (read-only plus registration).
pub mod public;

/// Routes behind the `AuthUser` extractor middleware.
pub mod authenticated;

/// Routes behind the authentication and ADMIN-role middleware.
pub mod admin;
