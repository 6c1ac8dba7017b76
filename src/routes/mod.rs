/// Router Module Index
///
/// Routing is organized into security-segregated modules so access control
/// is applied explicitly at the module level rather than per handler.

/// Routes accessible to all clients (anonymous, read-only, plus the login
/// flow and contact form). Post listings enforce approved-only visibility at
/// the repository level.
pub mod public;

/// Routes protected by the `AuthUser` extractor middleware. Requires a valid
/// bearer credential.
pub mod authenticated;

/// Routes restricted to the administrator role via the `AdminUser`
/// extractor.
pub mod admin;
