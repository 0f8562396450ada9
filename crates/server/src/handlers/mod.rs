/// Company signup and authentication routes.
pub(crate) mod auth;

/// Public contract signing and verification routes.
pub(crate) mod contracts;

/// Company-scoped contract management routes.
pub(crate) mod admin;

/// Platform-wide management routes.
pub(crate) mod super_admin;
