/// Router Module Index
///
/// Routes are split by the access level they require. Each module's router is
/// wrapped in its own middleware in `create_router`, so an endpoint can only
/// be exposed with the protection of the module it is declared in.

/// Routes open to anonymous clients: health and the token endpoints.
pub mod public;

/// Routes behind the authentication middleware. Reads only need a valid
/// access token; mutations additionally pass the admin policy in-handler.
pub mod authenticated;

/// Routes behind the admin middleware (user management).
pub mod admin;
