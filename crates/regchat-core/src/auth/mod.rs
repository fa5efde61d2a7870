//! Authentication against the external identity provider.

mod identity;
mod token;

pub use identity::{
    AuthorizeRequest, IdentityProvider, LOGIN_CALLBACK_PATH, SIGNOUT_CALLBACK_PATH,
    parse_callback,
};
pub use token::{IdToken, TokenClaims, require_valid};
