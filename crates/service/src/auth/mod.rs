//! Bearer token auth: claims, signing/verification, and the request gate.
//!
//! Everything here is framework independent; the HTTP layer only feeds the
//! `Authorization` header into [`gate::authenticate`].

pub mod claims;
pub mod errors;
pub mod gate;
pub mod token;

pub use claims::Claims;
pub use gate::{authenticate, AuthRejection};
pub use token::TokenService;
