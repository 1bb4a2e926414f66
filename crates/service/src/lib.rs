//! Service layer for the bike shop API.
//! - `store`: document store abstraction and its local / PostgreSQL backends.
//! - `auth`: bearer token issuing, verification and the request gate.
//! - `catalog` / `orders`: one application service per collection.

pub mod errors;
pub mod auth;
pub mod store;
pub mod catalog;
pub mod orders;
#[cfg(test)]
pub mod test_support;
