//! Wire types and field rules shared by the Koders List client and server.

pub mod domain;
pub mod error;
pub mod protocol;
pub mod validation;
