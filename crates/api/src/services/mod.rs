//! Business services shared by handlers and the CLI.

pub mod token;

pub use token::{Claims, TokenError, TokenService};
