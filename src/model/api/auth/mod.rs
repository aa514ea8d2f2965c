mod token;
mod viewer;

pub use token::AUTH_TOKEN_COOKIE;
pub use viewer::{Role, Viewer};
