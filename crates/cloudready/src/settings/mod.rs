//! Locally stored GitHub credentials.

mod check;
mod store;

pub use check::TokenCheck;
pub use store::{FileTokenStore, InMemoryTokenStore, TokenStore, TokenStoreError};
