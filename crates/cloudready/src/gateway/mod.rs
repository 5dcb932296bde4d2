//! Proxy routes in front of the analysis backend.
//!
//! Each route relays the backend's JSON body on success and maps failures
//! into the envelope its callers expect (`{message}`, `{detail}`,
//! `{error, details}` or `{valid, message}`).

mod envelope;
mod router;

#[cfg(test)]
mod tests;

pub use router::gateway_router;
