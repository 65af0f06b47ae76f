//! TLS fingerprint selection.
//!
//! The engine performs the handshake; this crate only names the profile.

pub mod profiles;

pub use profiles::ClientProfile;
