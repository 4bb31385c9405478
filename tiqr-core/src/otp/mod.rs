//! OTP engine
//!
//! Computes truncated HMAC-based one-time response codes from a shared
//! secret and a challenge-derived moving factor, plus the OCRA suite
//! gate declaring what the provider expects.

pub mod hmac;
pub mod hotp;
pub mod ocra;

pub use hotp::generate_otp;
pub use ocra::OcraSuite;
