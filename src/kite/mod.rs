//! Kite Connect login: browser-driven credential + TOTP flow and the
//! request-token to access-token exchange.

pub mod endpoints;
pub mod login;
pub mod totp;
