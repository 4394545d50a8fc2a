pub mod backend;
pub mod kite;
