pub mod autologin;
pub mod token_store;
