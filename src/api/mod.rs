pub mod backend_api;
pub mod retry;
