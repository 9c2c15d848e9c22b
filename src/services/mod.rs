pub mod route_guard;
pub mod session_codec;
pub mod sign_in_service;
