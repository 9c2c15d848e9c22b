pub mod preferences;
pub mod route;
pub mod session;
pub mod sign_in;
