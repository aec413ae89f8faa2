pub mod push;
pub mod services;
