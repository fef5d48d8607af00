pub mod down;
pub mod env;
pub mod restart;
pub mod scale;
pub mod service;
pub mod status;
pub mod up;
pub mod validate;
