pub mod dpda;
pub mod error;
pub mod loader;
