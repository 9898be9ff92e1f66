pub mod config;
pub mod logging;

pub mod cache;
pub mod decode;
pub mod loader;
pub mod request;
pub mod retry;
pub mod transport;

pub use loader::{DefaultLoader, Loader, Outcome};
pub use request::LoadError;
