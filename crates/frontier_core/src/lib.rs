pub mod config;
pub mod cors;
pub mod error;
pub mod fingerprint;
pub mod keys;
pub mod manifest;
pub mod traits;
pub mod url;

pub mod prelude {
    pub use super::config::*;
    pub use super::cors::*;
    pub use super::error::*;
    pub use super::fingerprint::*;
    pub use super::keys::*;
    pub use super::manifest::*;
    pub use super::traits::*;
    pub use super::url::*;
}
