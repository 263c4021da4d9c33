pub mod config;
pub mod engine;
pub mod error;
pub mod geometry;
pub mod math;
pub mod portal;
pub mod session;
pub mod surface;
pub mod sync;
pub mod tessellation;

pub use config::PortalConfig;
pub use engine::PortalEngine;
pub use error::{PortalError, Result};
