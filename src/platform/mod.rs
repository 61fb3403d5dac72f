//! Platform abstraction layer
//!
//! Hardware access is isolated here: the rest of the crate sees only the
//! traits and error types. The `pico2_w` feature brings in the real board
//! support; tests and host builds use the mock implementations.

pub mod error;
pub mod traits;

#[cfg(any(test, feature = "mock"))]
pub mod mock;

#[cfg(feature = "pico2_w")]
pub mod rp2350;

pub use error::{PlatformError, Result};
pub use traits::FlashInterface;
