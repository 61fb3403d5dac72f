//! Mock platform implementations for host testing

pub mod flash;

pub use flash::MockFlash;
