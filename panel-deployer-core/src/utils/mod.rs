//! Utility functions

pub mod cancel;
pub mod remote_path;
pub mod shell;
pub mod version;

pub use cancel::CancelFlag;
