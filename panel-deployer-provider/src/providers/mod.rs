//! DNS backend implementations

mod cloudflare;
mod common;
mod direct;

pub use cloudflare::{CF_API_BASE, CloudflareClient};
pub use direct::DirectHttpsBackend;
