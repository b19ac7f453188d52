//! Process-level helpers for the server binary.

mod listener;
mod sig_down;

pub use listener::bind_with_fallback;
pub use sig_down::SigDown;
