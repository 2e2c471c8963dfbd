pub mod client;
pub mod scheduler;

pub use client::*;
pub use scheduler::*;
