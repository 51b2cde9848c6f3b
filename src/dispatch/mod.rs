// src/dispatch/mod.rs

//! Command dispatch.
//!
//! - [`core`] holds the [`Dispatcher`]: the registry, the launcher and the
//!   routing from a parsed request to its component. It knows nothing about
//!   stdin/stdout.
//! - [`runtime`] is the IO shell: read a line, hand it to the dispatcher,
//!   write the response, repeat until EOF or a shutdown signal, then tear
//!   every remaining child down.

pub mod core;
pub mod runtime;

pub use core::Dispatcher;
pub use runtime::Runtime;
