//! Library side of the `roster` binary: logging, loading, rendering and the
//! interactive shell.

pub mod logging;
pub mod pagination;
pub mod pipeline;
pub mod render;
pub mod shell;
