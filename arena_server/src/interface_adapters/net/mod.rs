// Network adapter modules: per-client sockets and the shared outbound fan-out.

pub mod client;
pub mod fanout;

pub use client::ws_handler;
pub use fanout::fanout_task;
