mod common;
mod gray;
mod image;
mod payload;
mod pipeline;
mod storage;
mod tiling;

pub mod config;
pub mod prelude;
pub mod server;

pub use prelude::*;
