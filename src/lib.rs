pub mod app;
pub mod config;
pub mod domain;
pub mod engine;
pub mod events;
pub mod io;
pub mod logging;
pub mod prelude;
pub mod storage;
pub mod streaming;
