// src/lib.rs — Library root for Luna

pub mod cli;
pub mod infra;
pub mod net;
pub mod plugins;
pub mod shell;
