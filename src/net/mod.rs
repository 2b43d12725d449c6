// src/net/mod.rs — Network helpers available to plugin scripts

pub mod http;
