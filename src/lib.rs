// Library target for the integration tests in tests/.
// The binary entry point is main.rs; this file re-declares the module tree so
// tests can drive the quiz through `chapquiz::bank::*` / `chapquiz::quiz::*`.
// Screen code is only reached through the binary, so suppress dead_code warnings.
#![allow(dead_code)]

pub mod bank;
pub mod config;
pub mod quiz;

mod app;
mod event;
mod ui;
