//! Process logger setup
//!
//! `RUST_LOG` wins over the verbosity flag. Chromiumoxide's connection
//! chatter is silenced below `-vvv`.

use anyhow::Context;
use log::LevelFilter;

#[must_use]
pub fn level_for(verbosity: u8) -> LevelFilter {
    match verbosity {
        0 => LevelFilter::Info,
        1 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    }
}

pub fn init(verbosity: u8) -> anyhow::Result<()> {
    let level = level_for(verbosity);
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level.as_str()));
    if verbosity < 3 {
        builder
            .filter_module("chromiumoxide::handler", LevelFilter::Off)
            .filter_module("chromiumoxide::conn", LevelFilter::Off);
    }
    builder.try_init().context("init logger")
}
