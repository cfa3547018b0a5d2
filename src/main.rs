#![allow(clippy::module_inception)]

mod cli;
mod commands;
mod config;
mod error;
mod manager;

use cli::Invocation;

use anyhow::Result;
use log::trace;

fn main() -> Result<()> {
    let invocation = Invocation::parse();

    env_logger::builder()
        .format_timestamp_millis()
        .filter_level(invocation.cli.general.level)
        .parse_env("NANOMERGE_LOG")
        .init();

    trace!("init");
    commands::prepare::run(&invocation)?;
    trace!("done");
    Ok(())
}
