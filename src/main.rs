use crate::cli::run;

pub mod cli;
mod config;
pub mod cover;
pub mod domain;
pub mod http;
mod logging;
pub mod pipeline;
pub mod resolver;
pub mod tagging;
#[cfg(test)]
mod testing;
pub mod transcode;

fn main() -> anyhow::Result<()> {
    run()
}
