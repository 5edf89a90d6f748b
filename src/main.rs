mod app;
mod config;
mod input;
mod logging;
mod render;

use anyhow::Result;
use clap::Parser;

fn main() -> Result<()> {
    let args = config::Args::parse();
    app::run(args)
}
