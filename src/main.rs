use clap::Parser;

use crate::cli::Cli;
use glb_viewer::run;

mod cli;

fn main() {
    let cli = Cli::parse();
    run(cli.into());
}
