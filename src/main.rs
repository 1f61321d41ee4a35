// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::Result;
use log::debug;
use std::path::PathBuf;

use homescope::{cli, commands, db};

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = cli::build_cli();
    let matches = cli.get_matches();

    let path = db::db_path(matches.get_one::<PathBuf>("db").map(PathBuf::as_path))?;
    debug!("using database {}", path.display());
    let conn = db::open_or_init(&path)?;

    match matches.subcommand() {
        Some(("init", _)) => {
            println!("Database initialized at {}", path.display());
        }
        Some(("calc", sub)) => commands::calculator::handle(&conn, sub)?,
        Some(("property", sub)) => commands::properties::handle(&conn, sub)?,
        Some(("map", sub)) => commands::map::handle(&conn, sub)?,
        _ => {
            cli::build_cli().print_help()?;
            println!();
        }
    }
    Ok(())
}
