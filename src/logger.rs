use std::env as stdenv;
use std::io::Write;
use std::path::Path;

use chrono::Local;
use colored::*;
use env_logger::{Builder, Env};
use log::debug;

use crate::env::load_env_var;
use crate::VERSION;

/// Install the colored `env_logger` formatter. Honors `RUST_LOG`, default `info`.
///
/// With `RUST_LOG=trace` the program tag and timestamp are dropped to keep
/// lines short. Calling it twice is harmless.
pub fn setup_logger() {
    let this_script_name = Path::new(&stdenv::args().next().unwrap_or_default())
        .file_name()
        .unwrap_or_default()
        .to_str()
        .unwrap_or_default()
        .to_owned();
    let terse = load_env_var("RUST_LOG", "info").to_lowercase() == "trace";
    let tag = format!("{}_{}", this_script_name, VERSION);

    let installed = Builder::from_env(Env::default().default_filter_or("info"))
        .format(move |buf, record| {
            let level = match record.level() {
                log::Level::Error => format!("{}", record.level()).red(),
                log::Level::Warn => format!(" {}", record.level()).yellow(),
                log::Level::Info => format!(" {}", record.level()).green(),
                log::Level::Debug => format!("{}", record.level()).blue(),
                log::Level::Trace => format!("{}", record.level()).purple(),
            };
            let file = record.file().unwrap_or("unknown");
            let line = record.line().unwrap_or(0);

            if terse {
                writeln!(buf, "{}:{} {}: {}", file, line, level, record.args())
            } else {
                writeln!(
                    buf,
                    "{}:{} [{} {}]{}: {}",
                    file,
                    line,
                    tag.dimmed().purple(),
                    Local::now().format("%Y%m%d %H:%M:%S").to_string().purple(),
                    level,
                    record.args()
                )
            }
        })
        .try_init();

    if installed.is_ok() {
        debug!("Logger initialized");
    }
}
