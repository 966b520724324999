use std::{env, io::Write, path::Path, process};

use modlog::{LogLevel, LoggerConfig, log::global};

fn main() {
    // --- Parse CLI args ----------------------------------------------------
    //
    // Supported:
    //   cargo run --bin modlog_demo
    //      -> console logger at Trace, program name as module
    //
    //   cargo run --bin modlog_demo -- modlog.toml
    //      -> logger described by the TOML file
    let args: Vec<String> = env::args().collect();

    match args.len() {
        1 => {}
        2 => match LoggerConfig::load(Path::new(&args[1])).and_then(|cfg| cfg.build()) {
            Ok(logger) => {
                global::set_default(logger);
            }
            Err(e) => {
                eprintln!("[modlog_demo] {}: {e}", args[1]);
                process::exit(2);
            }
        },
        _ => {
            eprintln!("Usage:");
            eprintln!("  {}            # console logger", args[0]);
            eprintln!("  {} [CONFIG]   # logger from a TOML file", args[0]);
            process::exit(1);
        }
    }

    // --- Log a few lines -----------------------------------------------------
    modlog::log_trace!("demo starting, pid {}", process::id());
    modlog::log_debug!("args: {:?}", &args[1..]);
    modlog::log_info!("default level is {:?}", global::default_logger().level());

    global::set_level(LogLevel::Warn);
    global::info("filtered out");
    modlog::log_warn!("threshold raised to {}", LogLevel::Warn);
    modlog::log_error!("errors always pass");

    let logger = global::default_logger();
    if let Err(e) = (&*logger).write_all(b"raw bytes through io::Write") {
        eprintln!("[modlog_demo] write failed: {e}");
    }

    if let Err(e) = global::close() {
        eprintln!("[modlog_demo] close failed: {e}");
    }
}
