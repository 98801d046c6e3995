use PhBalance::cli::cli_main::run_cli;
use simplelog::{ColorChoice, Config, LevelFilter, TermLogger, TerminalMode};

pub fn main() {
    // the logger passes everything, the global max level is the filter task settings can change
    let _ = TermLogger::init(
        LevelFilter::Trace,
        Config::default(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    );
    log::set_max_level(LevelFilter::Info);
    let args: Vec<String> = std::env::args().collect();
    if let Err(e) = run_cli(&args) {
        log::error!("{}", e);
        std::process::exit(1);
    }
}
