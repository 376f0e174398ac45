mod app;
mod ui;

use app::AppConfig;
use clap::Parser;

fn main() {
    let _ = env_logger::builder().format_timestamp(None).try_init();

    let args = AppConfig::parse();
    if let Err(err) = app::run(&args) {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}
