//! VoxLink binary entry point.

mod app;
mod clipboard;
mod commands;
mod config;
mod dispatch;
mod history;
mod logging;
mod quick;
mod session;
mod synthesis;
mod transcription;
mod translate;

#[tokio::main]
async fn main() {
    if let Err(e) = app::run().await {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
