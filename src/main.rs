mod app;
mod audio;
mod catalog;
mod config;
mod error;
mod player;
mod runtime;
mod storage;
mod ui;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    runtime::run()
}
