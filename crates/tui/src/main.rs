mod app;
mod config;
mod error;
mod logging;
mod poller;
mod ui;

use crate::error::Result;

#[tokio::main]
async fn main() -> Result<()> {
    let config = config::load()?;
    logging::init(&config)?;
    let mut app = app::App::new(config)?;
    app.run().await?;
    Ok(())
}
