use jobboard::prelude::Result;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    jobboard::cmd::run().await?;
    Ok(())
}
