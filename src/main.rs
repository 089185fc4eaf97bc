use anyhow::Result;

#[tokio::main]
async fn main() -> Result<()> {
    deskpilot_cli::cli::run().await
}
