use anyhow::Result;

#[tokio::main]
async fn main() -> Result<()> {
    blockbot_server::run().await
}
