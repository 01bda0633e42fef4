#[tokio::main]
async fn main() -> anyhow::Result<()> {
    vai_companion_lib::run().await
}
