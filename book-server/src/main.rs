use book_server::run_server;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let settings = book_server::init()?;

    run_server(settings).await
}
