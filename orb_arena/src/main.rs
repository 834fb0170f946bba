#[tokio::main]
async fn main() -> std::io::Result<()> {
    orb_arena::frameworks::server::run_with_config().await
}
