#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    auto_proposal_server::run().await
}
