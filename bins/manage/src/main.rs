use server::ServiceVariant;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    server::run(ServiceVariant::Manage).await
}
