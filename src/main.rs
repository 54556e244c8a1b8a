use kube_routes::ctx;

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let mut ctx = ctx::Context::new().await?;
    tracing_subscriber::fmt().with_max_level(ctx.args.log_level).init();
    tracing::info!("Starting kube-routes translator");
    tracing::info!("CLI arguments: {:?}", ctx.args);

    let mut interval = tokio::time::interval(std::time::Duration::from_secs(ctx.args.poll_interval_seconds));

    tracing::info!("Performing initial load");
    match ctx.facade.load_all().await {
        Ok(routes) => {
            tracing::info!("Loaded {} routes", routes.len());
            for route in &routes {
                tracing::debug!("{}", route.to_dsl());
            }
        }
        Err(err) => tracing::error!("initial load failed: {err}"),
    }

    loop {
        interval.tick().await;
        match ctx.facade.load_update().await {
            Ok((upserts, deleted)) => {
                if upserts.is_empty() && deleted.is_empty() {
                    tracing::debug!("poll: no changes");
                    continue;
                }
                tracing::info!("poll: {} upserts, {} deletions", upserts.len(), deleted.len());
                for route in &upserts {
                    tracing::debug!("upsert {}", route.to_dsl());
                }
                for id in &deleted {
                    tracing::debug!("delete {id}");
                }
            }
            Err(err) => {
                tracing::error!("poll failed, retaining previous routes: {err}");
            }
        }
    }
}
