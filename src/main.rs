use tracing_subscriber::EnvFilter;

use tube::config::Config;
use tube::server::Server;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("tube=info")),
        )
        .with_target(false)
        .with_level(true)
        .init();

    let cfg = Config::load();
    let app = cfg.application()?;

    let server = Server::bind(&cfg.listen_addr, app)?;

    server.run(cfg.strategy())
}
