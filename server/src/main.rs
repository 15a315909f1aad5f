use anyhow::Result;
use axum::Router;
use clap::Parser;
use searcher::ParamArgs;
use server::build_app;
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
struct Args {
    /// Index directory path
    #[arg(long, default_value = "./index")]
    index: String,
    /// Host to bind
    #[arg(long, default_value = "0.0.0.0")]
    host: String,
    /// Port to bind
    #[arg(long, default_value_t = 8080)]
    port: u16,
    #[command(flatten)]
    params: ParamArgs,
}

#[tokio::main]
async fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let args = Args::parse();
    let model = args.params.resolve()?.validate()?;
    let app: Router = build_app(args.index.clone(), model)?;

    let addr: SocketAddr = format!("{}:{}", args.host, args.port).parse()?;
    let listener = TcpListener::bind(addr).await?;
    tracing::info!(%addr, "server listening");
    axum::serve(listener, app).await?;
    Ok(())
}
