use std::io;
use std::net::IpAddr;
use std::path::PathBuf;

use clap::Parser;
use mockhttp_server::{AlwaysOk, FileServer, MockServer, ServerConfig};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Run the mock HTTP/1.0 server until standard input is closed.
#[derive(Debug, Parser)]
#[command(name = "mockhttp-server", version)]
struct Args {
    /// TOML file with server settings; environment variables are used otherwise.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Address to bind.
    #[arg(long)]
    host: Option<IpAddr>,

    /// Port to bind; 0 picks a free port.
    #[arg(long, env = "PORT")]
    port: Option<u16>,

    /// Serve files from this directory instead of answering 200 OK.
    #[arg(long)]
    root: Option<PathBuf>,

    /// Log level used when RUST_LOG is not set.
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Print the captured exchanges as JSON on exit.
    #[arg(long)]
    dump: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!("mockhttp_server={0},mockhttp_core={0}", args.log_level).into()
            }),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let mut config = match &args.config {
        Some(path) => ServerConfig::from_toml_file(path)?,
        None => ServerConfig::from_env()?,
    };
    if let Some(host) = args.host {
        config = config.with_host(host);
    }
    if let Some(port) = args.port {
        config = config.with_port(port);
    }

    let mut server = MockServer::with_config(config);
    match &args.root {
        Some(root) => {
            let files = FileServer::new(root.clone())?;
            tracing::info!(root = %files.root().display(), "serving files");
            server.set_handler(files);
        }
        None => server.set_handler(AlwaysOk),
    }
    server.start()?;

    if let Some(addr) = server.local_addr() {
        println!("listening on http://{addr}");
    }

    io::copy(&mut io::stdin().lock(), &mut io::sink())?;
    server.stop();

    if args.dump {
        println!("{}", serde_json::to_string_pretty(&server.exchanges())?);
    }
    Ok(())
}
