use annotators::{bootstrap, config, logging};
use anyhow::{Context, Result};
use clap::Parser;
use std::net::Ipv4Addr;
use tokio::net::TcpListener;

#[derive(Parser)]
#[command(name = "annotators", about = "Batch annotation microservice")]
struct Cli {
    /// Service variant to run.
    #[arg(long, env = "ANNOTATOR_SERVICE", value_enum)]
    service: config::ServiceKind,
    /// Port to listen on; defaults to 3000.
    #[arg(long, env = "SERVER_PORT")]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    logging::init_tracing();

    let config = config::init_config(cli.service).context("failed to load configuration")?;
    let app = bootstrap::build_router(config)
        .await
        .context("failed to start annotation service")?;

    let port = cli.port.unwrap_or(config.server_port);
    let listener = TcpListener::bind((Ipv4Addr::UNSPECIFIED, port))
        .await
        .with_context(|| format!("failed to bind port {port}"))?;
    tracing::info!(
        service = config.service.as_str(),
        "Listening on http://0.0.0.0:{}",
        port
    );
    axum::serve(listener, app)
        .await
        .context("server terminated unexpectedly")?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn flags_fall_back_to_environment_variables() {
        let command = Cli::command();
        let env_of = |id: &str| {
            command
                .get_arguments()
                .find(|arg| arg.get_id() == id)
                .and_then(|arg| arg.get_env())
                .and_then(|value| value.to_str())
                .map(str::to_string)
        };
        assert_eq!(env_of("service").as_deref(), Some("ANNOTATOR_SERVICE"));
        assert_eq!(env_of("port").as_deref(), Some("SERVER_PORT"));
    }

    #[test]
    fn port_flag_overrides_configured_port() {
        let cli = Cli::try_parse_from(["annotators", "--service", "dialogrpt", "--port", "8018"])
            .expect("cli");
        assert_eq!(cli.service, config::ServiceKind::Dialogrpt);
        assert_eq!(cli.port, Some(8018));
    }
}
