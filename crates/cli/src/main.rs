use clap::Parser;
use fleet_agent_api::{create_api_routes, AppState};
use fleet_agent_application::registry::CollectorRegistry;
use fleet_agent_application::use_cases::{
    DnsOptimizer, DomainTarget, KeepaliveResponder, TaskReconciler, TimeGridExecutor,
};
use fleet_agent_domain::{AgentConfig, CliOverrides, NodeInfo, ServerAddress, SharedNodeOverrides, SharedServerAddress};
use fleet_agent_infrastructure::dns_optimizer::{DefaultProbeEngine, InMemoryIpPool, UdpDnsFanout};
use fleet_agent_infrastructure::http::{HttpStatusReporter, HttpTaskConfigClient, IpPinnedHttpClient};
use fleet_agent_jobs::{DnsRefreshJob, HeartbeatJob, PeriodicDriver, ReconcileExecuteJob};
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

#[derive(Parser)]
#[command(name = "fleet-agent")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Distributed data-collection agent")]
struct Cli {
    /// Configuration file path
    #[arg(short = 'c', long, value_name = "FILE")]
    config: Option<String>,

    /// Override this node's ID
    #[arg(long)]
    node_id: Option<String>,

    /// Address the events HTTP server binds to
    #[arg(long)]
    events_bind: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long)]
    log_level: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let overrides = CliOverrides {
        node_id: cli.node_id.clone(),
        events_bind: cli.events_bind.clone(),
        log_level: cli.log_level.clone(),
    };

    let config = AgentConfig::load(cli.config.as_deref(), overrides)?;
    config.validate()?;

    let log_level = config.logging.level.parse().unwrap_or(tracing::Level::INFO);
    tracing_subscriber::fmt()
        .with_target(true)
        .with_thread_ids(false)
        .with_level(true)
        .with_max_level(log_level)
        .with_ansi(true)
        .init();

    info!(
        version = env!("CARGO_PKG_VERSION"),
        node_id = %config.node.node_id,
        "starting fleet agent"
    );

    let node_info = NodeInfo {
        node_id: config.node.node_id.clone(),
        node_type: config.node.node_type.clone(),
        region: config.node.region.clone(),
        namespace: config.node.namespace.clone(),
        version: config.node.version.clone(),
        capabilities: config.node.capabilities.clone(),
        metadata: HashMap::new(),
    };

    let server_address = Arc::new(SharedServerAddress::new(ServerAddress {
        ip: config.control_plane.ip.clone(),
        port: config.control_plane.port,
    }));
    let node_overrides = Arc::new(SharedNodeOverrides::new());

    // Infrastructure adapters
    let ip_pool: Arc<InMemoryIpPool> = Arc::new(InMemoryIpPool::new());
    let ip_pool_port: Arc<dyn fleet_agent_application::ports::IpPoolPort> = ip_pool.clone();

    let upstream_servers: Vec<SocketAddr> = config
        .dns_optimizer
        .upstream_servers
        .iter()
        .filter_map(|s| match s.parse() {
            Ok(addr) => Some(addr),
            Err(e) => {
                error!(server = %s, error = %e, "skipping unparseable upstream DNS server");
                None
            }
        })
        .collect();
    let fanout = Arc::new(UdpDnsFanout::new(
        upstream_servers,
        Duration::from_millis(config.dns_optimizer.per_server_timeout_ms),
    ));
    let prober = Arc::new(DefaultProbeEngine::new());

    let http_client = Arc::new(IpPinnedHttpClient::new(ip_pool_port.clone()));
    let http_client_port: Arc<dyn fleet_agent_application::ports::HttpClientPort> = http_client.clone();

    let task_config_client = Arc::new(HttpTaskConfigClient::new(server_address.clone()));
    let status_reporter = Arc::new(HttpStatusReporter::new(
        server_address.clone(),
        config.node.node_id.clone(),
        config.status_reporter.max_in_flight,
    ));

    let registry = Arc::new(CollectorRegistry::new());
    fleet_agent_collectors::register_builtin_collectors(&registry, http_client_port)?;

    let reconciler = Arc::new(TaskReconciler::new(
        config.node.node_id.clone(),
        task_config_client,
        registry.clone(),
        status_reporter.clone(),
    ));

    let shutdown = CancellationToken::new();
    let executor = Arc::new(TimeGridExecutor::new(
        reconciler.clone(),
        status_reporter.clone(),
        shutdown.clone(),
    ));

    let domains: Vec<DomainTarget> = config
        .dns_optimizer
        .domains
        .iter()
        .map(|entry| DomainTarget {
            domain: entry.domain.clone(),
            probe: entry.probe.clone(),
        })
        .collect();
    let optimizer = Arc::new(DnsOptimizer::new(fanout, prober, ip_pool_port, domains));

    let keepalive = Arc::new(KeepaliveResponder::new(
        node_info,
        server_address,
        node_overrides,
        registry,
        status_reporter,
    ));

    // Periodic jobs
    let reconcile_execute = ReconcileExecuteJob::new(reconciler.clone(), executor)
        .with_tick_secs(config.control_plane.reconcile_interval_secs);
    let dns_refresh = DnsRefreshJob::new(optimizer).with_refresh_secs(config.dns_optimizer.refresh_interval_secs);
    let heartbeat = HeartbeatJob::new(config.node.node_id.clone(), reconciler);

    let driver = PeriodicDriver::new()
        .with_reconcile_execute(reconcile_execute)
        .with_dns_refresh(dns_refresh)
        .with_heartbeat(heartbeat)
        .with_shutdown_token(shutdown.clone());
    tokio::spawn(driver.start());

    // Events HTTP server
    let app_state = AppState::new(keepalive);
    let app = create_api_routes(app_state);
    let bind_addr: SocketAddr = config.events.bind_address.parse()?;
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    info!(bind_address = %bind_addr, "events server listening");

    let server_shutdown = shutdown.clone();
    tokio::select! {
        result = axum::serve(listener, app) => {
            if let Err(e) = result {
                error!(error = %e, "events server error");
            }
        }
        _ = tokio::signal::ctrl_c() => {
            info!("shutdown signal received");
            server_shutdown.cancel();
        }
    }

    info!("fleet agent shutdown complete");
    Ok(())
}
