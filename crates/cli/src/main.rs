use clap::Parser;
use dns_proxy_api::{AppState, HostnameUseCases};
use dns_proxy_application::ports::HostDnsConfigurator;
use dns_proxy_application::services::{ContainerWatcher, ServiceLifecycle, SubsystemFuture};
use dns_proxy_domain::{CliOverrides, Config, ExitStatus, StartupFailure, Subsystem};
use dns_proxy_infrastructure::container::DockerEventSource;
use dns_proxy_infrastructure::system::{ResolvConfConfigurator, UnmanagedHostDns};
use std::net::{IpAddr, SocketAddr};
use std::process::ExitCode;
use std::sync::Arc;
use tokio::sync::oneshot;
use tracing::{error, info, warn};

mod bootstrap;
mod di;
mod profiling;
mod server;
mod signals;

#[derive(Parser)]
#[command(name = "dns-proxy")]
#[command(version)]
#[command(about = "DNS proxy resolving container names, local hostnames and upstream queries")]
struct Cli {
    /// Configuration file path
    #[arg(short = 'c', long, value_name = "FILE")]
    config: Option<String>,

    /// DNS server port
    #[arg(short = 'd', long)]
    dns_port: Option<u16>,

    /// Web server port
    #[arg(short = 'w', long)]
    web_port: Option<u16>,

    /// Bind address
    #[arg(short = 'b', long)]
    bind: Option<String>,

    /// Transaction signature key as name:base64secret
    #[arg(long, value_name = "NAME:SECRET")]
    tsig: Option<String>,

    /// Compress names in answers
    #[arg(long)]
    compress: bool,

    /// Leave the host resolver configuration alone
    #[arg(long)]
    no_resolv_conf: bool,

    /// Do not watch the container runtime
    #[arg(long)]
    no_docker: bool,

    /// Hostname store file
    #[arg(long, value_name = "FILE")]
    hostnames: Option<String>,

    /// Write a CPU flamegraph to this file on exit
    #[arg(long, value_name = "FILE")]
    cpu_profile: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long)]
    log_level: Option<String>,

    /// Log to this file instead of stdout
    #[arg(long, value_name = "FILE")]
    log_file: Option<String>,
}

impl Cli {
    fn overrides(&self) -> CliOverrides {
        CliOverrides {
            dns_port: self.dns_port,
            web_port: self.web_port,
            bind_address: self.bind.clone(),
            tsig: self.tsig.clone(),
            compress: self.compress.then_some(true),
            resolv_conf_enabled: self.no_resolv_conf.then_some(false),
            docker_enabled: self.no_docker.then_some(false),
            hostnames_path: self.hostnames.clone(),
            log_level: self.log_level.clone(),
            log_file: self.log_file.clone(),
            cpu_profile: self.cpu_profile.clone(),
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match bootstrap::load_config(cli.config.as_deref(), cli.overrides()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("dns-proxy: {:#}", e);
            return exit(ExitStatus::StartupFailure);
        }
    };

    if let Err(e) = bootstrap::init_logging(&config.logging) {
        eprintln!("dns-proxy: {:#}", e);
        return exit(ExitStatus::StartupFailure);
    }
    bootstrap::install_panic_hook();

    info!(version = env!("CARGO_PKG_VERSION"), "Starting dns-proxy");

    let profile = match config.logging.cpu_profile.as_deref() {
        Some(path) => match profiling::CpuProfile::start(path) {
            Ok(profile) => Some(profile),
            Err(e) => {
                error!(error = %e, "Startup failed");
                return exit(ExitStatus::StartupFailure);
            }
        },
        None => None,
    };

    let status = match run(&config).await {
        Ok(status) => status,
        Err(e) => {
            error!(error = %format!("{:#}", e), "Startup failed");
            ExitStatus::StartupFailure
        }
    };

    if let Some(profile) = profile {
        profile.finish();
    }
    exit(status)
}

fn exit(status: ExitStatus) -> ExitCode {
    ExitCode::from(status.code())
}

async fn run(config: &Config) -> anyhow::Result<ExitStatus> {
    // Validated by bootstrap::load_config.
    let bind_ip: IpAddr = config.server.bind_address.parse()?;
    let dns_addr = SocketAddr::new(bind_ip, config.server.dns_port);
    let web_addr = SocketAddr::new(bind_ip, config.server.web_port);

    let repos = di::Repositories::new(config).await?;
    let dns = di::DnsServices::new(config, &repos)?;

    let host_dns: Arc<dyn HostDnsConfigurator> = if config.resolv_conf.enabled {
        Arc::new(ResolvConfConfigurator::new(
            &config.resolv_conf.path,
            &config.resolv_conf.nameserver,
        ))
    } else {
        info!("Host resolver management disabled");
        Arc::new(UnmanagedHostDns::new(&config.resolv_conf.path))
    };
    let lifecycle = Arc::new(ServiceLifecycle::new(host_dns));

    let app_state = AppState {
        hostnames: Arc::new(HostnameUseCases::new(repos.hostnames.clone())),
        containers: repos.containers.clone(),
        lifecycle: lifecycle.clone(),
    };

    let (routes_tx, routes_rx) = oneshot::channel();
    let mut subsystems: Vec<(Subsystem, SubsystemFuture)> = Vec::with_capacity(5);

    if config.docker.enabled {
        let source = DockerEventSource::new(&config.docker.binary, config.docker.domain.clone());
        let watcher = ContainerWatcher::new(source, repos.containers.clone());
        subsystems.push((
            Subsystem::ContainerWatcher,
            Box::pin(async move {
                watcher.run().await.map(|_| ()).map_err(|e| {
                    warn!(error = %e, "Container names will not resolve");
                    StartupFailure::new(Subsystem::ContainerWatcher, e.to_string())
                })
            }),
        ));
    }
    subsystems.push((
        Subsystem::TcpListener,
        server::tcp_listener_task(dns_addr, dns.handler.clone()),
    ));
    subsystems.push((
        Subsystem::UdpListener,
        server::udp_listener_task(dns_addr, dns.handler.clone()),
    ));
    subsystems.push((
        Subsystem::WebServer,
        server::web_server_task(web_addr, routes_rx),
    ));
    subsystems.push((
        Subsystem::HostDnsOverride,
        server::route_mapping_task(app_state, routes_tx, lifecycle.clone()),
    ));

    let trigger = lifecycle
        .run(subsystems, signals::wait_for_termination())
        .await;

    let status = trigger.exit_status();
    info!(trigger = %trigger, exit_code = status.code(), "Server shutdown complete");
    Ok(status)
}
