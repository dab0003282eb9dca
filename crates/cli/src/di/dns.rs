use super::Repositories;
use anyhow::Context;
use dns_proxy_application::use_cases::{QueryDispatcher, SolverChain};
use dns_proxy_domain::Config;
use dns_proxy_infrastructure::dns::{
    ContainerSolver, DnsServerHandler, LocalSolver, TsigSigner, UpstreamSolver,
};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

pub struct DnsServices {
    pub handler: Arc<DnsServerHandler>,
}

impl DnsServices {
    pub fn new(config: &Config, repos: &Repositories) -> anyhow::Result<Self> {
        let upstreams = config.dns.upstream_addrs()?;
        let timeout = Duration::from_millis(config.dns.query_timeout_ms);

        let chain = Arc::new(SolverChain::new(
            Arc::new(ContainerSolver::new(repos.containers.clone())),
            Arc::new(LocalSolver::new(repos.hostnames.clone())),
            Arc::new(UpstreamSolver::new(upstreams.clone(), timeout)),
        ));
        info!(
            order = ?chain.order(),
            upstreams = ?upstreams,
            timeout_ms = config.dns.query_timeout_ms,
            "Solver chain ready"
        );

        let tsig = match config.dns.tsig_key().context("Invalid TSIG configuration")? {
            Some(key) => {
                info!(key_name = %key.name, "TSIG enabled");
                Some(TsigSigner::new(&key).context("Invalid TSIG key")?)
            }
            None => None,
        };

        let dispatcher = Arc::new(QueryDispatcher::new(chain, config.dns.compress));
        let handler = Arc::new(DnsServerHandler::new(dispatcher, tsig));

        Ok(Self { handler })
    }
}
