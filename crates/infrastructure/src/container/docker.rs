//! Container discovery through the `docker` command line client.
//!
//! The initial state comes from `docker ps -q` + `docker inspect`; after
//! that `docker events` is followed line by line in JSON format.

use async_trait::async_trait;
use dns_proxy_application::ports::ContainerEventSource;
use dns_proxy_domain::{ContainerEvent, ContainerInfo, DomainError};
use serde::Deserialize;
use std::collections::HashMap;
use std::net::IpAddr;
use std::process::Stdio;
use tokio::io::{AsyncBufReadExt, BufReader, Lines};
use tokio::process::{Child, ChildStdout, Command};
use tracing::{debug, warn};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct InspectedContainer {
    id: String,
    #[serde(default)]
    name: String,
    #[serde(default)]
    config: InspectedConfig,
    #[serde(default)]
    network_settings: InspectedNetworkSettings,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct InspectedConfig {
    #[serde(default)]
    hostname: String,
    #[serde(default)]
    domainname: String,
    #[serde(default)]
    env: Option<Vec<String>>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct InspectedNetworkSettings {
    #[serde(default, rename = "IPAddress")]
    ip_address: String,
    #[serde(default, rename = "GlobalIPv6Address")]
    global_ipv6_address: String,
    #[serde(default)]
    networks: Option<HashMap<String, InspectedNetwork>>,
}

#[derive(Debug, Default, Deserialize)]
struct InspectedNetwork {
    #[serde(default, rename = "IPAddress")]
    ip_address: String,
    #[serde(default, rename = "GlobalIPv6Address")]
    global_ipv6_address: String,
}

/// One line of `docker events --format '{{json .}}'`.
#[derive(Debug, Deserialize)]
struct EventLine {
    #[serde(default, rename = "Type")]
    kind: String,
    #[serde(default, rename = "Action")]
    action: String,
    #[serde(default, rename = "Actor")]
    actor: Option<EventActor>,
    #[serde(default)]
    id: String,
}

#[derive(Debug, Deserialize)]
struct EventActor {
    #[serde(default, rename = "ID")]
    id: String,
}

pub struct DockerEventSource {
    binary: String,
    domain: Option<String>,
    events: Option<(Child, Lines<BufReader<ChildStdout>>)>,
}

impl DockerEventSource {
    /// `domain`, when set, registers `<name>.<domain>` next to the bare
    /// container name.
    pub fn new(binary: impl Into<String>, domain: Option<String>) -> Self {
        Self {
            binary: binary.into(),
            domain: domain.filter(|d| !d.trim_matches('.').is_empty()),
            events: None,
        }
    }

    async fn run(&self, args: &[&str]) -> Result<Vec<u8>, DomainError> {
        let output = Command::new(&self.binary)
            .args(args)
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|e| {
                DomainError::ContainerRuntime(format!("Failed to run {}: {}", self.binary, e))
            })?;

        if !output.status.success() {
            return Err(DomainError::ContainerRuntime(format!(
                "{} {} exited with {}: {}",
                self.binary,
                args.first().copied().unwrap_or_default(),
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }

        Ok(output.stdout)
    }

    async fn inspect(&self, ids: &[&str]) -> Result<Vec<ContainerInfo>, DomainError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let mut args = vec!["inspect"];
        args.extend_from_slice(ids);
        let stdout = self.run(&args).await?;

        parse_inspect(&stdout, self.domain.as_deref())
    }

    fn follow_events(&mut self) -> Result<(), DomainError> {
        let mut child = Command::new(&self.binary)
            .args([
                "events",
                "--filter",
                "type=container",
                "--format",
                "{{json .}}",
            ])
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                DomainError::ContainerRuntime(format!("Failed to run {}: {}", self.binary, e))
            })?;

        let stdout = child.stdout.take().ok_or_else(|| {
            DomainError::ContainerRuntime("docker events has no stdout".to_string())
        })?;
        self.events = Some((child, BufReader::new(stdout).lines()));
        Ok(())
    }
}

#[async_trait]
impl ContainerEventSource for DockerEventSource {
    async fn snapshot(&mut self) -> Result<Vec<ContainerInfo>, DomainError> {
        // Subscribe first so nothing started during the listing is missed.
        self.follow_events()?;

        let stdout = self.run(&["ps", "-q"]).await?;
        let listing = String::from_utf8_lossy(&stdout);
        let ids: Vec<&str> = listing.split_whitespace().collect();

        self.inspect(&ids).await
    }

    async fn next_event(&mut self) -> Result<Option<ContainerEvent>, DomainError> {
        loop {
            let Some((_, lines)) = self.events.as_mut() else {
                return Ok(None);
            };

            let line = lines.next_line().await.map_err(|e| {
                DomainError::ContainerRuntime(format!("Failed to read docker events: {}", e))
            })?;
            let Some(line) = line else {
                self.events = None;
                return Ok(None);
            };

            let event: EventLine = match serde_json::from_str(&line) {
                Ok(event) => event,
                Err(e) => {
                    warn!(error = %e, "Skipping unparsable docker event");
                    continue;
                }
            };
            if !event.kind.is_empty() && event.kind != "container" {
                continue;
            }

            let id = event
                .actor
                .map(|actor| actor.id)
                .filter(|id| !id.is_empty())
                .unwrap_or(event.id);

            match event.action.as_str() {
                "start" => match self.inspect(&[id.as_str()]).await {
                    Ok(mut containers) if !containers.is_empty() => {
                        return Ok(Some(ContainerEvent::Started(containers.remove(0))));
                    }
                    Ok(_) => debug!(id = %id, "Started container vanished before inspect"),
                    Err(e) => warn!(id = %id, error = %e, "Failed to inspect started container"),
                },
                "die" | "stop" | "kill" | "destroy" => {
                    return Ok(Some(ContainerEvent::Stopped { id }));
                }
                _ => {}
            }
        }
    }
}

fn parse_inspect(stdout: &[u8], domain: Option<&str>) -> Result<Vec<ContainerInfo>, DomainError> {
    let inspected: Vec<InspectedContainer> = serde_json::from_slice(stdout).map_err(|e| {
        DomainError::ContainerRuntime(format!("Unexpected docker inspect output: {}", e))
    })?;

    Ok(inspected
        .into_iter()
        .map(|container| into_container_info(container, domain))
        .collect())
}

/// Hostnames: `Hostname[.Domainname]`, the container name (optionally
/// suffixed with `domain`), and the comma separated `HOSTNAMES` variable.
fn into_container_info(container: InspectedContainer, domain: Option<&str>) -> ContainerInfo {
    let name = container.name.trim_start_matches('/').to_string();
    let mut hostnames = Vec::new();

    let config = &container.config;
    if !config.hostname.is_empty() {
        if config.domainname.is_empty() {
            hostnames.push(config.hostname.clone());
        } else {
            hostnames.push(format!("{}.{}", config.hostname, config.domainname));
        }
    }

    if !name.is_empty() {
        hostnames.push(name.clone());
        if let Some(domain) = domain {
            hostnames.push(format!("{}.{}", name, domain.trim_matches('.')));
        }
    }

    for variable in config.env.iter().flatten() {
        if let Some(list) = variable.strip_prefix("HOSTNAMES=") {
            hostnames.extend(list.split(',').map(str::to_string));
        }
    }

    ContainerInfo::new(
        container.id,
        name,
        hostnames,
        collect_addresses(&container.network_settings),
    )
}

fn collect_addresses(settings: &InspectedNetworkSettings) -> Vec<IpAddr> {
    let mut raw = vec![
        settings.ip_address.as_str(),
        settings.global_ipv6_address.as_str(),
    ];

    let mut networks: Vec<(&String, &InspectedNetwork)> =
        settings.networks.iter().flatten().collect();
    networks.sort_by(|a, b| a.0.cmp(b.0));
    for (_, network) in networks {
        raw.push(network.ip_address.as_str());
        raw.push(network.global_ipv6_address.as_str());
    }

    let mut addresses: Vec<IpAddr> = Vec::new();
    for ip in raw.into_iter().filter_map(|s| s.parse::<IpAddr>().ok()) {
        if !addresses.contains(&ip) {
            addresses.push(ip);
        }
    }
    addresses
}
