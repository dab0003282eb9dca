use dns_proxy_domain::ContainerInfo;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct ContainerResponse {
    pub id: String,
    pub name: String,
    pub hostnames: Vec<String>,
    pub addresses: Vec<String>,
}

impl From<ContainerInfo> for ContainerResponse {
    fn from(info: ContainerInfo) -> Self {
        Self {
            id: info.id,
            name: info.name,
            hostnames: info.hostnames,
            addresses: info.addresses.iter().map(|ip| ip.to_string()).collect(),
        }
    }
}
