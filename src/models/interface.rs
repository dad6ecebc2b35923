use serde::{Serialize, Deserialize};
use std::fmt;
use std::net::IpAddr;

/// A network interface available for live capture
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InterfaceInfo {
    /// Device system name (used for capture operations)
    pub device_name: String,

    /// Interface description
    pub description: Option<String>,

    /// IPv4 address (if available)
    pub ipv4_address: Option<String>,

    /// MAC address (if available)
    pub mac_address: Option<String>,

    /// Whether this is a loopback interface
    pub is_loopback: bool,

    /// Whether this interface is up/active
    pub is_up: bool,
}

impl From<pnet_datalink::NetworkInterface> for InterfaceInfo {
    fn from(iface: pnet_datalink::NetworkInterface) -> Self {
        let ipv4_address = iface.ips.iter().find_map(|ip| match ip.ip() {
            IpAddr::V4(v4) => Some(v4.to_string()),
            IpAddr::V6(_) => None,
        });

        Self {
            description: if iface.description.is_empty() { None } else { Some(iface.description.clone()) },
            ipv4_address,
            mac_address: iface.mac.map(|mac| mac.to_string()),
            is_loopback: iface.is_loopback(),
            is_up: iface.is_up(),
            device_name: iface.name,
        }
    }
}

impl fmt::Display for InterfaceInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:<16}", self.device_name)?;
        write!(f, " {:<15}", self.ipv4_address.as_deref().unwrap_or("-"))?;
        write!(f, " {:<17}", self.mac_address.as_deref().unwrap_or("-"))?;
        write!(f, " {}", if self.is_up { "up" } else { "down" })?;
        if self.is_loopback {
            write!(f, " loopback")?;
        }
        if let Some(desc) = &self.description {
            write!(f, " ({})", desc)?;
        }
        Ok(())
    }
}

/// List interfaces visible to the capture layer
pub fn list_interfaces() -> Vec<InterfaceInfo> {
    pnet_datalink::interfaces()
        .into_iter()
        .map(InterfaceInfo::from)
        .collect()
}
