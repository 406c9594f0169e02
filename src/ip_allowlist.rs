use crate::constants::status;
use std::net::IpAddr;
use thiserror::Error;

/// A single allowlist entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AllowedIp {
    Address(IpAddr),
    /// CIDR block; host bits of `network` are cleared on parse.
    Network { network: IpAddr, prefix_len: u8 },
}

impl AllowedIp {
    pub fn parse(entry: &str) -> Result<Self, IpAllowlistError> {
        let entry = entry.trim();
        let invalid = || IpAllowlistError::InvalidEntry {
            entry: entry.to_owned(),
        };

        let Some((address, prefix)) = entry.split_once('/') else {
            return entry
                .parse::<IpAddr>()
                .map(|address| Self::Address(address.to_canonical()))
                .map_err(|_| invalid());
        };

        let address: IpAddr = address.parse().map_err(|_| invalid())?;
        let prefix_len: u8 = prefix.parse().map_err(|_| invalid())?;
        if prefix_len > max_prefix_len(&address) {
            return Err(invalid());
        }

        Ok(Self::Network {
            network: mask(address, prefix_len),
            prefix_len,
        })
    }

    pub fn contains(&self, ip: IpAddr) -> bool {
        match *self {
            Self::Address(address) => address == ip,
            Self::Network {
                network,
                prefix_len,
            } => {
                std::mem::discriminant(&network) == std::mem::discriminant(&ip)
                    && mask(ip, prefix_len) == network
            }
        }
    }
}

fn max_prefix_len(address: &IpAddr) -> u8 {
    match address {
        IpAddr::V4(_) => 32,
        IpAddr::V6(_) => 128,
    }
}

fn mask(address: IpAddr, prefix_len: u8) -> IpAddr {
    match address {
        IpAddr::V4(v4) => {
            let bits = u32::from(v4);
            let mask = u32::MAX.checked_shl(32 - u32::from(prefix_len)).unwrap_or(0);
            IpAddr::V4((bits & mask).into())
        }
        IpAddr::V6(v6) => {
            let bits = u128::from(v6);
            let mask = u128::MAX.checked_shl(128 - u32::from(prefix_len)).unwrap_or(0);
            IpAddr::V6((bits & mask).into())
        }
    }
}

/// Outcome of an allowlist check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IpDecision {
    Allowed,
    /// Abort the request with `status`.
    Forbidden { status: u16 },
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum IpAllowlistError {
    #[error("`{entry}` is neither an IP address nor a CIDR block")]
    InvalidEntry { entry: String },
}

/// Client IP allowlist of single addresses and CIDR blocks.
#[derive(Debug, Clone, Default)]
pub struct IpAllowlist {
    entries: Vec<AllowedIp>,
}

impl IpAllowlist {
    pub fn new<I, S>(entries: I) -> Result<Self, IpAllowlistError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let entries = entries
            .into_iter()
            .map(|entry| AllowedIp::parse(entry.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { entries })
    }

    pub fn entries(&self) -> &[AllowedIp] {
        &self.entries
    }

    pub fn is_allowed(&self, client_ip: &str) -> bool {
        let Ok(ip) = client_ip.trim().parse::<IpAddr>() else {
            return false;
        };
        let ip = ip.to_canonical();

        self.entries.iter().any(|entry| entry.contains(ip))
    }

    pub fn check(&self, client_ip: &str) -> IpDecision {
        if self.is_allowed(client_ip) {
            IpDecision::Allowed
        } else {
            tracing::debug!(client_ip, "client ip not in allowlist");
            IpDecision::Forbidden {
                status: status::FORBIDDEN,
            }
        }
    }
}

#[cfg(test)]
#[path = "ip_allowlist_test.rs"]
mod ip_allowlist_test;
