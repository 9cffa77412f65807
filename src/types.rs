use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

/// Host information for matching
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct HostInfo {
    /// Hostname (domain name), lowercased
    pub name: String,
    /// IPv4 address
    pub ipv4: Option<Ipv4Addr>,
    /// IPv6 address
    pub ipv6: Option<Ipv6Addr>,
}

impl HostInfo {
    /// Create a new HostInfo with just a name
    pub fn from_name(name: impl Into<String>) -> Self {
        Self {
            name: name.into().to_lowercase(),
            ipv4: None,
            ipv6: None,
        }
    }

    /// Create a new HostInfo with name and IPs
    pub fn new(name: impl Into<String>, ipv4: Option<Ipv4Addr>, ipv6: Option<Ipv6Addr>) -> Self {
        Self {
            name: name.into().to_lowercase(),
            ipv4,
            ipv6,
        }
    }

    /// Create a HostInfo from an IP address.
    ///
    /// IPv4-mapped IPv6 addresses are stored as IPv4.
    pub fn from_ip(ip: IpAddr) -> Self {
        match ip.to_canonical() {
            IpAddr::V4(v4) => Self::new("", Some(v4), None),
            IpAddr::V6(v6) => Self::new("", None, Some(v6)),
        }
    }

    /// Classify free-form input as an IP address or a host name.
    pub fn parse(input: &str) -> Self {
        match input.parse::<IpAddr>() {
            Ok(ip) => Self::from_ip(ip),
            Err(_) => Self::from_name(input),
        }
    }

    /// Check if the host carries neither a name nor an address
    pub fn is_empty(&self) -> bool {
        self.name.is_empty() && self.ipv4.is_none() && self.ipv6.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_name_lowercases() {
        let host = HostInfo::from_name("WWW.Example.COM");
        assert_eq!(host.name, "www.example.com");
        assert!(host.ipv4.is_none() && host.ipv6.is_none());
    }

    #[test]
    fn test_parse_ipv4() {
        let host = HostInfo::parse("192.168.1.1");
        assert_eq!(host.ipv4, Some(Ipv4Addr::new(192, 168, 1, 1)));
        assert!(host.name.is_empty());
        assert!(host.ipv6.is_none());
    }

    #[test]
    fn test_parse_ipv6() {
        let host = HostInfo::parse("2001:db8::1");
        assert_eq!(host.ipv6, Some(Ipv6Addr::new(0x2001, 0xdb8, 0, 0, 0, 0, 0, 1)));
        assert!(host.ipv4.is_none());
    }

    #[test]
    fn test_parse_mapped_ipv6_becomes_ipv4() {
        let host = HostInfo::parse("::ffff:10.0.0.1");
        assert_eq!(host.ipv4, Some(Ipv4Addr::new(10, 0, 0, 1)));
        assert!(host.ipv6.is_none());
    }

    #[test]
    fn test_parse_name() {
        let host = HostInfo::parse("Mail.Google.com");
        assert_eq!(host.name, "mail.google.com");
        assert!(host.ipv4.is_none() && host.ipv6.is_none());
    }

    #[test]
    fn test_empty_host() {
        assert!(HostInfo::default().is_empty());
        assert!(HostInfo::parse("").is_empty());
        assert!(!HostInfo::parse("::1").is_empty());
    }
}
