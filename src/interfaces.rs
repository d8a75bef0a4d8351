use crate::error::Error;
use pnet::datalink;
use std::net::{IpAddr, Ipv6Addr};

#[derive(getset::Getters, Clone, Debug, PartialEq)]
pub struct NDInterface {
    #[get = "pub with_prefix"]
    name: String,
    #[get = "pub with_prefix"]
    scope_id: u32,
    /// IPv6 addresses currently assigned to the interface
    v6_addrs: Vec<Ipv6Addr>,
}

impl NDInterface {
    pub fn new(name: &str, scope_id: u32, addrs: impl IntoIterator<Item = IpAddr>) -> Self {
        let v6_addrs = addrs
            .into_iter()
            .filter_map(|addr| match addr {
                IpAddr::V6(ip) => Some(ip),
                IpAddr::V4(_) => None,
            })
            .collect();
        NDInterface {
            name: String::from(name),
            scope_id,
            v6_addrs,
        }
    }

    pub fn owns_addr(&self, addr: &Ipv6Addr) -> bool {
        self.v6_addrs.contains(addr)
    }
}

// convert datalink::NetworkInterface to NDInterface
fn get_specified_iface(raw: &datalink::NetworkInterface) -> NDInterface {
    NDInterface::new(&raw.name, raw.index, raw.ips.iter().map(|net| net.ip()))
}

/// look up an interface by name, failing if it is missing or has no usable index
pub fn get_iface_with_name(name: &str) -> Result<NDInterface, Error> {
    datalink::interfaces()
        .iter()
        .filter(|iface| iface.name == name && iface.index != 0)
        .map(get_specified_iface)
        .next()
        .ok_or_else(|| Error::InterfaceNotFound(String::from(name)))
}

#[test]
fn test_get_iface_with_name() {
    let ret = get_iface_with_name("nd-no-such-if0");
    assert!(matches!(ret, Err(Error::InterfaceNotFound(name)) if name == "nd-no-such-if0"));
}

#[test]
fn test_owns_addr() {
    let iface = NDInterface::new(
        "eth0",
        2,
        [
            "192.0.2.1".parse().unwrap(),
            "fe80::b299:28ff:fec8:f036".parse().unwrap(),
            "2001:db8::1".parse().unwrap(),
        ],
    );
    assert_eq!(iface.v6_addrs.len(), 2);
    assert!(iface.owns_addr(&"fe80::b299:28ff:fec8:f036".parse().unwrap()));
    assert!(!iface.owns_addr(&"fe80::1".parse().unwrap()));
}
