use crate::error::Error;
use std::net::Ipv6Addr;

/// link-local address this host answers with unless told otherwise
pub const DEFAULT_SOURCE_ADDR: &str = "fe80::b299:28ff:fec8:f036";

const SOURCE_ADDR_KEY: &str = "redirect.source_addr";

#[derive(getset::Getters, Debug, std::cmp::PartialEq, Clone)]
pub struct RedirectConfig {
    #[get = "pub with_prefix"]
    iface_name: String,
    /// used both as the Redirect's better first hop and as the packet source
    #[get = "pub with_prefix"]
    source_addr: Ipv6Addr,
}

impl RedirectConfig {
    pub fn new(iface_name: String, source_addr: Ipv6Addr) -> Result<Self, Error> {
        if source_addr.is_multicast() || source_addr.is_unspecified() {
            return Err(Error::InvalidSourceAddr(source_addr));
        }
        Ok(RedirectConfig {
            iface_name,
            source_addr,
        })
    }
}

/// merge the built-in default, the optional toml file and the command line
///
/// the file may carry a `[redirect]` section with `source_addr`;
/// a source address given on the command line wins over both
pub fn parse_config(
    iface_name: &str,
    cfile: Option<&str>,
    source_addr: Option<&str>,
) -> Result<RedirectConfig, Error> {
    let mut builder = config::Config::builder().set_default(SOURCE_ADDR_KEY, DEFAULT_SOURCE_ADDR)?;
    if let Some(cfile) = cfile {
        builder = builder.add_source(config::File::with_name(cfile));
    }
    let myconfig = builder
        .set_override_option(SOURCE_ADDR_KEY, source_addr)?
        .build()?;

    let source_addr: Ipv6Addr = myconfig.get_string(SOURCE_ADDR_KEY)?.parse()?;
    RedirectConfig::new(String::from(iface_name), source_addr)
}

#[test]
fn test_config_parser() {
    let config1 = parse_config("eth0", None, None).unwrap();
    let config2 = parse_config("eth0", Some("test/test1.toml"), None).unwrap();
    let config3 = parse_config("wlan0", Some("test/test1.toml"), Some("fe80::1")).unwrap();
    let config4 = parse_config("eth0", Some("test/test2.toml"), None).unwrap();

    let result1 = RedirectConfig {
        iface_name: "eth0".to_string(),
        source_addr: DEFAULT_SOURCE_ADDR.parse().unwrap(),
    };
    let result2 = RedirectConfig {
        iface_name: "eth0".to_string(),
        source_addr: "fe80::5054:ff:fe12:3456".parse().unwrap(),
    };
    let result3 = RedirectConfig {
        iface_name: "wlan0".to_string(),
        source_addr: "fe80::1".parse().unwrap(),
    };

    assert_eq!(config1, result1);
    assert_eq!(config2, result2);
    assert_eq!(config3, result3);
    // no [redirect] section, the default applies
    assert_eq!(config4, result1);
}

#[test]
fn test_config_rejects_bad_source() {
    assert!(matches!(
        parse_config("eth0", None, Some("ff02::1")),
        Err(Error::InvalidSourceAddr(_))
    ));
    assert!(matches!(
        parse_config("eth0", None, Some("::")),
        Err(Error::InvalidSourceAddr(_))
    ));
    assert!(matches!(
        parse_config("eth0", None, Some("fe80::zz")),
        Err(Error::AddrParse(_))
    ));
    assert!(matches!(
        parse_config("eth0", Some("test/test3.toml"), None),
        Err(Error::InvalidSourceAddr(_))
    ));
    assert!(matches!(
        parse_config("eth0", Some("test/missing.toml"), None),
        Err(Error::Config(_))
    ));
}
