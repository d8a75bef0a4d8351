use crate::checksum::checksum;
use pnet::packet::icmpv6::Icmpv6Types;
use pnet::packet::icmpv6::ndp::NeighborSolicitPacket;
use pnet::packet::ip::IpNextHeaderProtocols;
use std::net::Ipv6Addr;

/// RFC 4861 requires NDP messages to be sent (and received) with this hop limit
pub const NDP_HOP_LIMIT: u8 = 255;
/// largest frame a single recv can return
pub const IPV6_MAXPACKET: usize = 65535;
/// ICMPv6 header (type, code, checksum, reserved) + target address
pub const NS_MIN_LEN: usize = 8 + 16;
/// ICMPv6 header + target address + destination address, no options
pub const REDIRECT_LEN: usize = 8 + 16 + 16;
pub const PSEUDO_HEADER_LEN: usize = 16 + 16 + 4 + 3 + 1;
/// next-header value written into the checksum pseudo-header
pub const PSEUDO_NEXT_HEADER: u8 = IpNextHeaderProtocols::Ipv6.0;

// offsetof(icmpv6 redirect, icmp6_cksum)
const CHECKSUM_OFFSET: usize = 2;

/// addresses carried by a Neighbor Solicitation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NeighborSolicitation {
    pub sender: Ipv6Addr,
    pub target: Ipv6Addr,
}

impl NeighborSolicitation {
    /// returns None if the frame is truncated or not a Neighbor Solicitation
    pub fn parse(frame: &[u8], sender: Ipv6Addr) -> Option<Self> {
        if frame.len() < NS_MIN_LEN {
            return None;
        }
        let ns = NeighborSolicitPacket::new(frame)?;
        if ns.get_icmpv6_type() != Icmpv6Types::NeighborSolicit {
            return None;
        }
        Some(Self {
            sender,
            target: ns.get_target_addr(),
        })
    }
}

/// the IPv6 pseudo-header of RFC 2460 section 8.1, only ever fed to the checksum
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PseudoHeader {
    pub source: Ipv6Addr,
    pub destination: Ipv6Addr,
    pub upper_layer_len: u32,
    pub next_header: u8,
}

impl PseudoHeader {
    pub fn octets(&self) -> [u8; PSEUDO_HEADER_LEN] {
        let mut ret = [0; PSEUDO_HEADER_LEN];
        ret[0..16].copy_from_slice(&self.source.octets());
        ret[16..32].copy_from_slice(&self.destination.octets());
        ret[32..36].copy_from_slice(&self.upper_layer_len.to_be_bytes());
        // ret[36..39] stays zero
        ret[39] = self.next_header;
        ret
    }
}

/// ICMPv6 Redirect message (RFC 4861 section 4.5) without options
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RedirectMessage {
    pub checksum: u16,
    pub target: Ipv6Addr,
    pub destination: Ipv6Addr,
}

impl RedirectMessage {
    pub fn octets(&self) -> [u8; REDIRECT_LEN] {
        let mut ret = [0; REDIRECT_LEN];
        ret[0] = Icmpv6Types::Redirect.0;
        // code 0, reserved 0
        ret[CHECKSUM_OFFSET..CHECKSUM_OFFSET + 2].copy_from_slice(&self.checksum.to_be_bytes());
        ret[8..24].copy_from_slice(&self.target.octets());
        ret[24..40].copy_from_slice(&self.destination.octets());
        ret
    }
}

/// per-packet control data handed to sendmsg()
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ancillary {
    pub hop_limit: u8,
    pub scope_id: u32,
    pub source_addr: Ipv6Addr,
}

/// a Redirect ready to be put on the wire
#[derive(Debug, Clone, PartialEq)]
pub struct RedirectPacket {
    pub message: [u8; REDIRECT_LEN],
    pub ancillary: Ancillary,
}

/// construct a Redirect telling `dst_addr` that `src_addr` is the better first hop for `tgt_addr`
///
/// `tgt_addr` is taken as is, the caller decides which targets are worth redirecting
pub fn generate_redirect(
    src_addr: &Ipv6Addr,
    dst_addr: &Ipv6Addr,
    tgt_addr: &Ipv6Addr,
    scope_id: u32,
) -> RedirectPacket {
    let pseudo_header = PseudoHeader {
        source: *src_addr,
        destination: *dst_addr,
        upper_layer_len: REDIRECT_LEN as u32,
        next_header: PSEUDO_NEXT_HEADER,
    };
    let mut redirect = RedirectMessage {
        checksum: 0,
        target: *tgt_addr,
        destination: *src_addr,
    };

    let mut buf = [0u8; PSEUDO_HEADER_LEN + REDIRECT_LEN];
    buf[..PSEUDO_HEADER_LEN].copy_from_slice(&pseudo_header.octets());
    buf[PSEUDO_HEADER_LEN..].copy_from_slice(&redirect.octets());
    redirect.checksum = checksum(&buf);

    RedirectPacket {
        message: redirect.octets(),
        ancillary: Ancillary {
            hop_limit: NDP_HOP_LIMIT,
            scope_id,
            source_addr: *src_addr,
        },
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use pnet::packet::icmpv6::ndp::RedirectPacket as PnetRedirect;

    fn addr(s: &str) -> Ipv6Addr {
        s.parse().unwrap()
    }

    pub fn ns_frame(target: &Ipv6Addr) -> Vec<u8> {
        let mut frame = vec![0u8; NS_MIN_LEN];
        frame[0] = Icmpv6Types::NeighborSolicit.0;
        frame[8..24].copy_from_slice(&target.octets());
        frame
    }

    #[test]
    fn test_parse_ns() {
        let frame = ns_frame(&addr("2001:db8::abcd"));
        let ns = NeighborSolicitation::parse(&frame, addr("fe80::dead:beef")).unwrap();
        assert_eq!(ns.sender, addr("fe80::dead:beef"));
        assert_eq!(ns.target, addr("2001:db8::abcd"));
    }

    #[test]
    fn test_parse_ns_with_options() {
        let mut frame = ns_frame(&addr("fe80::3"));
        // source link-layer address option
        frame.extend_from_slice(&[1, 1, 0x02, 0x00, 0x00, 0x00, 0x00, 0x01]);
        let ns = NeighborSolicitation::parse(&frame, addr("fe80::2")).unwrap();
        assert_eq!(ns.target, addr("fe80::3"));
    }

    #[test]
    fn test_parse_truncated() {
        let frame = ns_frame(&addr("fe80::3"));
        for len in 0..NS_MIN_LEN {
            assert_eq!(NeighborSolicitation::parse(&frame[..len], addr("fe80::2")), None);
        }
    }

    #[test]
    fn test_parse_wrong_type() {
        let mut frame = ns_frame(&addr("fe80::3"));
        for icmpv6_type in [
            Icmpv6Types::NeighborAdvert,
            Icmpv6Types::RouterSolicit,
            Icmpv6Types::Redirect,
            Icmpv6Types::EchoRequest,
        ] {
            frame[0] = icmpv6_type.0;
            assert_eq!(NeighborSolicitation::parse(&frame, addr("fe80::2")), None);
        }
    }

    #[test]
    fn test_pseudo_header_layout() {
        let octets = PseudoHeader {
            source: addr("fe80::1"),
            destination: addr("fe80::2"),
            upper_layer_len: 40,
            next_header: PSEUDO_NEXT_HEADER,
        }
        .octets();
        assert_eq!(&octets[0..16], &addr("fe80::1").octets());
        assert_eq!(&octets[16..32], &addr("fe80::2").octets());
        assert_eq!(&octets[32..40], &[0, 0, 0, 40, 0, 0, 0, 41]);
    }

    #[test]
    fn test_redirect_fields() {
        let pkt = generate_redirect(&addr("fe80::1"), &addr("fe80::2"), &addr("fe80::3"), 7);
        let redirect = PnetRedirect::new(&pkt.message).unwrap();
        assert_eq!(redirect.get_icmpv6_type(), Icmpv6Types::Redirect);
        assert_eq!(redirect.get_icmpv6_code().0, 0);
        assert_eq!(redirect.get_reserved(), 0);
        assert_eq!(redirect.get_target_addr(), addr("fe80::3"));
        assert_eq!(redirect.get_dest_addr(), addr("fe80::1"));
        assert_eq!(
            pkt.ancillary,
            Ancillary {
                hop_limit: 255,
                scope_id: 7,
                source_addr: addr("fe80::1"),
            }
        );
    }

    #[test]
    fn test_redirect_checksum_folds_to_zero() {
        let (src, dst) = (addr("fe80::1"), addr("fe80::2"));
        let pkt = generate_redirect(&src, &dst, &addr("fe80::3"), 7);
        let mut buf = PseudoHeader {
            source: src,
            destination: dst,
            upper_layer_len: REDIRECT_LEN as u32,
            next_header: PSEUDO_NEXT_HEADER,
        }
        .octets()
        .to_vec();
        buf.extend_from_slice(&pkt.message);
        assert_ne!(&pkt.message[2..4], &[0, 0]);
        assert_eq!(checksum(&buf), 0);
    }

    #[test]
    fn test_redirect_checksum_depends_on_pseudo_header() {
        let (src, dst) = (addr("fe80::1"), addr("fe80::2"));
        let pkt = generate_redirect(&src, &dst, &addr("fe80::3"), 7);
        // summed against an ICMPv6 pseudo-header the result must not validate
        let mut buf = PseudoHeader {
            source: src,
            destination: dst,
            upper_layer_len: REDIRECT_LEN as u32,
            next_header: IpNextHeaderProtocols::Icmpv6.0,
        }
        .octets()
        .to_vec();
        buf.extend_from_slice(&pkt.message);
        assert_ne!(checksum(&buf), 0);
        // a different destination changes the checksum as well
        let other = generate_redirect(&src, &addr("fe80::4"), &addr("fe80::3"), 7);
        assert_ne!(other.message[2..4], pkt.message[2..4]);
    }
}
