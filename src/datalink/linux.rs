use crate::datalink::BindingOpts;
use crate::error::Error;
use crate::interfaces::NDInterface;
use crate::packets::Ancillary;
use crate::types::SocketOptTypes;
use classic_bpf::*;
use pnet::packet::icmpv6::Icmpv6Types;
use socket2::Socket;
use std::mem::size_of;
use std::os::unix::io::AsRawFd;

// <netinet/icmp6.h>, option name at level IPPROTO_ICMPV6
const ICMP6_FILTER: libc::c_int = 1;

/// struct icmp6_filter: one bit per ICMPv6 type, a set bit blocks the type
fn icmp6_filter_pass_only(icmpv6_type: u8) -> [u32; 8] {
    let mut filter = [u32::MAX; 8];
    filter[(icmpv6_type >> 5) as usize] &= !(1u32 << (icmpv6_type & 31));
    filter
}

impl BindingOpts for Socket {
    fn bind_to_interface(&self, iface: &NDInterface) -> Result<(), Error> {
        self.bind_device(Some(iface.get_name().as_bytes()))
            .map_err(|e| Error::Bind(iface.get_name().clone(), e))
    }

    fn set_icmp6_filter_pass_ns(&self) -> Result<(), Error> {
        let filter = icmp6_filter_pass_only(Icmpv6Types::NeighborSolicit.0);
        match unsafe {
            libc::setsockopt(
                self.as_raw_fd(),
                libc::IPPROTO_ICMPV6,
                ICMP6_FILTER,
                filter.as_ptr() as *const libc::c_void,
                size_of::<[u32; 8]>() as libc::socklen_t,
            )
        } {
            0 => Ok(()),
            _ => Err(Error::SocketOpt(
                SocketOptTypes::Icmp6Filter,
                std::io::Error::last_os_error(),
            )),
        }
    }

    fn set_filter_pass_ipv6_ns(&self) -> Result<(), Error> {
        // raw IPv6 sockets see the packet from the ICMPv6 header on
        let ipv6_ns_filter = [
            // offsetof(icmpv6 header, icmp6_type)
            BPFFilter::bpf_stmt((BPF_LD | BPF_B | BPF_ABS) as u16, 0),
            BPFFilter::bpf_jump(
                (BPF_JMP | BPF_JEQ | BPF_K) as u16,
                Icmpv6Types::NeighborSolicit.0 as u32,
                0,
                1,
            ),
            BPFFilter::bpf_stmt((BPF_RET | BPF_K) as u16, u32::MAX),
            BPFFilter::bpf_stmt((BPF_RET | BPF_K) as u16, 0),
        ];
        let ipv6_socket_fprog = BPFFProg::new(&ipv6_ns_filter);

        ipv6_socket_fprog
            .attach_filter(self.as_raw_fd())
            .map_err(|errno| {
                Error::SocketOpt(
                    SocketOptTypes::AttachBpf,
                    std::io::Error::from_raw_os_error(errno),
                )
            })
    }
}

fn cmsg_space(len: usize) -> usize {
    unsafe { libc::CMSG_SPACE(len as libc::c_uint) as usize }
}

fn cmsg_len(len: usize) -> usize {
    unsafe { libc::CMSG_LEN(len as libc::c_uint) as usize }
}

/// write one control message (header then data) at the start of `slot`
fn put_cmsg(slot: &mut [u8], level: libc::c_int, cmsg_type: libc::c_int, data: &[u8]) {
    let mut hdr: libc::cmsghdr = unsafe { std::mem::zeroed() };
    hdr.cmsg_len = cmsg_len(data.len()) as _;
    hdr.cmsg_level = level;
    hdr.cmsg_type = cmsg_type;
    let hdr_bytes = unsafe {
        std::slice::from_raw_parts(
            &hdr as *const libc::cmsghdr as *const u8,
            size_of::<libc::cmsghdr>(),
        )
    };
    slot[..hdr_bytes.len()].copy_from_slice(hdr_bytes);
    let offset = cmsg_len(0);
    slot[offset..offset + data.len()].copy_from_slice(data);
}

/// serialize IPV6_HOPLIMIT and IPV6_PKTINFO control messages for sendmsg()
pub fn encode_control(ancillary: &Ancillary) -> Vec<u8> {
    let hop_limit = (ancillary.hop_limit as libc::c_int).to_ne_bytes();
    // struct in6_pktinfo { struct in6_addr ipi6_addr; unsigned ipi6_ifindex; }
    let mut pktinfo = [0u8; size_of::<libc::in6_pktinfo>()];
    pktinfo[..16].copy_from_slice(&ancillary.source_addr.octets());
    pktinfo[16..20].copy_from_slice(&(ancillary.scope_id as libc::c_uint).to_ne_bytes());

    let hop_limit_space = cmsg_space(hop_limit.len());
    let mut control = vec![0u8; hop_limit_space + cmsg_space(pktinfo.len())];
    put_cmsg(
        &mut control[..hop_limit_space],
        libc::IPPROTO_IPV6,
        libc::IPV6_HOPLIMIT,
        &hop_limit,
    );
    put_cmsg(
        &mut control[hop_limit_space..],
        libc::IPPROTO_IPV6,
        libc::IPV6_PKTINFO,
        &pktinfo,
    );
    control
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::mem::offset_of;

    fn read_int(buf: &[u8], at: usize) -> libc::c_int {
        let mut bytes = [0u8; size_of::<libc::c_int>()];
        let n = bytes.len();
        bytes.copy_from_slice(&buf[at..at + n]);
        libc::c_int::from_ne_bytes(bytes)
    }

    #[test]
    fn test_icmp6_filter() {
        let filter = icmp6_filter_pass_only(135);
        assert_eq!(filter[4], !(1 << 7));
        for (i, word) in filter.iter().enumerate() {
            if i != 4 {
                assert_eq!(*word, u32::MAX);
            }
        }
    }

    #[test]
    fn test_encode_control() {
        let ancillary = Ancillary {
            hop_limit: 255,
            scope_id: 3,
            source_addr: "fe80::b299:28ff:fec8:f036".parse().unwrap(),
        };
        let control = encode_control(&ancillary);
        let first = cmsg_space(size_of::<libc::c_int>());
        assert_eq!(
            control.len(),
            first + cmsg_space(size_of::<libc::in6_pktinfo>())
        );

        let level = offset_of!(libc::cmsghdr, cmsg_level);
        let cmsg_type = offset_of!(libc::cmsghdr, cmsg_type);
        let data = cmsg_len(0);

        // hop limit
        assert_eq!(read_int(&control, level), libc::IPPROTO_IPV6);
        assert_eq!(read_int(&control, cmsg_type), libc::IPV6_HOPLIMIT);
        assert_eq!(read_int(&control, data), 255);

        // pktinfo
        assert_eq!(read_int(&control, first + level), libc::IPPROTO_IPV6);
        assert_eq!(read_int(&control, first + cmsg_type), libc::IPV6_PKTINFO);
        assert_eq!(
            &control[first + data..first + data + 16],
            &ancillary.source_addr.octets()
        );
        assert_eq!(read_int(&control, first + data + 16), 3);
    }
}
