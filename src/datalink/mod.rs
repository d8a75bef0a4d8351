//#[cfg(target_os = "linux")]
mod linux;
pub use linux::*;

use crate::error::Error;
use crate::interfaces::{self, NDInterface};
use crate::packets::Ancillary;
use crate::types::SocketOptTypes;
use log::{debug, warn};
use socket2::{Domain, MsgHdr, Protocol, SockAddr, Socket, Type};
use std::io::IoSlice;
use std::mem::MaybeUninit;
use std::net::{Ipv6Addr, SocketAddrV6};
use tokio::io::Interest;
use tokio::io::unix::AsyncFd;

pub trait BindingOpts {
    /// bind the socket to a particular interface
    fn bind_to_interface(&self, iface: &NDInterface) -> Result<(), Error>;
    /// ask the ICMPv6 layer to hand us Neighbor Solicitations only
    fn set_icmp6_filter_pass_ns(&self) -> Result<(), Error>;
    /// same thing with a classic BPF program, for kernels rejecting ICMP6_FILTER
    ///
    /// for Unix-like systems, crate classic_bpf is used
    fn set_filter_pass_ipv6_ns(&self) -> Result<(), Error>;
}

/// the two things the listener needs from the network
#[allow(async_fn_in_trait)]
pub trait Transport {
    /// index of the interface frames are received on and sent through
    fn scope_id(&self) -> u32;
    /// wait for the next ICMPv6 message, returns its length and its sender
    async fn recv_from(&self, buf: &mut [u8]) -> Result<(usize, Ipv6Addr), Error>;
    /// send `payload` to `dst_addr` with `ancillary` overriding hop limit, egress interface and source
    async fn send_to(
        &self,
        dst_addr: &Ipv6Addr,
        payload: &[u8],
        ancillary: &Ancillary,
    ) -> Result<usize, Error>;
}

/// raw ICMPv6 socket bound to one interface
#[derive(getset::Getters)]
pub struct Binding {
    inner: AsyncFd<Socket>,
    iface: NDInterface,
    #[get = "pub with_prefix"]
    source_addr: Ipv6Addr,
}

/// try ICMP6_FILTER, then BPF; returns false if neither could be installed
///
/// never fatal, the listener checks every frame anyway
pub fn install_ns_filter(socket: &impl BindingOpts, iface_name: &str) -> bool {
    let e = match socket.set_icmp6_filter_pass_ns() {
        Ok(()) => return true,
        Err(e) => e,
    };
    debug!("Binding for {}: {}, falling back to BPF", iface_name, e);
    match socket.set_filter_pass_ipv6_ns() {
        Ok(()) => true,
        Err(e) => {
            warn!(
                "Binding for {}: no receive filter installed ({}), every ICMPv6 message will be delivered",
                iface_name, e
            );
            false
        }
    }
}

impl Binding {
    /// open the socket, filter it and bind it to `iface_name`
    pub fn open(iface_name: &str, source_addr: Ipv6Addr) -> Result<Self, Error> {
        let socket = Socket::new(Domain::IPV6, Type::RAW, Some(Protocol::ICMPV6))
            .map_err(|e| Error::SocketOpt(SocketOptTypes::SocketGeneration, e))?;

        install_ns_filter(&socket, iface_name);

        let iface = interfaces::get_iface_with_name(iface_name)?;
        socket.bind_to_interface(&iface)?;
        if !iface.owns_addr(&source_addr) {
            warn!(
                "Binding for {}: {} is not assigned to this interface",
                iface_name, source_addr
            );
        }

        socket
            .set_nonblocking(true)
            .map_err(|e| Error::SocketOpt(SocketOptTypes::NonBlocking, e))?;
        let inner = AsyncFd::with_interest(socket, Interest::READABLE | Interest::WRITABLE)
            .map_err(|e| Error::SocketOpt(SocketOptTypes::AsyncRegistration, e))?;

        Ok(Self {
            inner,
            iface,
            source_addr,
        })
    }
}

impl Transport for Binding {
    fn scope_id(&self) -> u32 {
        *self.iface.get_scope_id()
    }

    async fn recv_from(&self, buf: &mut [u8]) -> Result<(usize, Ipv6Addr), Error> {
        // SAFETY: recv_from only ever writes initialised bytes
        let buf = unsafe { &mut *(buf as *mut [u8] as *mut [MaybeUninit<u8>]) };
        loop {
            let mut guard = self.inner.readable().await.map_err(Error::Receive)?;
            match guard.try_io(|inner| inner.get_ref().recv_from(buf)) {
                Ok(ret) => {
                    let (len, addr) = ret.map_err(Error::Receive)?;
                    let sender = addr
                        .as_socket_ipv6()
                        .map(|addr| *addr.ip())
                        .unwrap_or(Ipv6Addr::UNSPECIFIED);
                    return Ok((len, sender));
                }
                Err(_would_block) => continue,
            }
        }
    }

    async fn send_to(
        &self,
        dst_addr: &Ipv6Addr,
        payload: &[u8],
        ancillary: &Ancillary,
    ) -> Result<usize, Error> {
        let addr = SockAddr::from(SocketAddrV6::new(*dst_addr, 0, 0, ancillary.scope_id));
        // freed when this function returns, whatever sendmsg says
        let control = encode_control(ancillary);
        let bufs = [IoSlice::new(payload)];
        let msg = MsgHdr::new()
            .with_addr(&addr)
            .with_buffers(&bufs)
            .with_control(&control);
        loop {
            let mut guard = self.inner.writable().await.map_err(Error::Send)?;
            match guard.try_io(|inner| inner.get_ref().sendmsg(&msg, 0)) {
                Ok(ret) => return ret.map_err(Error::Send),
                Err(_would_block) => continue,
            }
        }
    }
}
