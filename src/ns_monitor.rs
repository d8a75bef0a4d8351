use crate::datalink::Transport;
use crate::error::Error;
use crate::packets::{self, IPV6_MAXPACKET, NeighborSolicitation};
use crate::types::Verdict;
use log::{error, trace, warn};
use std::net::Ipv6Addr;

/// monitors for Neighbor Solicitation
/// every valid one is answered with a Redirect naming `source_addr` as the better first hop
pub struct NSMonitor<'a, T: Transport> {
    inner: &'a T,
    source_addr: Ipv6Addr,
    buf: Vec<u8>,
}

impl<'a, T: Transport> NSMonitor<'a, T> {
    pub fn new(inner: &'a T, source_addr: Ipv6Addr) -> Self {
        Self {
            inner,
            source_addr,
            buf: vec![0; IPV6_MAXPACKET],
        }
    }

    /// main loop: receive NS packet and answer it
    ///
    /// only returns when receiving fails, failed sends are logged and skipped
    pub async fn run(mut self) -> Result<(), Error> {
        warn!(
            "NSMonitor on interface {}: Start to work",
            self.inner.scope_id()
        );
        loop {
            let (len, sender) = self.inner.recv_from(&mut self.buf).await?;
            self.dispatch(&self.buf[..len], sender).await;
        }
    }

    /// handle one received frame
    pub async fn dispatch(&self, frame: &[u8], sender: Ipv6Addr) -> Verdict {
        let ns = match NeighborSolicitation::parse(frame, sender) {
            Some(v) => v,
            None => {
                trace!(
                    "NSMonitor: drop a frame of {} bytes from {}",
                    frame.len(),
                    sender
                );
                return Verdict::Malformed;
            }
        };
        println!("got NS from {} for {}", ns.sender, ns.target);

        let redirect = packets::generate_redirect(
            &self.source_addr,
            &ns.sender,
            &ns.target,
            self.inner.scope_id(),
        );
        match self
            .inner
            .send_to(&ns.sender, &redirect.message, &redirect.ancillary)
            .await
        {
            Ok(_) => {
                println!("sent redirect");
                Verdict::Redirected
            }
            Err(e) => {
                error!(
                    "NSMonitor: Failed to send the redirect for {} to {}: {}",
                    ns.target, ns.sender, e
                );
                Verdict::SendFailed
            }
        }
    }
}
