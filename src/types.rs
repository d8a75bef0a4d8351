/// socket options applied while setting up the binding
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SocketOptTypes {
    SocketGeneration,
    NonBlocking,
    Icmp6Filter,
    AttachBpf,
    AsyncRegistration,
}

/// what the listener did with one received frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Verdict {
    /// too short, or not a Neighbor Solicitation
    Malformed,
    Redirected,
    SendFailed,
}
