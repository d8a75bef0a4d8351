use crate::types::*;
use std::net::Ipv6Addr;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("config error: {0}")]
    Config(#[from] config::ConfigError),
    #[error("address parse error: {0}")]
    AddrParse(#[from] std::net::AddrParseError),
    #[error("{0} can not be used as the source address")]
    InvalidSourceAddr(Ipv6Addr),
    #[error("interface {0} not found")]
    InterfaceNotFound(String),
    #[error("failed to bind to interface {0}: {1}")]
    Bind(String, std::io::Error),
    #[error("socketopt error ({0:?}): {1}")]
    SocketOpt(SocketOptTypes, std::io::Error),
    #[error("failed to receive: {0}")]
    Receive(std::io::Error),
    #[error("failed to send: {0}")]
    Send(std::io::Error),
}
