use std::net::IpAddr;

/// Who sent a request, as far as the http layer can tell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientContext {
    pub ip: IpAddr,
    pub user_agent: Option<String>,
}
