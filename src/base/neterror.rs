use thiserror::Error;

/// Error taxonomy for the whole crate.
///
/// Every failure that can reach the boundary maps onto one of these
/// variants. At the boundary they surface as a `status: 0` response
/// carrying the display string; none of them is retried internally.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum NetError {
    // Boundary / validation
    #[error("malformed request: {0}")]
    MalformedRequest(String),
    #[error("cannot build client out of client identifier and custom tls client information, provide only one of them")]
    ProfileSelector,
    #[error("no tls client profile found for identifier: {0}")]
    UnknownProfile(String),
    #[error("invalid custom tls client profile: {0}")]
    InvalidProfile(String),
    #[error("invalid url: {0}")]
    InvalidUrl(String),
    #[error("invalid header: {0}")]
    InvalidHeader(String),
    #[error("no request url or request method provided")]
    MissingUrlOrMethod,
    #[error("failed to base64 decode request body: {0}")]
    BodyDecode(String),

    // Connection
    #[error("name resolution failed for {0}")]
    DnsFailure(String),
    #[error("connection failed: {0}")]
    ConnectFailure(String),
    #[error("connect timed out")]
    ConnectTimeout,
    #[error("timeout exceeded while awaiting response")]
    ReadTimeout,
    #[error("tls handshake failed: {0}")]
    TlsHandshakeFailure(String),
    #[error("alpn negotiation failed")]
    AlpnNegotiationFailed,
    #[error("proxy error: {0}")]
    ProxyError(String),
    #[error("certificate pin mismatch for host {0}")]
    CertificatePinMismatch(String),

    // Protocol
    #[error("too many redirects, exceeded {0} hops")]
    RedirectLoopExceeded(u8),
    #[error("http error: {0}")]
    Http(String),

    // Session
    #[error("no session found for sessionId: {0}")]
    SessionNotFound(String),

    // Catch-all for caught faults
    #[error("internal fault: {0}")]
    InternalFault(String),
}

impl NetError {
    /// True when the failure happened before any response bytes arrived,
    /// i.e. during connection establishment rather than the exchange.
    pub fn is_connect_phase(&self) -> bool {
        matches!(
            self,
            NetError::DnsFailure(_)
                | NetError::ConnectFailure(_)
                | NetError::ConnectTimeout
                | NetError::TlsHandshakeFailure(_)
                | NetError::AlpnNegotiationFailed
                | NetError::ProxyError(_)
                | NetError::CertificatePinMismatch(_)
        )
    }
}
