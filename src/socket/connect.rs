//! Connection establishment: DNS -> TCP -> proxy tunnel -> TLS.

use boring::ssl::{SslConnector, SslMethod};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use url::Url;

use crate::base::neterror::NetError;
use crate::dns;
use crate::socket::proxy::{ProxySettings, ProxyType};
use crate::socket::stream::SocketStream;
use crate::tls::options::TlsOptions;
use crate::tls::pinning::{spki_hash, CertificatePinner, SpkiHash};

/// Drives the connection process for one request hop.
pub struct ConnectJob;

impl ConnectJob {
    /// Establish a socket to `url`, honoring the proxy and the resolved
    /// TLS fingerprint. For https the returned stream has completed the
    /// handshake and passed certificate pinning.
    pub async fn connect(
        url: &Url,
        proxy: Option<&ProxySettings>,
        tls: &TlsOptions,
        pinner: &CertificatePinner,
        verify_peer: bool,
    ) -> Result<SocketStream, NetError> {
        let target_host = url
            .host_str()
            .ok_or_else(|| NetError::InvalidUrl(url.to_string()))?
            .to_string();
        let target_port = url
            .port_or_known_default()
            .ok_or_else(|| NetError::InvalidUrl(url.to_string()))?;

        // Dial the proxy when one is configured, the origin otherwise.
        let (dial_host, dial_port) = match proxy {
            Some(p) => p.host_port()?,
            None => (target_host.clone(), target_port),
        };

        let addrs = dns::resolve(&dial_host, dial_port).await?;

        let mut stream = None;
        let mut last_err = None;
        for addr in addrs {
            match TcpStream::connect(addr).await {
                Ok(s) => {
                    stream = Some(s);
                    break;
                }
                Err(e) => last_err = Some(e),
            }
        }
        let mut stream = stream.ok_or_else(|| {
            NetError::ConnectFailure(match last_err {
                Some(e) => format!("{dial_host}:{dial_port}: {e}"),
                None => format!("{dial_host}:{dial_port}: no addresses"),
            })
        })?;

        if let Some(p) = proxy {
            match p.proxy_type() {
                ProxyType::Http => {
                    // Plain http goes through the proxy in absolute-form;
                    // only TLS traffic needs a CONNECT tunnel.
                    if url.scheme() == "https" {
                        establish_tunnel(&mut stream, p, &target_host, target_port).await?;
                    }
                }
                other => {
                    return Err(NetError::ProxyError(format!(
                        "unsupported proxy type: {other:?}"
                    )));
                }
            }
        }

        if url.scheme() != "https" {
            return Ok(SocketStream::Tcp(stream));
        }

        // TLS handshake, profile applied verbatim.
        let mut builder = SslConnector::builder(SslMethod::tls())
            .map_err(|e| NetError::TlsHandshakeFailure(e.to_string()))?;
        tls.apply_to_builder(&mut builder, verify_peer)?;
        let connector = builder.build();

        let mut config = connector
            .configure()
            .map_err(|e| NetError::TlsHandshakeFailure(e.to_string()))?;
        if !verify_peer {
            config.set_verify_hostname(false);
        }

        let tls_stream = tokio_boring::connect(config, &target_host, stream)
            .await
            .map_err(|e| {
                tracing::debug!(host = %target_host, error = %e, "tls handshake failed");
                NetError::TlsHandshakeFailure(e.to_string())
            })?;

        if !pinner.is_empty() && verify_peer {
            let hashes = chain_spki_hashes(&tls_stream)?;
            pinner.check(&target_host, &hashes)?;
        }

        tracing::debug!(
            host = %target_host,
            alpn = ?tls_stream.ssl().selected_alpn_protocol().map(String::from_utf8_lossy),
            "tls connection established"
        );

        Ok(SocketStream::Ssl(tls_stream))
    }
}

/// HTTP CONNECT handshake through a forward proxy.
async fn establish_tunnel(
    stream: &mut TcpStream,
    proxy: &ProxySettings,
    target_host: &str,
    target_port: u16,
) -> Result<(), NetError> {
    let target = format!("{target_host}:{target_port}");
    let mut connect_req = format!("CONNECT {target} HTTP/1.1\r\nHost: {target}\r\n");
    if let Some(auth) = proxy.auth_header() {
        connect_req.push_str(&format!("Proxy-Authorization: {auth}\r\n"));
    }
    connect_req.push_str("\r\n");

    stream
        .write_all(connect_req.as_bytes())
        .await
        .map_err(|e| NetError::ProxyError(format!("tunnel write failed: {e}")))?;

    // Read the tunnel response head.
    let mut head = Vec::with_capacity(256);
    let mut buf = [0u8; 1024];
    loop {
        let n = stream
            .read(&mut buf)
            .await
            .map_err(|e| NetError::ProxyError(format!("tunnel read failed: {e}")))?;
        if n == 0 {
            return Err(NetError::ProxyError(
                "proxy closed connection during CONNECT".to_string(),
            ));
        }
        head.extend_from_slice(&buf[..n]);
        if head.windows(4).any(|w| w == b"\r\n\r\n") {
            break;
        }
        if head.len() > 8192 {
            return Err(NetError::ProxyError(
                "oversized CONNECT response".to_string(),
            ));
        }
    }

    let response = String::from_utf8_lossy(&head);
    let status_line = response.lines().next().unwrap_or_default();
    let ok = status_line.starts_with("HTTP/1.1 200") || status_line.starts_with("HTTP/1.0 200");
    if !ok {
        tracing::debug!(status = status_line, "proxy tunnel refused");
        return Err(NetError::ProxyError(format!(
            "tunnel refused: {status_line}"
        )));
    }

    Ok(())
}

/// SPKI hashes for every certificate the peer presented.
fn chain_spki_hashes(
    stream: &tokio_boring::SslStream<TcpStream>,
) -> Result<Vec<SpkiHash>, NetError> {
    let chain = stream.ssl().peer_cert_chain().ok_or_else(|| {
        NetError::TlsHandshakeFailure("peer presented no certificate chain".to_string())
    })?;

    let mut hashes = Vec::new();
    for cert in chain {
        let der = cert
            .to_der()
            .map_err(|e| NetError::TlsHandshakeFailure(e.to_string()))?;
        hashes.push(spki_hash(&der)?);
    }
    Ok(hashes)
}
