//! The request executor.
//!
//! Drives one HTTP(S) exchange as an explicit state machine:
//! `Init -> ResolveSession -> ResolveFingerprint -> Connect -> SendRequest
//! -> ReceiveResponse -> UpdateCookieJar -> (Redirect -> Connect...) ->
//! Done`. Any failure produces a `NetError` which the boundary flattens
//! into a `status: 0` response; nothing here retries.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use base64::Engine;
use bytes::Bytes;
use http::{Method, StatusCode, Version};
use http_body_util::BodyExt;
use hyper_util::rt::TokioIo;
use url::Url;

use crate::base::neterror::NetError;
use crate::boundary::types::RequestInput;
use crate::cookies::canonical::CanonicalCookie;
use crate::cookies::jar::JarMode;
use crate::http::h2fingerprint::H2Fingerprint;
use crate::http::orderedheaders::OrderedHeaderMap;
use crate::http::response::CollectedResponse;
use crate::profiles::{self, ClientProfile, ProfileSelector};
use crate::session::{Session, SessionStore};
use crate::socket::connect::ConnectJob;
use crate::socket::proxy::ProxySettings;
use crate::socket::stream::SocketStream;
use crate::tls::pinning::CertificatePinner;

/// Default redirect hop limit.
pub const DEFAULT_MAX_REDIRECTS: u8 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Init,
    ResolveSession,
    ResolveFingerprint,
    Connect,
    UpdateCookieJar,
    Redirect,
    Done,
}

/// Outcome of a completed exchange.
pub struct ExchangeResult {
    pub response: CollectedResponse,
    /// Jar contents matching the final URL, for the response descriptor.
    pub cookies: Vec<CanonicalCookie>,
    pub session_id: String,
    /// Whether the caller referenced a persistent session.
    pub with_session: bool,
}

pub struct RequestExecutor {
    sessions: Arc<SessionStore>,
}

impl RequestExecutor {
    pub fn new(sessions: Arc<SessionStore>) -> Self {
        Self { sessions }
    }

    /// Execute a request descriptor end to end, under its timeout.
    pub async fn execute(&self, input: &RequestInput) -> Result<ExchangeResult, NetError> {
        let connected = Arc::new(AtomicBool::new(false));
        let txn = Transaction::new(input, &self.sessions, connected.clone());

        match tokio::time::timeout(input.timeout(), txn.run()).await {
            Ok(result) => result,
            Err(_) => {
                // Partial transfers are discarded with the dropped future.
                if connected.load(Ordering::Relaxed) {
                    Err(NetError::ReadTimeout)
                } else {
                    Err(NetError::ConnectTimeout)
                }
            }
        }
    }
}

/// Cross-method redirect semantics: 303 always becomes GET, 301/302 demote
/// POST to GET, 307/308 keep method and body.
pub fn redirect_method(status: StatusCode, method: &Method) -> (Method, bool) {
    match status {
        StatusCode::SEE_OTHER => {
            if *method == Method::HEAD {
                (Method::HEAD, false)
            } else {
                (Method::GET, false)
            }
        }
        StatusCode::MOVED_PERMANENTLY | StatusCode::FOUND => {
            if *method == Method::POST {
                (Method::GET, false)
            } else {
                (method.clone(), true)
            }
        }
        _ => (method.clone(), true),
    }
}

struct Transaction<'a> {
    input: &'a RequestInput,
    sessions: &'a SessionStore,
    connected_flag: Arc<AtomicBool>,

    state: State,
    url: Option<Url>,
    method: Method,
    body: Bytes,
    profile: Option<ClientProfile>,
    proxy: Option<ProxySettings>,
    pinner: CertificatePinner,
    session: Option<Arc<Session>>,
    with_session: bool,
    hops: u8,
    response: Option<CollectedResponse>,
}

impl<'a> Transaction<'a> {
    fn new(
        input: &'a RequestInput,
        sessions: &'a SessionStore,
        connected_flag: Arc<AtomicBool>,
    ) -> Self {
        Self {
            input,
            sessions,
            connected_flag,
            state: State::Init,
            url: None,
            method: Method::GET,
            body: Bytes::new(),
            profile: None,
            proxy: None,
            pinner: CertificatePinner::default(),
            session: None,
            with_session: false,
            hops: 0,
            response: None,
        }
    }

    async fn run(mut self) -> Result<ExchangeResult, NetError> {
        loop {
            match self.state {
                State::Init => self.do_init()?,
                State::ResolveSession => self.do_resolve_session()?,
                State::ResolveFingerprint => self.do_resolve_fingerprint()?,
                State::Connect => self.do_exchange_hop().await?,
                State::UpdateCookieJar => self.do_update_cookie_jar()?,
                State::Redirect => self.do_redirect()?,
                State::Done => break,
            }
        }

        let response = self
            .response
            .take()
            .ok_or_else(|| NetError::InternalFault("transaction finished without response".into()))?;

        let cookies = match &self.session {
            Some(session) => session.with_jar(|jar| jar.query(&response.final_url)),
            None => Vec::new(),
        };

        Ok(ExchangeResult {
            response,
            cookies,
            session_id: self
                .input
                .session_id
                .clone()
                .unwrap_or_default(),
            with_session: self.with_session,
        })
    }

    fn do_init(&mut self) -> Result<(), NetError> {
        if self.input.request_url.is_empty() || self.input.request_method.is_empty() {
            return Err(NetError::MissingUrlOrMethod);
        }

        let url = Url::parse(&self.input.request_url)
            .map_err(|e| NetError::InvalidUrl(format!("{}: {e}", self.input.request_url)))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(NetError::InvalidUrl(format!(
                "unsupported scheme: {}",
                url.scheme()
            )));
        }

        self.method = self
            .input
            .request_method
            .parse::<Method>()
            .map_err(|_| {
                NetError::MalformedRequest(format!(
                    "invalid method: {}",
                    self.input.request_method
                ))
            })?;

        self.body = match &self.input.request_body {
            Some(body) if !body.is_empty() => {
                if self.input.is_byte_request {
                    Bytes::from(
                        base64::engine::general_purpose::STANDARD
                            .decode(body)
                            .map_err(|e| NetError::BodyDecode(e.to_string()))?,
                    )
                } else {
                    Bytes::from(body.clone().into_bytes())
                }
            }
            _ => Bytes::new(),
        };

        self.pinner = CertificatePinner::new(&self.input.certificate_pinning_hosts)?;
        self.url = Some(url);
        self.state = State::ResolveSession;
        Ok(())
    }

    fn do_resolve_session(&mut self) -> Result<(), NetError> {
        let url = self.current_url()?.clone();

        if self.input.without_cookie_jar {
            // No session is created; explicit cookies still travel on the
            // request, but nothing persists.
            self.proxy = self
                .input
                .proxy_url
                .as_deref()
                .filter(|p| !p.is_empty())
                .map(ProxySettings::parse)
                .transpose()?;
            self.state = State::ResolveFingerprint;
            return Ok(());
        }

        let session = match self.input.session_id.as_deref().filter(|s| !s.is_empty()) {
            Some(id) => {
                self.with_session = true;
                self.sessions.get_or_create(id)
            }
            // Jar enabled but no id: cookies still accumulate across the
            // redirect chain of this one exchange.
            None => Session::detached(),
        };

        if self.input.with_default_cookie_jar {
            session.set_jar_mode(JarMode::Strict);
        }

        let defaults = session.update_defaults(
            self.input.proxy_url.as_deref().filter(|p| !p.is_empty()),
            self.input.follow_redirects,
            self.input.is_rotating_proxy,
        );
        self.proxy = defaults
            .proxy_url
            .as_deref()
            .map(ProxySettings::parse)
            .transpose()?;

        // Explicit request cookies land in the jar first, exactly like a
        // write through the cookie operations.
        if !self.input.request_cookies.is_empty() {
            session.with_jar(|jar| {
                for c in &self.input.request_cookies {
                    jar.upsert(CanonicalCookie::from_parts(
                        c.name.clone(),
                        c.value.clone(),
                        Some(c.domain.clone()).filter(|d| !d.is_empty()),
                        Some(c.path.clone()).filter(|p| !p.is_empty()),
                        c.expires,
                        &url,
                    ));
                }
            });
        }

        self.session = Some(session);
        self.state = State::ResolveFingerprint;
        Ok(())
    }

    fn do_resolve_fingerprint(&mut self) -> Result<(), NetError> {
        let selector = ProfileSelector::from_parts(
            Some(self.input.tls_client_identifier.as_str()),
            self.input.custom_tls_client.as_ref(),
        )?;
        let mut profile = profiles::resolve(&selector)?;

        if self.input.with_random_tls_extension_order {
            profile.tls.permute_extensions = Some(true);
        }
        if self.input.force_http1 {
            profile.tls.force_http1();
        }

        self.profile = Some(profile);
        self.state = State::Connect;
        Ok(())
    }

    /// Connect, send and receive one hop.
    async fn do_exchange_hop(&mut self) -> Result<(), NetError> {
        let url = self.current_url()?.clone();
        let profile = self
            .profile
            .as_ref()
            .ok_or_else(|| NetError::InternalFault("fingerprint not resolved".into()))?
            .clone();
        let headers = self.build_hop_headers(&url)?;

        let response = self
            .exchange(&url, &profile, headers)
            .await?;

        tracing::debug!(
            url = %url,
            status = response.status.as_u16(),
            protocol = response.protocol(),
            "hop complete"
        );

        self.response = Some(response);
        self.state = State::UpdateCookieJar;
        Ok(())
    }

    fn do_update_cookie_jar(&mut self) -> Result<(), NetError> {
        if let (Some(session), Some(response)) = (&self.session, &self.response) {
            session.with_jar(|jar| {
                for value in response.headers.get_all(http::header::SET_COOKIE) {
                    match value.to_str() {
                        Ok(line) => jar.store_response_cookie(&response.final_url, line),
                        Err(_) => {
                            tracing::debug!("skipping non-ascii set-cookie header");
                        }
                    }
                }
            });
        }
        self.state = State::Redirect;
        Ok(())
    }

    fn do_redirect(&mut self) -> Result<(), NetError> {
        let response = self
            .response
            .as_ref()
            .ok_or_else(|| NetError::InternalFault("redirect without response".into()))?;

        if !response.status.is_redirection() || !self.effective_follow_redirects() {
            self.state = State::Done;
            return Ok(());
        }

        let location = match response
            .headers
            .get(http::header::LOCATION)
            .and_then(|v| v.to_str().ok())
        {
            Some(loc) => loc.to_string(),
            // A redirect status without Location is a final response.
            None => {
                self.state = State::Done;
                return Ok(());
            }
        };

        if self.hops >= DEFAULT_MAX_REDIRECTS {
            return Err(NetError::RedirectLoopExceeded(DEFAULT_MAX_REDIRECTS));
        }
        self.hops += 1;

        let current = self.current_url()?.clone();
        let next = current
            .join(&location)
            .map_err(|e| NetError::InvalidUrl(format!("redirect target {location}: {e}")))?;

        let (method, keep_body) = redirect_method(response.status, &self.method);
        if !keep_body {
            self.body = Bytes::new();
        }
        tracing::debug!(from = %current, to = %next, hop = self.hops, "following redirect");

        self.method = method;
        self.url = Some(next);
        self.response = None;
        self.state = State::Connect;
        Ok(())
    }

    fn effective_follow_redirects(&self) -> bool {
        self.input.follow_redirects
    }

    fn current_url(&self) -> Result<&Url, NetError> {
        self.url
            .as_ref()
            .ok_or_else(|| NetError::InternalFault("no url resolved".into()))
    }

    /// Assemble this hop's headers: caller headers in caller order, then
    /// Cookie computed from the jar and the explicit request cookies.
    fn build_hop_headers(&self, url: &Url) -> Result<OrderedHeaderMap, NetError> {
        let mut headers = OrderedHeaderMap::new();
        for (name, value) in &self.input.headers {
            headers.insert(name, value)?;
        }
        headers.apply_order(&self.input.header_order);

        let cookie_header = match &self.session {
            Some(session) => session.with_jar(|jar| jar.cookie_header(url)),
            None => {
                // Jar disabled: only the explicit cookies travel.
                let rendered: Vec<String> = self
                    .input
                    .request_cookies
                    .iter()
                    .filter(|c| !c.name.is_empty())
                    .map(|c| format!("{}={}", c.name, c.value))
                    .collect();
                (!rendered.is_empty()).then(|| rendered.join("; "))
            }
        };
        if let Some(value) = cookie_header {
            headers.insert("cookie", &value)?;
        }

        Ok(headers)
    }

    /// One network exchange against `url`.
    async fn exchange(
        &mut self,
        url: &Url,
        profile: &ClientProfile,
        headers: OrderedHeaderMap,
    ) -> Result<CollectedResponse, NetError> {
        // Reuse a live multiplexed connection when the session has one.
        let conn_key = self.connection_key(url, profile);
        if let Some(session) = &self.session {
            if let Some(handle) = session.cached_h2(&conn_key) {
                match handle.ready().await {
                    Ok(ready) => {
                        tracing::debug!(key = %conn_key, "reusing h2 connection");
                        return self.send_h2(ready, url, &headers).await;
                    }
                    Err(_) => session.evict_h2(&conn_key),
                }
            }
        }

        let socket = ConnectJob::connect(
            url,
            self.proxy.as_ref(),
            &profile.tls,
            &self.pinner,
            !self.input.insecure_skip_verify,
        )
        .await?;
        self.connected_flag.store(true, Ordering::Relaxed);

        let use_h2 = socket.negotiated_alpn().as_deref() == Some("h2");
        if use_h2 {
            let handle = self.h2_handshake(socket, &profile.h2).await?;
            let ready = handle
                .ready()
                .await
                .map_err(|e| NetError::Http(e.to_string()))?;
            if let Some(session) = &self.session {
                session.store_h2(conn_key, ready.clone());
            }
            self.send_h2(ready, url, &headers).await
        } else {
            self.send_h1(socket, url, &headers).await
        }
    }

    fn connection_key(&self, url: &Url, profile: &ClientProfile) -> String {
        format!(
            "{}|{}:{}|{}|{}|{}",
            url.scheme(),
            url.host_str().unwrap_or_default(),
            url.port_or_known_default().unwrap_or_default(),
            self.proxy
                .as_ref()
                .map(|p| p.url.as_str())
                .unwrap_or_default(),
            profile.name,
            self.input.insecure_skip_verify,
        )
    }

    /// HTTP/2 connection handshake with the profile's SETTINGS values, in
    /// the profile's order, plus its priority frames.
    async fn h2_handshake(
        &self,
        socket: SocketStream,
        fp: &H2Fingerprint,
    ) -> Result<http2::client::SendRequest<Bytes>, NetError> {
        let mut builder = http2::client::Builder::new();
        builder.initial_window_size(fp.initial_window_size);
        builder.initial_connection_window_size(fp.initial_conn_window_size);
        if let Some(size) = fp.header_table_size {
            builder.header_table_size(size);
        }
        if let Some(max) = fp.max_concurrent_streams {
            builder.max_concurrent_streams(max);
        }
        if let Some(size) = fp.max_frame_size {
            builder.max_frame_size(size);
        }
        if let Some(size) = fp.max_header_list_size {
            builder.max_header_list_size(size);
        }
        if let Some(enabled) = fp.enable_push {
            builder.enable_push(enabled);
        }
        if let Some(order) = &fp.settings_order {
            builder.settings_order(order.clone());
        }
        if let Some(order) = &fp.pseudo_order {
            builder.headers_pseudo_order(order.clone());
        }
        if let Some(priorities) = &fp.priorities {
            builder.priorities(priorities.clone());
        }

        let (send_request, connection) = builder
            .handshake::<_, Bytes>(socket)
            .await
            .map_err(|e| NetError::Http(format!("h2 handshake: {e}")))?;

        tokio::spawn(async move {
            if let Err(e) = connection.await {
                tracing::debug!(error = %e, "h2 connection closed");
            }
        });

        Ok(send_request)
    }

    async fn send_h2(
        &self,
        mut client: http2::client::SendRequest<Bytes>,
        url: &Url,
        headers: &OrderedHeaderMap,
    ) -> Result<CollectedResponse, NetError> {
        let mut request = http::Request::builder()
            .method(self.method.clone())
            .uri(url.as_str())
            .version(Version::HTTP_2)
            .body(())
            .map_err(|e| NetError::Http(e.to_string()))?;

        let mut header_map = headers.clone();
        // :authority replaces Host on h2.
        header_map.remove("host");
        *request.headers_mut() = header_map.to_header_map();

        let end_of_stream = self.body.is_empty();
        let (response_future, mut body_tx) = client
            .send_request(request, end_of_stream)
            .map_err(|e| NetError::Http(e.to_string()))?;

        if !end_of_stream {
            body_tx
                .send_data(self.body.clone(), true)
                .map_err(|e| NetError::Http(e.to_string()))?;
        }

        let response = response_future
            .await
            .map_err(|e| NetError::Http(e.to_string()))?;
        let (parts, mut recv_body) = response.into_parts();

        let mut collected = bytes::BytesMut::new();
        while let Some(chunk) = recv_body.data().await {
            let chunk = chunk.map_err(|e| NetError::Http(e.to_string()))?;
            let _ = recv_body.flow_control().release_capacity(chunk.len());
            collected.extend_from_slice(&chunk);
        }

        Ok(CollectedResponse {
            status: parts.status,
            version: Version::HTTP_2,
            headers: parts.headers,
            body: collected.freeze(),
            final_url: url.clone(),
        })
    }

    async fn send_h1(
        &self,
        socket: SocketStream,
        url: &Url,
        headers: &OrderedHeaderMap,
    ) -> Result<CollectedResponse, NetError> {
        let io = TokioIo::new(socket);
        let (mut sender, connection) = hyper::client::conn::http1::Builder::new()
            .title_case_headers(true)
            .preserve_header_case(true)
            .handshake::<_, http_body_util::Full<Bytes>>(io)
            .await
            .map_err(|e| NetError::Http(format!("h1 handshake: {e}")))?;

        tokio::spawn(async move {
            if let Err(e) = connection.await {
                tracing::debug!(error = %e, "h1 connection closed");
            }
        });

        // Absolute-form only for plain http through a forward proxy.
        let via_proxy = self.proxy.is_some() && url.scheme() == "http";
        let uri = if via_proxy {
            url.as_str().to_string()
        } else {
            let mut origin_form = url.path().to_string();
            if let Some(query) = url.query() {
                origin_form.push('?');
                origin_form.push_str(query);
            }
            origin_form
        };

        let mut header_map = headers.clone();
        if header_map.get("host").is_none() {
            let host = url
                .host_str()
                .ok_or_else(|| NetError::InvalidUrl(url.to_string()))?;
            let host_value = match url.port() {
                Some(port) => format!("{host}:{port}"),
                None => host.to_string(),
            };
            header_map.insert("host", &host_value)?;
        }
        if via_proxy {
            if let Some(auth) = self.proxy.as_ref().and_then(|p| p.auth_header()) {
                header_map.insert("proxy-authorization", &auth)?;
            }
        }

        let mut request = http::Request::builder()
            .method(self.method.clone())
            .uri(uri)
            .version(Version::HTTP_11)
            .body(http_body_util::Full::new(self.body.clone()))
            .map_err(|e| NetError::Http(e.to_string()))?;
        *request.headers_mut() = header_map.to_header_map();

        let response = sender
            .send_request(request)
            .await
            .map_err(|e| NetError::Http(e.to_string()))?;

        let (parts, body) = response.into_parts();
        let body = body
            .collect()
            .await
            .map_err(|e| NetError::Http(e.to_string()))?
            .to_bytes();

        Ok(CollectedResponse {
            status: parts.status,
            version: parts.version,
            headers: parts.headers,
            body,
            final_url: url.clone(),
        })
    }
}
