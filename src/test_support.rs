use std::{
    collections::VecDeque,
    net::SocketAddr,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc, Mutex,
    },
};

use async_trait::async_trait;
use futures_util::stream;
use tokio::{
    io::{AsyncReadExt, AsyncWriteExt},
    net::TcpListener,
    sync::oneshot,
};
use url::Url;

use crate::{
    backend::{
        connector::{EventStreamConnector, RawEventStream, TransportError},
        gateway::{BackendGateway, GatewayError},
    },
    domain::session::ChatId,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedSubmit {
    pub chat_id: String,
    pub text: String,
    pub is_final: bool,
}

/// Gateway double that records every call and answers with a fixed outcome.
#[derive(Debug, Clone, Default)]
pub struct RecordingGateway {
    calls: Arc<Mutex<Vec<RecordedSubmit>>>,
    fail: bool,
}

impl RecordingGateway {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn calls(&self) -> Vec<RecordedSubmit> {
        self.calls.lock().expect("calls lock").clone()
    }
}

#[async_trait]
impl BackendGateway for RecordingGateway {
    async fn submit(
        &self,
        chat_id: &ChatId,
        text: &str,
        is_final: bool,
    ) -> Result<(), GatewayError> {
        self.calls.lock().expect("calls lock").push(RecordedSubmit {
            chat_id: chat_id.to_string(),
            text: text.to_owned(),
            is_final,
        });

        if self.fail {
            Err(GatewayError::Rejected { status: 503 })
        } else {
            Ok(())
        }
    }
}

#[derive(Debug, Clone)]
pub enum ScriptStep {
    /// Subscription is rejected.
    Refuse,
    /// Subscription succeeds, yields these payloads, then the server closes.
    Serve(Vec<&'static str>),
}

/// Connector double that plays one step per connect. Once the script is
/// exhausted, connections succeed and stay silent.
#[derive(Debug)]
pub struct ScriptedConnector {
    steps: Mutex<VecDeque<ScriptStep>>,
    connects: AtomicUsize,
}

impl ScriptedConnector {
    pub fn new(steps: Vec<ScriptStep>) -> Self {
        Self {
            steps: Mutex::new(steps.into()),
            connects: AtomicUsize::new(0),
        }
    }

    pub fn connect_count(&self) -> usize {
        self.connects.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl EventStreamConnector for ScriptedConnector {
    async fn connect(&self, _chat_id: &ChatId) -> Result<RawEventStream, TransportError> {
        self.connects.fetch_add(1, Ordering::SeqCst);
        let step = self.steps.lock().expect("steps lock").pop_front();

        let stream: RawEventStream = match step {
            Some(ScriptStep::Refuse) => return Err(TransportError::Rejected { status: 503 }),
            Some(ScriptStep::Serve(payloads)) => Box::pin(stream::iter(
                payloads.into_iter().map(|payload| Ok(payload.to_owned())),
            )),
            None => Box::pin(stream::pending()),
        };
        Ok(stream)
    }
}

/// Single-shot HTTP server on loopback that captures one request and answers
/// with a canned response.
pub struct FakeHttpServer {
    addr: SocketAddr,
    request_rx: oneshot::Receiver<String>,
}

impl FakeHttpServer {
    pub async fn respond_with(response: &'static str) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("loopback listener should bind");
        let addr = listener.local_addr().expect("listener address");
        let (request_tx, request_rx) = oneshot::channel();

        tokio::spawn(async move {
            let Ok((mut socket, _)) = listener.accept().await else {
                return;
            };
            let request = read_request(&mut socket).await;
            let _ = socket.write_all(response.as_bytes()).await;
            let _ = socket.shutdown().await;
            let _ = request_tx.send(request);
        });

        Self { addr, request_rx }
    }

    /// A loopback address nobody listens on.
    pub async fn unused_base_url() -> Url {
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("loopback listener should bind");
        let addr = listener.local_addr().expect("listener address");
        drop(listener);
        Url::parse(&format!("http://{addr}")).expect("valid url")
    }

    pub fn base_url(&self) -> Url {
        Url::parse(&format!("http://{}", self.addr)).expect("valid url")
    }

    pub async fn received_request(self) -> String {
        self.request_rx.await.expect("request should be captured")
    }
}

async fn read_request(socket: &mut tokio::net::TcpStream) -> String {
    let mut raw = Vec::new();
    let mut chunk = [0u8; 1024];

    loop {
        let read = socket.read(&mut chunk).await.unwrap_or(0);
        if read == 0 {
            break;
        }
        raw.extend_from_slice(&chunk[..read]);

        let text = String::from_utf8_lossy(&raw);
        if let Some(header_end) = text.find("\r\n\r\n") {
            let body_len = content_length(&text[..header_end]);
            if raw.len() >= header_end + 4 + body_len {
                break;
            }
        }
    }

    String::from_utf8_lossy(&raw).into_owned()
}

fn content_length(headers: &str) -> usize {
    headers
        .lines()
        .filter_map(|line| line.split_once(':'))
        .find(|(name, _)| name.trim().eq_ignore_ascii_case("content-length"))
        .and_then(|(_, value)| value.trim().parse().ok())
        .unwrap_or(0)
}
