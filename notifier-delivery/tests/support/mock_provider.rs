//! Mock mail-send HTTP endpoint
//!
//! Accepts one request per connection, records it, and answers with the next
//! scripted status (the last status repeats once the script runs out).
//! [`SilentProvider`] accepts connections and never answers.
//!
//! ```rust,no_run
//! let provider = MockProvider::start(&[500, 202]).await?;
//! let transport =
//!     SendGridTransport::with_endpoint("key", &provider.endpoint(), DEFAULT_REQUEST_TIMEOUT)?;
//! ```

use std::{
    net::SocketAddr,
    sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    },
};

use tokio::{
    io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader},
    net::{TcpListener, TcpStream},
    sync::Mutex,
    task::JoinHandle,
};

/// A request as received by the mock provider.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    /// e.g. `POST /v3/mail/send HTTP/1.1`
    pub request_line: String,
    /// Header names lower-cased
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl RecordedRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }
}

pub struct MockProvider {
    addr: SocketAddr,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
    handle: JoinHandle<()>,
}

impl MockProvider {
    pub async fn start(statuses: &[u16]) -> std::io::Result<Self> {
        assert!(!statuses.is_empty(), "at least one status is required");

        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let requests = Arc::new(Mutex::new(Vec::new()));
        let statuses: Arc<[u16]> = Arc::from(statuses);
        let served = Arc::new(AtomicUsize::new(0));

        let handle = {
            let requests = requests.clone();
            tokio::spawn(async move {
                while let Ok((stream, _)) = listener.accept().await {
                    let index = served.fetch_add(1, Ordering::SeqCst);
                    let status = statuses[index.min(statuses.len() - 1)];
                    let requests = requests.clone();

                    tokio::spawn(async move {
                        let _ = handle_connection(stream, status, &requests).await;
                    });
                }
            })
        };

        Ok(Self {
            addr,
            requests,
            handle,
        })
    }

    /// Base URL to hand to the transport.
    pub fn endpoint(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub async fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().await.clone()
    }
}

impl Drop for MockProvider {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// Accepts connections, keeps them open, and never sends a byte back.
pub struct SilentProvider {
    addr: SocketAddr,
    accepted: Arc<AtomicUsize>,
    handle: JoinHandle<()>,
}

impl SilentProvider {
    pub async fn start() -> std::io::Result<Self> {
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let accepted = Arc::new(AtomicUsize::new(0));

        let handle = {
            let accepted = accepted.clone();
            tokio::spawn(async move {
                let mut held = Vec::new();
                while let Ok((stream, _)) = listener.accept().await {
                    accepted.fetch_add(1, Ordering::SeqCst);
                    held.push(stream);
                }
            })
        };

        Ok(Self {
            addr,
            accepted,
            handle,
        })
    }

    pub fn endpoint(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Number of connections accepted so far.
    pub fn accepted(&self) -> usize {
        self.accepted.load(Ordering::SeqCst)
    }
}

impl Drop for SilentProvider {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// Read one request, record it, then answer with `status`.
///
/// The request is recorded before the response is written so a client that
/// has seen the response can always find its request.
async fn handle_connection(
    stream: TcpStream,
    status: u16,
    requests: &Mutex<Vec<RecordedRequest>>,
) -> std::io::Result<()> {
    let mut reader = BufReader::new(stream);

    let mut request_line = String::new();
    reader.read_line(&mut request_line).await?;

    let mut headers = Vec::new();
    loop {
        let mut line = String::new();
        if reader.read_line(&mut line).await? == 0 {
            break;
        }
        let line = line.trim_end();
        if line.is_empty() {
            break;
        }
        if let Some((name, value)) = line.split_once(':') {
            headers.push((name.trim().to_ascii_lowercase(), value.trim().to_string()));
        }
    }

    let length = headers
        .iter()
        .find(|(name, _)| name == "content-length")
        .and_then(|(_, value)| value.parse::<usize>().ok())
        .unwrap_or(0);
    let mut body = vec![0; length];
    reader.read_exact(&mut body).await?;

    requests.lock().await.push(RecordedRequest {
        request_line: request_line.trim_end().to_string(),
        headers,
        body: String::from_utf8_lossy(&body).into_owned(),
    });

    let reply = format!("status {status}");
    let response = format!(
        "HTTP/1.1 {status} Mock\r\nContent-Type: text/plain\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{reply}",
        reply.len()
    );

    let mut stream = reader.into_inner();
    stream.write_all(response.as_bytes()).await?;
    stream.shutdown().await
}
