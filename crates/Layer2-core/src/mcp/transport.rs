//! Stdio Transport - NDJSON JSON-RPC over a child process
//!
//! ```text
//!            ┌──────── writer task ◀── mpsc ◀── request()/notify()
//!  stdin  ◀──┘
//!  stdout ──▶ reader task ──▶ NdjsonCodec ──▶ IncomingMessage ──▶ PendingRequests
//!  stderr ──▶ stderr task (debug log + ready marker)
//!  exit   ──▶ exit monitor (kill on close, reject pending)
//! ```
//!
//! 응답은 오직 id로만 매칭되므로 백엔드가 순서를 바꿔 응답해도 됩니다.

use super::framing::{Frame, NdjsonCodec};
use super::protocol::{
    IncomingMessage, JsonRpcError, JsonRpcNotification, JsonRpcReply, JsonRpcRequest,
    JSONRPC_VERSION,
};
use parking_lot::Mutex;
use serde_json::Value;
use std::collections::HashMap;
use std::process::Stdio;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use futures::StreamExt;
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::process::Command;
use tokio::sync::{broadcast, mpsc, oneshot, watch, Notify};
use tokio::task::JoinHandle;
use tokio_util::codec::FramedRead;
use toolgate_foundation::{Error, McpServer, Result};
use tracing::{debug, error, info, warn};

/// stdin 채널 버퍼
const WRITE_QUEUE: usize = 64;

/// 알림 채널 버퍼
const NOTIFICATION_QUEUE: usize = 32;

/// 종료 대기 상한
const EXIT_WAIT: Duration = Duration::from_secs(5);

/// 프로세스 종료 정보
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExitInfo {
    /// 종료 코드 (시그널 종료면 None)
    pub code: Option<i32>,
    /// `close()`로 인한 종료인지
    pub expected: bool,
}

type Waiter = oneshot::Sender<Result<Value>>;

struct PendingState {
    open: bool,
    waiters: HashMap<u64, Waiter>,
}

/// 대기 중인 요청 (id → waiter)
///
/// 각 항목은 응답, 타임아웃, 종료 중 정확히 한 번 제거됩니다.
pub(crate) struct PendingRequests {
    inner: Mutex<PendingState>,
}

impl PendingRequests {
    fn new() -> Self {
        Self {
            inner: Mutex::new(PendingState {
                open: true,
                waiters: HashMap::new(),
            }),
        }
    }

    /// 닫힌 뒤에는 등록 불가
    fn register(&self, id: u64) -> Option<oneshot::Receiver<Result<Value>>> {
        let mut state = self.inner.lock();
        if !state.open {
            return None;
        }
        let (tx, rx) = oneshot::channel();
        state.waiters.insert(id, tx);
        Some(rx)
    }

    fn settle(&self, id: u64, outcome: Result<Value>) -> bool {
        let waiter = self.inner.lock().waiters.remove(&id);
        match waiter {
            Some(tx) => {
                // 호출자가 이미 포기했으면 무시
                let _ = tx.send(outcome);
                true
            }
            None => false,
        }
    }

    fn remove(&self, id: u64) -> bool {
        self.inner.lock().waiters.remove(&id).is_some()
    }

    /// 모두 거부하고 닫음
    fn reject_all(&self, make_error: impl Fn() -> Error) -> usize {
        let drained: Vec<Waiter> = {
            let mut state = self.inner.lock();
            state.open = false;
            state.waiters.drain().map(|(_, tx)| tx).collect()
        };
        let count = drained.len();
        for tx in drained {
            let _ = tx.send(Err(make_error()));
        }
        count
    }

    fn len(&self) -> usize {
        self.inner.lock().waiters.len()
    }

    fn contains(&self, id: u64) -> bool {
        self.inner.lock().waiters.contains_key(&id)
    }
}

/// 백엔드와의 JSON-RPC 연결
pub struct StdioTransport {
    server: String,
    next_id: AtomicU64,
    writer_tx: mpsc::Sender<String>,
    pending: Arc<PendingRequests>,
    request_timeout: Duration,
    ready_marker: Option<Arc<Notify>>,
    kill_tx: Mutex<Option<oneshot::Sender<()>>>,
    exit_rx: watch::Receiver<Option<ExitInfo>>,
    closed_rx: watch::Receiver<bool>,
    notification_tx: broadcast::Sender<String>,
    tasks: Mutex<Vec<JoinHandle<()>>>,
}

impl StdioTransport {
    /// 프로세스 실행 후 연결
    pub fn spawn(server: &str, config: &McpServer, request_timeout: Duration) -> Result<Self> {
        info!("Spawning backend '{}': {} {:?}", server, config.command, config.args);

        let mut cmd = Command::new(&config.command);
        cmd.args(&config.args)
            .envs(config.expand_env())
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        if let Some(cwd) = &config.cwd {
            cmd.current_dir(cwd);
        }

        let mut child = cmd
            .spawn()
            .map_err(|e| Error::spawn(server, format!("{}: {}", config.command, e)))?;

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| Error::spawn(server, "failed to capture stdin"))?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| Error::spawn(server, "failed to capture stdout"))?;
        let stderr = child
            .stderr
            .take()
            .ok_or_else(|| Error::spawn(server, "failed to capture stderr"))?;

        let mut transport = Self::from_io(server, stdout, stdin, request_timeout);

        // stderr: 로그 + 준비 신호
        let marker = config.ready_marker.clone().filter(|m| !m.is_empty());
        let notify = marker.as_ref().map(|_| Arc::new(Notify::new()));
        transport.ready_marker = notify.clone();
        let stderr_task = tokio::spawn(stderr_loop(server.to_string(), stderr, marker, notify));
        transport.tasks.lock().push(stderr_task);

        // 종료 감시
        let (kill_tx, kill_rx) = oneshot::channel::<()>();
        let (exit_tx, exit_rx) = watch::channel(None);
        let pending = Arc::clone(&transport.pending);
        let name = server.to_string();
        tokio::spawn(async move {
            let (status, expected) = tokio::select! {
                status = child.wait() => (status, false),
                _ = kill_rx => {
                    if let Err(e) = child.start_kill() {
                        debug!("[{}] kill: {}", name, e);
                    }
                    (child.wait().await, true)
                }
            };
            let code = match status {
                Ok(s) => s.code(),
                Err(e) => {
                    error!("[{}] failed to wait for process: {}", name, e);
                    None
                }
            };

            let rejected = pending.reject_all(|| Error::exited(&name, "process exited"));
            if expected {
                info!("Backend '{}' stopped", name);
            } else {
                warn!(
                    "Backend '{}' exited (code {:?}), rejected {} pending requests",
                    name, code, rejected
                );
            }
            let _ = exit_tx.send(Some(ExitInfo { code, expected }));
        });

        *transport.kill_tx.lock() = Some(kill_tx);
        transport.exit_rx = exit_rx;
        Ok(transport)
    }

    /// 임의의 읽기/쓰기 스트림으로 연결 (테스트, 인프로세스 백엔드)
    pub fn from_io<R, W>(server: &str, reader: R, writer: W, request_timeout: Duration) -> Self
    where
        R: AsyncRead + Unpin + Send + 'static,
        W: AsyncWrite + Unpin + Send + 'static,
    {
        let (writer_tx, writer_rx) = mpsc::channel::<String>(WRITE_QUEUE);
        let (closed_tx, closed_rx) = watch::channel(false);
        let pending = Arc::new(PendingRequests::new());
        let (notification_tx, _) = broadcast::channel(NOTIFICATION_QUEUE);

        let writer_task = tokio::spawn(writer_loop(server.to_string(), writer, writer_rx));
        let reader_task = tokio::spawn(reader_loop(
            server.to_string(),
            reader,
            Arc::clone(&pending),
            writer_tx.clone(),
            notification_tx.clone(),
            closed_tx,
        ));

        // 프로세스가 없으면 종료 이벤트도 없음
        let (_exit_tx, exit_rx) = watch::channel(None);

        Self {
            server: server.to_string(),
            next_id: AtomicU64::new(1),
            writer_tx,
            pending,
            request_timeout,
            ready_marker: None,
            kill_tx: Mutex::new(None),
            exit_rx,
            closed_rx,
            notification_tx,
            tasks: Mutex::new(vec![writer_task, reader_task]),
        }
    }

    pub fn server(&self) -> &str {
        &self.server
    }

    pub fn request_timeout(&self) -> Duration {
        self.request_timeout
    }

    /// 요청 전송 후 응답 대기 (기본 타임아웃)
    pub async fn request(&self, method: &str, params: Option<Value>) -> Result<Value> {
        self.request_with_timeout(method, params, self.request_timeout)
            .await
    }

    /// 요청 전송 후 응답 대기
    pub async fn request_with_timeout(
        &self,
        method: &str,
        params: Option<Value>,
        timeout: Duration,
    ) -> Result<Value> {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let rx = self
            .pending
            .register(id)
            .ok_or_else(|| Error::exited(&self.server, "transport closed"))?;

        let line = serde_json::to_string(&JsonRpcRequest::new(id, method, params))?;
        debug!("[{}] -> #{} {}", self.server, id, method);

        if self.writer_tx.send(line).await.is_err() {
            self.pending.remove(id);
            return Err(Error::exited(&self.server, "stdin closed"));
        }

        match tokio::time::timeout(timeout, rx).await {
            Ok(Ok(outcome)) => outcome,
            Ok(Err(_)) => Err(Error::exited(&self.server, "response channel closed")),
            Err(_) => {
                self.pending.remove(id);
                warn!("[{}] #{} {} timed out", self.server, id, method);
                Err(Error::RequestTimeout {
                    server: self.server.clone(),
                    method: method.to_string(),
                    timeout_ms: timeout.as_millis() as u64,
                })
            }
        }
    }

    /// 알림 전송 (응답 없음)
    pub async fn notify(&self, method: &str, params: Option<Value>) -> Result<()> {
        let line = serde_json::to_string(&JsonRpcNotification::new(method, params))?;
        debug!("[{}] -> {}", self.server, method);
        self.writer_tx
            .send(line)
            .await
            .map_err(|_| Error::exited(&self.server, "stdin closed"))
    }

    /// 백엔드가 보낸 알림의 method 스트림
    pub fn subscribe_notifications(&self) -> broadcast::Receiver<String> {
        self.notification_tx.subscribe()
    }

    /// stderr 준비 신호 (설정된 경우)
    pub fn ready_marker(&self) -> Option<Arc<Notify>> {
        self.ready_marker.clone()
    }

    /// 프로세스 종료 대기
    pub async fn exited(&self) -> Option<ExitInfo> {
        let mut rx = self.exit_rx.clone();
        let info = match rx.wait_for(|info| info.is_some()).await {
            Ok(info) => *info,
            Err(_) => None,
        };
        info
    }

    /// 종료 정보 (아직 실행 중이면 None)
    pub fn exit_info(&self) -> Option<ExitInfo> {
        *self.exit_rx.borrow()
    }

    /// stdout이 닫혔는지
    pub fn is_closed(&self) -> bool {
        *self.closed_rx.borrow()
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    pub fn is_pending(&self, id: u64) -> bool {
        self.pending.contains(id)
    }

    /// 연결 종료: 대기 요청 거부, 프로세스 종료, 태스크 정리 (멱등)
    pub async fn close(&self) {
        let rejected = self
            .pending
            .reject_all(|| Error::exited(&self.server, "transport closed"));
        if rejected > 0 {
            debug!("[{}] rejected {} pending requests on close", self.server, rejected);
        }

        let kill = self.kill_tx.lock().take();
        if let Some(kill) = kill {
            let _ = kill.send(());
            if tokio::time::timeout(EXIT_WAIT, self.exited()).await.is_err() {
                warn!("[{}] process did not exit within {:?}", self.server, EXIT_WAIT);
            }
        }

        for task in self.tasks.lock().drain(..) {
            task.abort();
        }
    }
}

impl Drop for StdioTransport {
    fn drop(&mut self) {
        for task in self.tasks.lock().drain(..) {
            task.abort();
        }
    }
}

async fn writer_loop<W>(server: String, mut writer: W, mut rx: mpsc::Receiver<String>)
where
    W: AsyncWrite + Unpin,
{
    while let Some(mut line) = rx.recv().await {
        line.push('\n');
        if let Err(e) = writer.write_all(line.as_bytes()).await {
            warn!("[{}] failed to write to stdin: {}", server, e);
            break;
        }
        if let Err(e) = writer.flush().await {
            warn!("[{}] failed to flush stdin: {}", server, e);
            break;
        }
    }
    debug!("[{}] stdin writer finished", server);
}

async fn reader_loop<R>(
    server: String,
    reader: R,
    pending: Arc<PendingRequests>,
    writer_tx: mpsc::Sender<String>,
    notification_tx: broadcast::Sender<String>,
    closed_tx: watch::Sender<bool>,
) where
    R: AsyncRead + Unpin,
{
    let mut frames = FramedRead::new(reader, NdjsonCodec::new());

    while let Some(frame) = frames.next().await {
        match frame {
            Ok(Frame::Line(line)) => {
                dispatch_line(&server, &line, &pending, &writer_tx, &notification_tx).await
            }
            Ok(Frame::Skipped(reason)) => warn!("[{}] dropping stdout data: {}", server, reason),
            Err(e) => {
                warn!("[{}] stdout read error: {}", server, e);
                break;
            }
        }
    }

    let rejected = pending.reject_all(|| Error::exited(&server, "stdout closed"));
    if rejected > 0 {
        warn!("[{}] stdout closed with {} pending requests", server, rejected);
    }
    let _ = closed_tx.send(true);
    debug!("[{}] stdout reader finished", server);
}

async fn dispatch_line(
    server: &str,
    line: &str,
    pending: &PendingRequests,
    writer_tx: &mpsc::Sender<String>,
    notification_tx: &broadcast::Sender<String>,
) {
    let message = match IncomingMessage::parse(line) {
        Ok(m) => m,
        Err(e) => {
            warn!("[{}] dropping malformed line ({}): {}", server, e, line);
            return;
        }
    };

    match message {
        IncomingMessage::Response { id, outcome } => {
            debug!("[{}] <- #{}", server, id);
            if !pending.settle(id, outcome.map_err(Error::from)) {
                warn!("[{}] response for unknown request #{} dropped", server, id);
            }
        }
        IncomingMessage::Request { id, method } => {
            debug!("[{}] server request '{}' not supported", server, method);
            let reply = JsonRpcReply {
                jsonrpc: JSONRPC_VERSION.to_string(),
                id,
                error: JsonRpcError::method_not_found(&method),
            };
            match serde_json::to_string(&reply) {
                Ok(line) => {
                    let _ = writer_tx.send(line).await;
                }
                Err(e) => warn!("[{}] failed to encode reply: {}", server, e),
            }
        }
        IncomingMessage::Notification { method, .. } => {
            debug!("[{}] notification: {}", server, method);
            // 구독자가 없으면 버림
            let _ = notification_tx.send(method);
        }
    }
}

async fn stderr_loop<R>(
    server: String,
    stderr: R,
    marker: Option<String>,
    notify: Option<Arc<Notify>>,
) where
    R: AsyncRead + Unpin,
{
    let mut lines = BufReader::new(stderr).lines();
    let mut signalled = false;

    loop {
        match lines.next_line().await {
            Ok(Some(line)) => {
                debug!("[{}] stderr: {}", server, line);
                if signalled {
                    continue;
                }
                if let (Some(marker), Some(notify)) = (&marker, &notify) {
                    if line.contains(marker.as_str()) {
                        signalled = true;
                        notify.notify_one();
                    }
                }
            }
            Ok(None) => break,
            Err(e) => {
                debug!("[{}] stderr read error: {}", server, e);
                break;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tokio::io::{duplex, DuplexStream};

    /// (transport, 백엔드 쪽 stdin 리더, 백엔드 쪽 stdout 라이터)
    fn pair(timeout: Duration) -> (StdioTransport, BufReader<DuplexStream>, DuplexStream) {
        let (client_out, backend_in) = duplex(64 * 1024);
        let (backend_out, client_in) = duplex(64 * 1024);
        let transport = StdioTransport::from_io("mock", client_in, client_out, timeout);
        (transport, BufReader::new(backend_in), backend_out)
    }

    async fn read_request(reader: &mut BufReader<DuplexStream>) -> Value {
        let mut line = String::new();
        reader.read_line(&mut line).await.unwrap();
        serde_json::from_str(&line).unwrap()
    }

    async fn respond(writer: &mut DuplexStream, id: u64, result: Value) {
        let line = json!({"jsonrpc": "2.0", "id": id, "result": result}).to_string() + "\n";
        writer.write_all(line.as_bytes()).await.unwrap();
    }

    #[tokio::test]
    async fn test_out_of_order_responses() {
        let (transport, mut backend_in, mut backend_out) = pair(Duration::from_secs(5));
        let transport = Arc::new(transport);

        let t1 = Arc::clone(&transport);
        let first = tokio::spawn(async move { t1.request("first", None).await });
        let req1 = read_request(&mut backend_in).await;

        let t2 = Arc::clone(&transport);
        let second = tokio::spawn(async move { t2.request("second", None).await });
        let req2 = read_request(&mut backend_in).await;

        let id1 = req1["id"].as_u64().unwrap();
        let id2 = req2["id"].as_u64().unwrap();
        assert!(id2 > id1);

        // 나중 요청에 먼저 응답
        respond(&mut backend_out, id2, json!("for-second")).await;
        respond(&mut backend_out, id1, json!("for-first")).await;

        assert_eq!(second.await.unwrap().unwrap(), json!("for-second"));
        assert_eq!(first.await.unwrap().unwrap(), json!("for-first"));
        assert_eq!(transport.pending_count(), 0);
    }

    #[tokio::test]
    async fn test_timeout_removes_pending() {
        let (transport, mut backend_in, _backend_out) = pair(Duration::from_millis(50));

        let err = transport.request("slow", None).await.unwrap_err();
        assert!(matches!(err, Error::RequestTimeout { timeout_ms: 50, .. }));

        let req = read_request(&mut backend_in).await;
        assert!(!transport.is_pending(req["id"].as_u64().unwrap()));
        assert_eq!(transport.pending_count(), 0);
    }

    #[tokio::test]
    async fn test_late_response_is_dropped() {
        let (transport, mut backend_in, mut backend_out) = pair(Duration::from_millis(50));
        assert!(transport.request("slow", None).await.is_err());
        let req = read_request(&mut backend_in).await;

        // 타임아웃 후 도착한 응답은 무시되고 다음 요청은 정상 처리
        respond(&mut backend_out, req["id"].as_u64().unwrap(), json!(1)).await;

        let transport = Arc::new(transport);
        let t = Arc::clone(&transport);
        let next = tokio::spawn(async move { t.request_with_timeout("next", None, Duration::from_secs(5)).await });
        let req = read_request(&mut backend_in).await;
        respond(&mut backend_out, req["id"].as_u64().unwrap(), json!(2)).await;
        assert_eq!(next.await.unwrap().unwrap(), json!(2));
    }

    #[tokio::test]
    async fn test_rpc_error_and_malformed_lines() {
        let (transport, mut backend_in, mut backend_out) = pair(Duration::from_secs(5));
        let transport = Arc::new(transport);

        let t = Arc::clone(&transport);
        let call = tokio::spawn(async move { t.request("tools/call", Some(json!({}))).await });
        let req = read_request(&mut backend_in).await;
        let id = req["id"].as_u64().unwrap();

        let noise = format!(
            "garbage\n\n{{\"jsonrpc\":\"2.0\",\"method\":\"notifications/message\"}}\n{{\"jsonrpc\":\"2.0\",\"id\":{},\"error\":{{\"code\":-32602,\"message\":\"bad\"}}}}\n",
            id
        );
        backend_out.write_all(noise.as_bytes()).await.unwrap();

        let err = call.await.unwrap().unwrap_err();
        assert!(matches!(err, Error::Rpc { code: -32602, .. }));
    }

    #[tokio::test]
    async fn test_split_crlf_response() {
        let (transport, mut backend_in, mut backend_out) = pair(Duration::from_secs(5));
        let transport = Arc::new(transport);

        let t = Arc::clone(&transport);
        let call = tokio::spawn(async move { t.request("split", None).await });
        let id = read_request(&mut backend_in).await["id"].as_u64().unwrap();

        let line = format!("{{\"jsonrpc\":\"2.0\",\"id\":{},\"result\":\"ok\"}}\r\n", id);
        let (a, b) = line.split_at(line.len() / 2);
        backend_out.write_all(b"\r\n").await.unwrap();
        backend_out.write_all(a.as_bytes()).await.unwrap();
        tokio::task::yield_now().await;
        backend_out.write_all(b.as_bytes()).await.unwrap();

        assert_eq!(call.await.unwrap().unwrap(), json!("ok"));
    }

    #[tokio::test]
    async fn test_oversized_line_dropped_and_stream_continues() {
        let (transport, mut backend_in, mut backend_out) = pair(Duration::from_secs(30));
        let transport = Arc::new(transport);

        let t = Arc::clone(&transport);
        let call = tokio::spawn(async move { t.request("after_huge", None).await });
        let id = read_request(&mut backend_in).await["id"].as_u64().unwrap();

        let mut huge = vec![b'x'; crate::mcp::framing::MAX_LINE_LENGTH + 1];
        huge.push(b'\n');
        backend_out.write_all(&huge).await.unwrap();
        respond(&mut backend_out, id, json!("still-alive")).await;

        assert_eq!(call.await.unwrap().unwrap(), json!("still-alive"));
        assert!(!transport.is_closed());
    }

    #[tokio::test]
    async fn test_notifications_are_broadcast() {
        let (transport, _backend_in, mut backend_out) = pair(Duration::from_secs(5));
        let mut rx = transport.subscribe_notifications();

        backend_out
            .write_all(b"{\"jsonrpc\":\"2.0\",\"method\":\"notifications/tools/list_changed\"}\n")
            .await
            .unwrap();

        let method = tokio::time::timeout(Duration::from_secs(5), rx.recv())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(method, "notifications/tools/list_changed");
    }

    #[tokio::test]
    async fn test_server_request_gets_method_not_found() {
        let (_transport, mut backend_in, mut backend_out) = pair(Duration::from_secs(5));
        backend_out
            .write_all(b"{\"jsonrpc\":\"2.0\",\"id\":\"srv-1\",\"method\":\"sampling/createMessage\"}\n")
            .await
            .unwrap();

        let reply = read_request(&mut backend_in).await;
        assert_eq!(reply["id"], "srv-1");
        assert_eq!(reply["error"]["code"], -32601);
    }

    #[tokio::test]
    async fn test_eof_rejects_pending() {
        let (transport, mut backend_in, backend_out) = pair(Duration::from_secs(5));
        let transport = Arc::new(transport);

        let t = Arc::clone(&transport);
        let call = tokio::spawn(async move { t.request("hang", None).await });
        read_request(&mut backend_in).await;
        drop(backend_out);

        let err = call.await.unwrap().unwrap_err();
        assert!(matches!(err, Error::BackendExited { .. }));
        assert_eq!(transport.pending_count(), 0);

        // 닫힌 뒤에는 즉시 거부
        let err = transport.request("after", None).await.unwrap_err();
        assert!(matches!(err, Error::BackendExited { .. }));
    }

    #[tokio::test]
    async fn test_close_rejects_pending_and_is_idempotent() {
        let (transport, mut backend_in, _backend_out) = pair(Duration::from_secs(5));
        let transport = Arc::new(transport);

        let t = Arc::clone(&transport);
        let call = tokio::spawn(async move { t.request("hang", None).await });
        read_request(&mut backend_in).await;

        transport.close().await;
        transport.close().await;

        assert!(matches!(call.await.unwrap(), Err(Error::BackendExited { .. })));
        assert_eq!(transport.pending_count(), 0);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_exited_reports_process_exit() {
        let config = McpServer::new("sh").arg("-c").arg("exit 7");
        let transport = StdioTransport::spawn("short", &config, Duration::from_secs(5)).unwrap();

        let info = tokio::time::timeout(Duration::from_secs(5), transport.exited())
            .await
            .unwrap();
        assert_eq!(info, Some(ExitInfo { code: Some(7), expected: false }));
        assert_eq!(transport.exit_info(), info);
    }

    #[tokio::test]
    async fn test_exited_without_process_is_none() {
        let (transport, _backend_in, _backend_out) = pair(Duration::from_secs(5));
        assert_eq!(transport.exited().await, None);
    }

    #[tokio::test]
    async fn test_notification_has_no_id() {
        let (transport, mut backend_in, _backend_out) = pair(Duration::from_secs(5));
        transport.notify("notifications/initialized", None).await.unwrap();
        let msg = read_request(&mut backend_in).await;
        assert_eq!(msg["method"], "notifications/initialized");
        assert!(msg.get("id").is_none());
    }
}
