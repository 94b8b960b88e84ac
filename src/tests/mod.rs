use std::net::SocketAddr;
use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;

use crate::probe::{headers::parse_header_directives, ClientConfig, ProbeError, Prober};
use crate::runner::{Options, Runner, TargetSource};

// A tiny HTTP/1.1 responder. TLS handshakes are dropped on the first byte so
// https candidates against it fail straight away.
struct Fixture {
    addr: SocketAddr,
    requests: mpsc::UnboundedReceiver<String>,
}

impl Fixture {
    async fn start(status: &'static str, extra_headers: &'static str, body: &'static str) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let (tx, requests) = mpsc::unbounded_channel();
        tokio::spawn(async move {
            loop {
                let Ok((stream, _)) = listener.accept().await else {
                    return;
                };
                let tx = tx.clone();
                tokio::spawn(handle(stream, tx, status, extra_headers, body));
            }
        });
        Self { addr, requests }
    }

    fn port(&self) -> String {
        self.addr.port().to_string()
    }

    fn url(&self) -> String {
        format!("http://{}", self.addr)
    }
}

async fn handle(
    mut stream: TcpStream,
    tx: mpsc::UnboundedSender<String>,
    status: &'static str,
    extra_headers: &'static str,
    body: &'static str,
) {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 1024];
    loop {
        let n = match stream.read(&mut chunk).await {
            Ok(0) | Err(_) => return,
            Ok(n) => n,
        };
        if buf.is_empty() && chunk[0] == 0x16 {
            return;
        }
        buf.extend_from_slice(&chunk[..n]);
        if buf.windows(4).any(|w| w == b"\r\n\r\n") {
            break;
        }
    }
    let _ = tx.send(String::from_utf8_lossy(&buf).to_string());

    let response = format!(
        "HTTP/1.1 {status}\r\nContent-Type: text/html\r\nContent-Length: {}\r\n{extra_headers}Connection: close\r\n\r\n{body}",
        body.len()
    );
    let _ = stream.write_all(response.as_bytes()).await;
    let _ = stream.shutdown().await;
}

fn client_config(headers: &[&str]) -> ClientConfig {
    let raw: Vec<String> = headers.iter().map(|h| h.to_string()).collect();
    ClientConfig {
        timeout: Duration::from_secs(2),
        insecure: true,
        follow_redirects: true,
        user_agent: "pokehttp-test".to_string(),
        headers: parse_header_directives(&raw),
    }
}

#[tokio::test]
async fn probe_reports_status_size_and_title() {
    let body = "<html><head><title>Fixture\nPage</title></head><body>hi</body></html>";
    let fixture = Fixture::start("200 OK", "", body).await;
    let prober = Prober::new(client_config(&[])).unwrap();

    let result = prober.probe(&fixture.url()).await.unwrap();
    assert_eq!(result.url, fixture.url());
    assert_eq!(result.status, 200);
    assert_eq!(result.size, body.len());
    assert_eq!(result.title, "FixturePage");
}

#[tokio::test]
async fn non_success_status_is_still_a_result() {
    let fixture = Fixture::start("404 Not Found", "", "").await;
    let prober = Prober::new(client_config(&[])).unwrap();

    let result = prober.probe(&fixture.url()).await.unwrap();
    assert_eq!(result.status, 404);
    assert_eq!(result.size, 0);
    assert_eq!(result.title, "");
}

#[tokio::test]
async fn redirects_are_reported_when_not_followed() {
    let fixture = Fixture::start(
        "301 Moved Permanently",
        "Location: http://127.0.0.1:1/\r\n",
        "",
    )
    .await;
    let mut config = client_config(&[]);
    config.follow_redirects = false;
    let prober = Prober::new(config).unwrap();

    let result = prober.probe(&fixture.url()).await.unwrap();
    assert_eq!(result.status, 301);
}

#[tokio::test]
async fn host_directive_and_extra_headers_reach_the_wire() {
    let mut fixture = Fixture::start("200 OK", "", "ok").await;
    let prober = Prober::new(client_config(&[
        "Host: example.com",
        "X-Foo:",
        "User-Agent: someone-else",
    ]))
    .unwrap();

    prober.probe(&fixture.url()).await.unwrap();
    let request = fixture.requests.recv().await.unwrap().to_ascii_lowercase();

    assert_eq!(request.matches("\r\nhost:").count(), 1);
    assert!(request.contains("\r\nhost: example.com\r\n"));
    assert!(request.contains("\r\nx-foo:"));
    assert!(request.contains("\r\nuser-agent: pokehttp-test\r\n"));
    assert!(!request.contains("someone-else"));
}

#[tokio::test]
async fn silent_server_times_out() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let mut held = Vec::new();
        while let Ok((stream, _)) = listener.accept().await {
            held.push(stream);
        }
    });

    let mut config = client_config(&[]);
    config.timeout = Duration::from_secs(1);
    let prober = Prober::new(config).unwrap();

    let outcome = tokio::time::timeout(
        Duration::from_secs(5),
        prober.probe(&format!("http://{addr}")),
    )
    .await
    .expect("probe should give up on its own");
    let err = outcome.unwrap_err();
    assert!(matches!(err, ProbeError::Request { .. }));
    assert!(err.is_timeout());
}

#[tokio::test]
async fn runner_prints_one_line_per_reachable_endpoint() {
    let fixture = Fixture::start(
        "200 OK",
        "",
        "<html><title>Fixture</title></html>",
    )
    .await;
    let mirror_path = std::env::temp_dir().join(format!("pokehttp-test-{}.txt", fixture.port()));
    let _ = std::fs::remove_file(&mirror_path);

    let runner = Runner::new(Options {
        targets: TargetSource::Inline(vec![
            "127.0.0.1".to_string(),
            "   ".to_string(),
            format!("{}/direct", fixture.url()),
        ]),
        concurrency: 2,
        timeout_seconds: 2,
        ports: vec![fixture.port()],
        output: Some(mirror_path.to_string_lossy().to_string()),
        ..Options::default()
    })
    .unwrap();

    let (writer, mut reader) = tokio::io::duplex(64 * 1024);
    let summary = runner.run_with_writer(writer).await.unwrap();

    let mut printed = String::new();
    reader.read_to_string(&mut printed).await.unwrap();
    let mut lines: Vec<&str> = printed.lines().collect();
    lines.sort();

    let size = "<html><title>Fixture</title></html>".len();
    assert_eq!(
        lines,
        vec![
            format!("http://127.0.0.1:{} 200 {size} Fixture", fixture.port()),
            format!("{}/direct 200 {size} Fixture", fixture.url()),
        ]
    );
    assert_eq!(summary.targets, 2);
    assert_eq!(summary.probes, 3);
    assert_eq!(summary.results, 2);

    let mirrored = std::fs::read_to_string(&mirror_path).unwrap();
    assert_eq!(mirrored.lines().count(), 2);
    let _ = std::fs::remove_file(&mirror_path);
}

#[tokio::test]
async fn runner_with_no_targets_prints_nothing() {
    let runner = Runner::new(Options {
        targets: TargetSource::Inline(Vec::new()),
        concurrency: 4,
        ..Options::default()
    })
    .unwrap();

    let (writer, mut reader) = tokio::io::duplex(1024);
    let summary = runner.run_with_writer(writer).await.unwrap();

    let mut printed = String::new();
    reader.read_to_string(&mut printed).await.unwrap();
    assert!(printed.is_empty());
    assert_eq!(summary.targets, 0);
    assert_eq!(summary.results, 0);
}
