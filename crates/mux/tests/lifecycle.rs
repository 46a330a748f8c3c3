use simplemux::handler::handler_fn;
use simplemux::{Multiplexer, MuxConfig, ReqBody, RequestContext, ServerError, ServerState};
use std::io::{Read, Write};
use std::net::{SocketAddr, TcpStream};
use std::thread;
use std::time::{Duration, Instant};

fn get(addr: SocketAddr, path: &str) -> String {
    let mut stream = TcpStream::connect(addr).unwrap();
    stream.set_read_timeout(Some(Duration::from_secs(10))).unwrap();
    let request = format!("GET {path} HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n");
    stream.write_all(request.as_bytes()).unwrap();

    let mut response = String::new();
    stream.read_to_string(&mut response).unwrap();
    response
}

fn slow_mux(delay: Duration) -> Multiplexer {
    let mut mux = Multiplexer::new();
    mux.get("/", handler_fn(|_req: RequestContext, _body: ReqBody| async { "ok" })).unwrap();
    mux.get(
        "/slow",
        handler_fn(move |_req: RequestContext, _body: ReqBody| async move {
            tokio::time::sleep(delay).await;
            "done"
        }),
    )
    .unwrap();
    mux
}

#[test]
fn test_start_stop_wait() {
    let mut mux = slow_mux(Duration::ZERO);
    let addr = mux.start(&MuxConfig::new("127.0.0.1:0")).unwrap();
    assert!(get(addr, "/").ends_with("ok"));

    let started = Instant::now();
    mux.stop().unwrap();
    assert!(started.elapsed() < Duration::from_secs(5));

    let started = Instant::now();
    mux.wait();
    assert!(started.elapsed() < Duration::from_millis(500));

    assert!(matches!(mux.stop(), Err(ServerError::NotRunning)));
    assert!(TcpStream::connect(addr).is_err());
}

#[test]
fn test_stop_lets_in_flight_request_finish() {
    let mut mux = slow_mux(Duration::from_millis(300));
    let addr = mux.start(&MuxConfig::new("127.0.0.1:0")).unwrap();

    let client = thread::spawn(move || get(addr, "/slow"));
    thread::sleep(Duration::from_millis(100));

    mux.stop().unwrap();
    let response = client.join().unwrap();

    assert!(response.starts_with("HTTP/1.1 200"));
    assert!(response.ends_with("done"));
}

#[test]
fn test_shutdown_timeout_closes_stuck_request() {
    let mut mux = slow_mux(Duration::from_secs(30));
    let config = MuxConfig::new("127.0.0.1:0").with_shutdown_timeout(Duration::from_millis(200));
    let addr = mux.start(&config).unwrap();

    let client = thread::spawn(move || {
        let mut stream = TcpStream::connect(addr).unwrap();
        stream.set_read_timeout(Some(Duration::from_secs(10))).unwrap();
        stream.write_all(b"GET /slow HTTP/1.1\r\nHost: localhost\r\n\r\n").unwrap();
        let mut response = Vec::new();
        // the connection is closed without a response
        stream.read_to_end(&mut response).map(|_| response.len()).unwrap_or(0)
    });
    thread::sleep(Duration::from_millis(100));

    let started = Instant::now();
    mux.stop().unwrap();
    assert!(started.elapsed() < Duration::from_secs(5));

    assert_eq!(client.join().unwrap(), 0);
    assert_eq!(mux.state(), ServerState::Stopped);
}

#[test]
fn test_stop_does_not_wait_for_blocking_work_past_timeout() {
    let mut mux = Multiplexer::new();
    mux.get(
        "/blocking",
        handler_fn(|_req: RequestContext, _body: ReqBody| async {
            let _ = tokio::task::spawn_blocking(|| thread::sleep(Duration::from_secs(5))).await;
            "done"
        }),
    )
    .unwrap();
    let config = MuxConfig::new("127.0.0.1:0").with_shutdown_timeout(Duration::from_millis(300));
    let addr = mux.start(&config).unwrap();

    let client = thread::spawn(move || {
        let mut stream = TcpStream::connect(addr).unwrap();
        stream.set_read_timeout(Some(Duration::from_secs(10))).unwrap();
        stream.write_all(b"GET /blocking HTTP/1.1\r\nHost: localhost\r\n\r\n").unwrap();
        let mut response = Vec::new();
        stream.read_to_end(&mut response).map(|_| response.len()).unwrap_or(0)
    });
    thread::sleep(Duration::from_millis(100));

    let started = Instant::now();
    mux.stop().unwrap();
    let elapsed = started.elapsed();

    assert!(elapsed >= Duration::from_millis(250), "stopped after {elapsed:?}");
    assert!(elapsed < Duration::from_millis(900), "stopped after {elapsed:?}");
    assert_eq!(client.join().unwrap(), 0);
}

#[test]
fn test_port_only_address_listens_on_all_interfaces() {
    let mut mux = slow_mux(Duration::ZERO);
    let addr = mux.start(&MuxConfig::new(":0")).unwrap();

    assert!(addr.ip().is_unspecified());
    assert!(get(SocketAddr::from(([127, 0, 0, 1], addr.port())), "/").ends_with("ok"));
    mux.stop().unwrap();
}

#[test]
fn test_missing_tls_files_fall_back_to_plain_http() {
    let dir = tempfile::tempdir().unwrap();
    let config = MuxConfig::new("127.0.0.1:0").with_tls(dir.path().join("cert.pem"), dir.path().join("key.pem"));
    assert!(!config.tls_enabled());

    let mut mux = slow_mux(Duration::ZERO);
    let addr = mux.start(&config).unwrap();

    assert!(get(addr, "/").starts_with("HTTP/1.1 200"));
    mux.stop().unwrap();
}

#[test]
fn test_unreadable_tls_files_fail_start() {
    let dir = tempfile::tempdir().unwrap();
    let cert = dir.path().join("cert.pem");
    let key = dir.path().join("key.pem");
    std::fs::write(&cert, "not a certificate").unwrap();
    std::fs::write(&key, "not a key").unwrap();

    let mut mux = slow_mux(Duration::ZERO);
    let result = mux.start(&MuxConfig::new("127.0.0.1:0").with_tls(cert, key));

    assert!(matches!(result, Err(ServerError::Tls { .. })));
    assert_eq!(mux.state(), ServerState::Idle);
}

#[test]
fn test_drop_stops_server() {
    let addr = {
        let mut mux = slow_mux(Duration::ZERO);
        mux.start(&MuxConfig::new("127.0.0.1:0")).unwrap()
    };

    assert!(TcpStream::connect(addr).is_err());
}
