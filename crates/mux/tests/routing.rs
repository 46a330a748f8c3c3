use http::StatusCode;
use simplemux::decorator::{AccessLog, Next, from_fn};
use simplemux::handler::handler_fn;
use simplemux::{Multiplexer, MuxConfig, ReqBody, RequestContext};
use std::io::{Read, Write};
use std::net::{SocketAddr, TcpStream};
use std::sync::{Arc, Mutex};
use std::time::Duration;

struct Reply {
    status: u16,
    head: String,
    body: String,
}

fn send(addr: SocketAddr, method: &str, path: &str, headers: &[(&str, &str)], body: &str) -> Reply {
    let mut stream = TcpStream::connect(addr).unwrap();
    stream.set_read_timeout(Some(Duration::from_secs(5))).unwrap();

    let mut request = format!("{method} {path} HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n");
    for (name, value) in headers {
        request.push_str(&format!("{name}: {value}\r\n"));
    }
    request.push_str(&format!("Content-Length: {}\r\n\r\n{body}", body.len()));
    stream.write_all(request.as_bytes()).unwrap();

    let mut response = String::new();
    stream.read_to_string(&mut response).unwrap();

    let (head, body) = response.split_once("\r\n\r\n").unwrap();
    let status = head.split(' ').nth(1).unwrap().parse().unwrap();
    Reply { status, head: head.to_ascii_lowercase(), body: body.to_string() }
}

fn get(addr: SocketAddr, path: &str) -> Reply {
    send(addr, "GET", path, &[], "")
}

fn config() -> MuxConfig {
    MuxConfig::new("127.0.0.1:0").with_shutdown_timeout(Duration::from_secs(1))
}

fn demo_mux() -> Multiplexer {
    let mut mux = Multiplexer::new();

    mux.get("/", handler_fn(|_req: RequestContext, _body: ReqBody| async { "Hello, World!" })).unwrap();
    mux.get(
        "/a/{b}/c",
        handler_fn(|req: RequestContext, _body: ReqBody| async move {
            format!("b={}", req.path_params().get("b").unwrap_or_default())
        }),
    )
    .unwrap();
    mux.get(
        "/search",
        handler_fn(|req: RequestContext, _body: ReqBody| async move { req.query_params().get_all("tag").join(",") }),
    )
    .unwrap();
    mux.get("/r", handler_fn(|_req: RequestContext, _body: ReqBody| async { "get" })).unwrap();
    mux.post(
        "/r",
        handler_fn(|_req: RequestContext, body: ReqBody| async move {
            let bytes = body.bytes().await.unwrap_or_default();
            format!("post {}", String::from_utf8_lossy(&bytes))
        }),
    )
    .unwrap();
    mux.add_route_with_content_type(
        "POST /submit",
        "application/json",
        handler_fn(|_req: RequestContext, _body: ReqBody| async { "JSON submitted!" }),
    )
    .unwrap();
    mux.redirect("/index", "/").unwrap();
    mux
}

#[test]
fn test_dispatch_over_tcp() {
    let mut mux = demo_mux();
    let addr = mux.start(&config()).unwrap();

    let reply = get(addr, "/");
    assert_eq!(reply.status, 200);
    assert_eq!(reply.body, "Hello, World!");

    assert_eq!(get(addr, "/a/x/c").body, "b=x");
    assert_eq!(get(addr, "/a/x/y/c").status, 404);
    assert_eq!(get(addr, "/search?tag=a&tag=b").body, "a,b");

    let reply = send(addr, "POST", "/r", &[], "payload");
    assert_eq!(reply.body, "post payload");

    let reply = get(addr, "/index");
    assert_eq!(reply.status, 302);
    assert!(reply.head.lines().any(|line| line == "location: /"));

    mux.stop().unwrap();
}

#[test]
fn test_not_found_and_method_not_allowed() {
    let mut mux = demo_mux();
    let addr = mux.start(&config()).unwrap();

    let reply = get(addr, "/missing");
    assert_eq!(reply.status, 404);
    assert_eq!(reply.body, "404 page not found\n");

    let reply = send(addr, "DELETE", "/r", &[], "");
    assert_eq!(reply.status, 405);
    assert!(reply.body.is_empty());

    let reply = send(addr, "POST", "/submit", &[("Content-Type", "text/plain")], "x");
    assert_eq!(reply.status, 405);

    let reply = send(addr, "POST", "/submit", &[("Content-Type", "application/json; charset=utf-8")], "{}");
    assert_eq!(reply.status, 200);
    assert_eq!(reply.body, "JSON submitted!");

    mux.stop().unwrap();
}

#[test]
fn test_fallback_and_middleware_see_every_request() {
    let seen = Arc::new(Mutex::new(Vec::new()));

    let mut mux = demo_mux();
    mux.not_found(handler_fn(|req: RequestContext, _body: ReqBody| async move {
        (StatusCode::NOT_FOUND, format!("custom {}", req.path()))
    }))
    .unwrap();
    mux.use_middleware(AccessLog);
    let recorder = Arc::clone(&seen);
    mux.use_middleware(from_fn(move |req: RequestContext, body: ReqBody, next: Next| {
        let recorder = Arc::clone(&recorder);
        async move {
            let path = req.path().to_string();
            let response = next.run(req, body).await;
            recorder.lock().unwrap().push(format!("{path} {}", response.status().as_u16()));
            response
        }
    }));

    let addr = mux.start(&config()).unwrap();

    assert_eq!(get(addr, "/nowhere").body, "custom /nowhere");
    assert_eq!(send(addr, "PUT", "/r", &[], "").status, 405);
    assert_eq!(get(addr, "/").status, 200);

    mux.stop().unwrap();
    assert_eq!(*seen.lock().unwrap(), ["/nowhere 404", "/r 405", "/ 200"]);
}

#[test]
fn test_static_files() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("hello.txt"), "hello from disk").unwrap();
    std::fs::write(dir.path().join("my notes.txt"), "spaced name").unwrap();

    let mut mux = Multiplexer::new();
    mux.serve_static("/static", dir.path());
    let addr = mux.start(&config()).unwrap();

    let reply = get(addr, "/static/hello.txt");
    assert_eq!(reply.status, 200);
    assert_eq!(reply.body, "hello from disk");
    assert!(reply.head.contains("content-type: text/plain"));

    assert_eq!(get(addr, "/static/missing.txt").status, 404);
    assert_eq!(get(addr, "/static/../Cargo.toml").status, 404);
    assert_eq!(get(addr, "/static/..%2FCargo.toml").status, 404);
    assert_eq!(get(addr, "/static/my%20notes.txt").body, "spaced name");

    mux.stop().unwrap();
}

#[test]
fn test_encoded_paths_are_decoded_before_matching() {
    let mut mux = Multiplexer::new();
    mux.get(
        "/a/{b}/c",
        handler_fn(|req: RequestContext, _body: ReqBody| async move {
            req.path_params().get("b").unwrap_or_default().to_string()
        }),
    )
    .unwrap();
    mux.get("/café", handler_fn(|_req: RequestContext, _body: ReqBody| async { "coffee" })).unwrap();
    let addr = mux.start(&config()).unwrap();

    assert_eq!(get(addr, "/a/hello%20world/c").body, "hello world");
    assert_eq!(get(addr, "/a/caf%C3%A9/c").body, "café");
    assert_eq!(get(addr, "/caf%C3%A9").body, "coffee");

    mux.stop().unwrap();
}

#[test]
fn test_routes_after_start_need_restart() {
    let mut mux = Multiplexer::new();
    mux.get("/one", handler_fn(|_req: RequestContext, _body: ReqBody| async { "one" })).unwrap();
    let addr = mux.start(&config()).unwrap();

    mux.get("/two", handler_fn(|_req: RequestContext, _body: ReqBody| async { "two" })).unwrap();
    assert_eq!(get(addr, "/two").status, 404);

    let addr = mux.restart(&config()).unwrap();
    assert_eq!(get(addr, "/two").body, "two");

    mux.stop().unwrap();
}
