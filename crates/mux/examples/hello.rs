use http::StatusCode;
use simplemux::decorator::{AccessLog, Next, from_fn};
use simplemux::handler::handler_fn;
use simplemux::{Multiplexer, MuxConfig, ReqBody, RequestContext};
use tracing::{Level, info};
use tracing_subscriber::FmtSubscriber;

async fn hello(_req: RequestContext, _body: ReqBody) -> &'static str {
    "Hello, World!"
}

// curl -v http://127.0.0.1:8080/users/42?verbose=true
async fn user(req: RequestContext, _body: ReqBody) -> String {
    let id = req.path_params().get("id").unwrap_or_default();
    let verbose = req.query_params().get("verbose") == Some("true");
    if verbose { format!("user {id}, path {}\r\n", req.path()) } else { format!("user {id}\r\n") }
}

// curl -v -d "name=hello&zip=world" http://127.0.0.1:8080/submit
async fn submit_form(_req: RequestContext, _body: ReqBody) -> &'static str {
    "Form submitted!"
}

// curl -v -H 'Content-Type: application/json' -d '{"name":"hello"}' http://127.0.0.1:8080/submit-json
async fn submit_json(_req: RequestContext, body: ReqBody) -> (StatusCode, String) {
    match body.bytes().await {
        Ok(bytes) => (StatusCode::OK, format!("JSON submitted! {} bytes\r\n", bytes.len())),
        Err(e) => (StatusCode::BAD_REQUEST, format!("can't read body: {e}\r\n")),
    }
}

async fn not_found(req: RequestContext, _body: ReqBody) -> (StatusCode, String) {
    (StatusCode::NOT_FOUND, format!("nothing at {}\r\n", req.path()))
}

fn main() {
    let subscriber = FmtSubscriber::builder().with_max_level(Level::INFO).finish();
    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");

    let mut mux = Multiplexer::new();

    mux.add_route("GET /", handler_fn(hello)).unwrap();
    mux.get("/users/{id}", handler_fn(user)).unwrap();
    mux.redirect("/index", "/").unwrap();
    mux.add_route_with_content_type("POST /submit", mime::APPLICATION_WWW_FORM_URLENCODED.as_ref(), handler_fn(submit_form))
        .unwrap();
    mux.add_route_with_content_type("POST /submit-json", mime::APPLICATION_JSON.as_ref(), handler_fn(submit_json))
        .unwrap();
    mux.serve_static("/static", "public");
    mux.not_found(handler_fn(not_found)).unwrap();

    mux.use_middleware(AccessLog);
    mux.use_middleware(from_fn(|req: RequestContext, body: ReqBody, next: Next| async move {
        info!(method = %req.method(), path = %req.path(), "received request");
        next.run(req, body).await
    }));

    let config = MuxConfig::new("127.0.0.1:8080").with_tls("cert.pem", "key.pem");
    mux.start(&config).expect("can't start server");

    let handle = mux.shutdown_handle().expect("server is running");
    tokio::runtime::Builder::new_current_thread().enable_all().build().expect("can't build runtime").block_on(async {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("ctrl-c received, shutting down");
            handle.shutdown();
        }
    });

    // wait for the server to shutdown gracefully
    mux.wait();
}
