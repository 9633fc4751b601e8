use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use http::StatusCode;
use probe_web::binder::ParamSpec;
use probe_web::openapi::OpenApiInfo;
use probe_web::responder::Json;
use probe_web::router::{Controller, RouteGroup, delete, get, post};
use probe_web::shape::{Describe, Property, Shape};
use probe_web::{Router, Server, ServerHandle, handler_fn};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use uuid::Uuid;

#[derive(Debug, Serialize, Deserialize)]
struct NewUser {
    name: String,
    age: i32,
}

impl Describe for NewUser {
    fn shape() -> Shape {
        Shape::object::<NewUser>("NewUser", || vec![Property::of::<String>("name"), Property::of::<i32>("age")])
    }
}

#[derive(Debug, Serialize)]
struct User {
    id: Uuid,
    name: String,
    age: i32,
}

impl Describe for User {
    fn shape() -> Shape {
        Shape::object::<User>("User", || {
            vec![Property::of::<Uuid>("id"), Property::of::<String>("name"), Property::of::<i32>("age")]
        })
    }
}

async fn echo(text: String, times: i32) -> String {
    text.repeat(usize::try_from(times.max(1)).unwrap_or(1))
}

async fn add(a: i32, b: i32) -> Json<Value> {
    Json(json!({"a": a, "b": b, "sum": a + b}))
}

async fn create_user(user: NewUser) -> Json<User> {
    Json(User { id: Uuid::new_v4(), name: user.name, age: user.age })
}

async fn remove_user(_id: Uuid) {}

struct Counter {
    hits: AtomicU64,
}

impl Controller for Counter {
    fn group(self: Arc<Self>) -> RouteGroup {
        RouteGroup::with_prefix("/counter").tag("counter").route(
            "/hit",
            post(handler_fn(move || {
                let this = Arc::clone(&self);
                async move { this.hits.fetch_add(1, Ordering::Relaxed) + 1 }
            })),
        )
    }
}

async fn start() -> ServerHandle {
    let router = Router::builder()
        .group(
            RouteGroup::with_prefix("/api")
                .tag("sample")
                .route(
                    "/echo/{text}",
                    get(handler_fn(echo))
                        .param(ParamSpec::path::<String>("text"))
                        .param(ParamSpec::query::<i32>("times").default_value(1)),
                )
                .route("/add/{a}/{b}", get(handler_fn(add)).param(ParamSpec::path::<i32>("a")).param(ParamSpec::path::<i32>("b")))
                .route("/users", post(handler_fn(create_user)).param(ParamSpec::body::<NewUser>("user")))
                .route("/users/{id}", delete(handler_fn(remove_user)).param(ParamSpec::path::<Uuid>("id"))),
        )
        .controller(Arc::new(Counter { hits: AtomicU64::new(0) }))
        .openapi(OpenApiInfo::new("/openapi.yaml", "Sample API", "1.0.0"))
        .build()
        .unwrap();

    Server::builder().address("127.0.0.1:0").router(router).max_body_bytes(1024).build().unwrap().start().await.unwrap()
}

async fn send(addr: SocketAddr, request: &[u8]) -> Vec<u8> {
    let mut stream = TcpStream::connect(addr).await.unwrap();
    stream.write_all(request).await.unwrap();

    let mut response = Vec::new();
    // the server may reset the connection when it aborts without answering
    let _ = stream.read_to_end(&mut response).await;
    response
}

struct Parsed {
    status: StatusCode,
    headers: Vec<(String, String)>,
    body: String,
}

impl Parsed {
    fn header(&self, name: &str) -> Option<&str> {
        self.headers.iter().find(|(key, _)| key.eq_ignore_ascii_case(name)).map(|(_, value)| value.as_str())
    }
}

fn parse(response: &[u8]) -> Parsed {
    let text = String::from_utf8(response.to_vec()).unwrap();
    let (head, body) = text.split_once("\r\n\r\n").unwrap();
    let mut lines = head.split("\r\n");

    let status_line = lines.next().unwrap();
    let code = status_line.split(' ').nth(1).unwrap();
    assert!(status_line.starts_with("HTTP/1.1 "), "{status_line}");
    assert!(status_line.ends_with(" OK"), "{status_line}");

    let headers = lines
        .map(|line| {
            let (key, value) = line.split_once(':').unwrap();
            (key.trim().to_string(), value.trim().to_string())
        })
        .collect();

    Parsed { status: StatusCode::from_bytes(code.as_bytes()).unwrap(), headers, body: body.to_string() }
}

async fn get_path(addr: SocketAddr, target: &str) -> Parsed {
    let request = format!("GET {target} HTTP/1.1\r\nHost: localhost\r\n\r\n");
    parse(&send(addr, request.as_bytes()).await)
}

#[tokio::test]
async fn echo_with_query() {
    let server = start().await;

    let response = get_path(server.local_addr(), "/api/echo/hello?times=3").await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body, "hellohellohello");
    assert_eq!(response.header("content-type"), Some("text/plain; charset=utf-8"));
    assert_eq!(response.header("content-length"), Some("15"));
    assert_eq!(response.header("connection"), Some("close"));
    assert_eq!(response.header("access-control-allow-origin"), Some("*"));

    server.shutdown().await;
}

#[tokio::test]
async fn echo_repeats_at_least_once() {
    let server = start().await;

    assert_eq!(get_path(server.local_addr(), "/api/echo/hello?times=0").await.body, "hello");
    assert_eq!(get_path(server.local_addr(), "/api/echo/hello?times=-2").await.body, "hello");

    server.shutdown().await;
}

#[tokio::test]
async fn add_returns_json() {
    let server = start().await;

    let response = get_path(server.local_addr(), "/api/add/12/30").await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.header("content-type"), Some("application/json; charset=utf-8"));
    assert_eq!(response.body, r#"{"a":12,"b":30,"sum":42}"#);

    server.shutdown().await;
}

#[tokio::test]
async fn unknown_route() {
    let server = start().await;

    let response = get_path(server.local_addr(), "/unregistered/path").await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert_eq!(response.body, "Not Found");

    server.shutdown().await;
}

#[tokio::test]
async fn create_user_from_body() {
    let server = start().await;

    let body = r#"{"name":"Alice","age":20}"#;
    let request = format!(
        "POST /api/users HTTP/1.1\r\nHost: localhost\r\nContent-Type: application/json\r\nContent-Length: {}\r\n\r\n{body}",
        body.len()
    );
    let response = parse(&send(server.local_addr(), request.as_bytes()).await);
    assert_eq!(response.status, StatusCode::OK);

    let user: Value = serde_json::from_str(&response.body).unwrap();
    assert_eq!(user["name"], "Alice");
    assert_eq!(user["age"], 20);
    assert!(Uuid::parse_str(user["id"].as_str().unwrap()).is_ok_and(|id| !id.is_nil()));

    server.shutdown().await;
}

#[tokio::test]
async fn unit_handler_answers_null() {
    let server = start().await;

    let response = get_request(server.local_addr(), "DELETE", &format!("/api/users/{}", Uuid::new_v4())).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.header("content-type"), Some("application/json; charset=utf-8"));
    assert_eq!(response.body, "null");

    server.shutdown().await;
}

#[tokio::test]
async fn binding_failure_is_redacted() {
    let server = start().await;

    let response = get_request(server.local_addr(), "DELETE", "/api/users/not-a-uuid").await;
    assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(response.body, "Internal Server Error");

    server.shutdown().await;
}

#[tokio::test]
async fn controller_keeps_state() {
    let server = start().await;

    assert_eq!(get_request(server.local_addr(), "POST", "/counter/hit").await.body, "1");
    assert_eq!(get_request(server.local_addr(), "POST", "/counter/hit").await.body, "2");

    server.shutdown().await;
}

#[tokio::test]
async fn preflight() {
    let server = start().await;

    let response = get_request(server.local_addr(), "OPTIONS", "/api/users").await;
    assert_eq!(response.status, StatusCode::NO_CONTENT);
    assert_eq!(response.header("access-control-allow-methods"), Some("GET, POST, PUT, DELETE, OPTIONS"));
    assert_eq!(response.header("access-control-allow-headers"), Some("Content-Type, Authorization"));

    server.shutdown().await;
}

#[tokio::test]
async fn bad_request_line() {
    let server = start().await;

    let response = parse(&send(server.local_addr(), b"GARBAGE\r\n\r\n").await);
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body, "Bad Request");

    server.shutdown().await;
}

#[tokio::test]
async fn oversized_head_is_dropped() {
    let server = start().await;

    let mut request = b"GET /api/echo/hi HTTP/1.1\r\nX-Filler: ".to_vec();
    request.extend(std::iter::repeat_n(b'a', 70 * 1024));

    let mut stream = TcpStream::connect(server.local_addr()).await.unwrap();
    // the server may stop reading and close before everything is written
    let _ = stream.write_all(&request).await;
    let mut response = Vec::new();
    let _ = stream.read_to_end(&mut response).await;
    assert!(response.is_empty());

    server.shutdown().await;
}

#[tokio::test]
async fn oversized_body_is_rejected() {
    let server = start().await;

    let response = parse(&send(server.local_addr(), b"POST /api/users HTTP/1.1\r\nContent-Length: 4096\r\n\r\n{}").await);
    assert_eq!(response.status, StatusCode::PAYLOAD_TOO_LARGE);

    server.shutdown().await;
}

#[tokio::test]
async fn openapi_document() {
    let server = start().await;

    let response = get_path(server.local_addr(), "/openapi.yaml").await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.header("content-type"), Some("application/yaml; charset=utf-8"));
    assert!(response.body.starts_with("openapi: 3.0.3\ninfo:\n  title: Sample API\n"));
    assert!(response.body.contains("\"/api/echo/{text}\":"));
    assert!(response.body.contains("  /counter/hit:\n"));
    assert!(response.body.contains("    NewUser:\n"));
    assert!(response.body.contains("    User:\n"));

    let again = get_path(server.local_addr(), "/openapi.yaml").await;
    assert_eq!(again.body, response.body);

    server.shutdown().await;
}

#[tokio::test]
async fn stop_closes_listener() {
    let server = start().await;
    let addr = server.local_addr();

    server.shutdown().await;
    assert!(TcpStream::connect(addr).await.is_err());
}

async fn get_request(addr: SocketAddr, method: &str, target: &str) -> Parsed {
    let request = format!("{method} {target} HTTP/1.1\r\nHost: localhost\r\nContent-Length: 0\r\n\r\n");
    parse(&send(addr, request.as_bytes()).await)
}
