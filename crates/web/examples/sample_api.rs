//! A small control API.
//!
//! ```text
//! curl 'http://127.0.0.1:8080/api/echo/hello?times=3'
//! curl http://127.0.0.1:8080/api/add/12/30
//! curl -H 'Content-Type: application/json' -d '{"name":"Alice","age":20}' http://127.0.0.1:8080/api/users
//! curl -X POST http://127.0.0.1:8080/state/frames
//! curl http://127.0.0.1:8080/openapi.yaml
//! ```

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};

use chrono::{DateTime, Utc};
use http::StatusCode;
use probe_web::binder::ParamSpec;
use probe_web::openapi::OpenApiInfo;
use probe_web::responder::Json;
use probe_web::router::{Controller, ResponseDoc, RouteGroup, get, post};
use probe_web::shape::{Describe, Property, Shape};
use probe_web::{Router, Server, handler_fn};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::{Level, error, info};
use tracing_subscriber::FmtSubscriber;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
struct NewUser {
    name: String,
    age: i32,
}

impl Describe for NewUser {
    fn shape() -> Shape {
        Shape::object::<NewUser>("NewUser", || vec![Property::of::<String>("name"), Property::of::<i32>("age")])
    }
}

#[derive(Debug, Clone, Serialize)]
struct User {
    id: Uuid,
    name: String,
    age: i32,
    created_at: DateTime<Utc>,
}

impl Describe for User {
    fn shape() -> Shape {
        Shape::object::<User>("User", || {
            vec![
                Property::of::<Uuid>("id"),
                Property::of::<String>("name"),
                Property::of::<i32>("age"),
                Property::of::<DateTime<Utc>>("created_at"),
            ]
        })
    }
}

async fn echo(text: String, times: i32) -> String {
    text.repeat(usize::try_from(times.max(1)).unwrap_or(1))
}

async fn add(a: i32, b: i32) -> Json<Value> {
    Json(json!({"a": a, "b": b, "sum": a + b}))
}

fn common_api() -> RouteGroup {
    RouteGroup::with_prefix("/api")
        .tag("common")
        .route(
            "/echo/{text}",
            get(handler_fn(echo))
                .summary("Repeat a text")
                .param(ParamSpec::path::<String>("text").description("text to repeat"))
                .param(ParamSpec::query::<i32>("times").default_value(1).description("repetitions")),
        )
        .route(
            "/add/{a}/{b}",
            get(handler_fn(add)).summary("Add two numbers").param(ParamSpec::path::<i32>("a")).param(ParamSpec::path::<i32>("b")),
        )
}

/// Users live in memory, owned by the controller instance.
#[derive(Debug, Default)]
struct UserController {
    users: RwLock<HashMap<Uuid, User>>,
}

impl UserController {
    fn create(&self, new_user: NewUser) -> Result<Json<User>, String> {
        let user = User { id: Uuid::new_v4(), name: new_user.name, age: new_user.age, created_at: Utc::now() };
        self.users.write().map_err(|e| e.to_string())?.insert(user.id, user.clone());
        Ok(Json(user))
    }

    fn find(&self, id: Uuid) -> Result<Json<User>, String> {
        let users = self.users.read().map_err(|e| e.to_string())?;
        users.get(&id).cloned().map(Json).ok_or_else(|| format!("user {id} not found"))
    }

    fn list(&self) -> Result<Vec<User>, String> {
        Ok(self.users.read().map_err(|e| e.to_string())?.values().cloned().collect())
    }
}

impl Controller for UserController {
    fn group(self: Arc<Self>) -> RouteGroup {
        let create = Arc::clone(&self);
        let find = Arc::clone(&self);
        let list = self;

        RouteGroup::with_prefix("/api/users")
            .summary("User management")
            .tag("users")
            .route(
                "/",
                post(handler_fn(move |user: NewUser| {
                    let this = Arc::clone(&create);
                    async move { this.create(user) }
                }))
                .param(ParamSpec::body::<NewUser>("user")),
            )
            .route(
                "/{id}",
                get(handler_fn(move |id: Uuid| {
                    let this = Arc::clone(&find);
                    async move { this.find(id) }
                }))
                .param(ParamSpec::path::<Uuid>("id"))
                .response(ResponseDoc::new(StatusCode::OK, "the user").with_body::<User>())
                .response(ResponseDoc::status(StatusCode::INTERNAL_SERVER_ERROR)),
            )
            .route(
                "/",
                get(handler_fn(move || {
                    let this = Arc::clone(&list);
                    async move { this.list() }
                })),
            )
    }
}

/// Exposes a bit of process state.
#[derive(Debug, Default)]
struct StateController {
    frames: AtomicU64,
}

impl Controller for StateController {
    fn group(self: Arc<Self>) -> RouteGroup {
        let tick = Arc::clone(&self);
        let read = self;

        RouteGroup::with_prefix("/state")
            .tag("state")
            .route(
                "/frames",
                post(handler_fn(move || {
                    let this = Arc::clone(&tick);
                    async move { this.frames.fetch_add(1, Ordering::Relaxed) + 1 }
                }))
                .summary("Advance the frame counter"),
            )
            .route(
                "/frames",
                get(handler_fn(move || {
                    let this = Arc::clone(&read);
                    async move { this.frames.load(Ordering::Relaxed) }
                })),
            )
    }
}

#[tokio::main]
async fn main() {
    let subscriber = FmtSubscriber::builder().with_max_level(Level::INFO).finish();
    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");

    let router = match Router::builder()
        .group(common_api())
        .controller(Arc::new(UserController::default()))
        .controller(Arc::new(StateController::default()))
        .openapi(OpenApiInfo::new("/openapi.yaml", "Sample API", "1.0.0"))
        .build()
    {
        Ok(router) => router,
        Err(e) => {
            error!(cause = %e, "invalid routes");
            return;
        }
    };

    let server = match Server::builder().address("127.0.0.1:8080").router(router).build() {
        Ok(server) => server,
        Err(e) => {
            error!(cause = %e, "invalid server configuration");
            return;
        }
    };

    let handle = match server.start().await {
        Ok(handle) => handle,
        Err(e) => {
            error!(cause = %e, "failed to start");
            return;
        }
    };
    info!(address = %handle.local_addr(), "sample api started, press ctrl-c to stop");

    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(cause = %e, "failed to listen for ctrl-c");
    }
    handle.shutdown().await;
}
