use std::hint::black_box;

use bytes::Bytes;
use criterion::{Criterion, criterion_group, criterion_main};
use futures::executor::block_on;
use http::{HeaderMap, Method};
use probe_http::handler::Handler;
use probe_http::protocol::RequestHead;
use probe_web::binder::ParamSpec;
use probe_web::router::{RouteGroup, get, post};
use probe_web::{Dispatcher, Router, handler_fn};

async fn echo(text: String, times: i32) -> String {
    text.repeat(usize::try_from(times.max(1)).unwrap_or(1))
}

async fn item(id: i64) -> i64 {
    id
}

async fn create(value: Vec<i32>) -> usize {
    value.len()
}

fn router() -> Router {
    let mut group = RouteGroup::with_prefix("/api");
    for resource in ["users", "orders", "items", "carts", "payments", "shipments", "invoices", "reviews"] {
        group = group
            .route(format!("/{resource}/{{id}}"), get(handler_fn(item)).param(ParamSpec::path::<i64>("id")))
            .route(format!("/{resource}"), post(handler_fn(create)).param(ParamSpec::body::<Vec<i32>>("value")));
    }

    Router::builder()
        .group(group)
        .route(
            "/api/echo/{text}",
            get(handler_fn(echo)).param(ParamSpec::path::<String>("text")).param(ParamSpec::query::<i32>("times").default_value(1)),
        )
        .build()
        .unwrap()
}

fn bench_lookup(c: &mut Criterion) {
    let router = router();
    let mut group = c.benchmark_group("route_lookup");

    group.bench_function("first_route", |b| b.iter(|| black_box(router.at(&Method::GET, black_box("/api/users/42")).is_some())));
    group.bench_function("last_route", |b| b.iter(|| black_box(router.at(&Method::GET, black_box("/api/echo/hello")).is_some())));
    group.bench_function("no_route", |b| b.iter(|| black_box(router.at(&Method::GET, black_box("/unregistered/path")).is_none())));

    group.finish();
}

fn bench_dispatch(c: &mut Criterion) {
    let dispatcher = Dispatcher::new(router());
    let mut group = c.benchmark_group("dispatch");

    group.bench_function("path_and_query", |b| {
        b.iter(|| {
            let request = RequestHead::new(Method::GET, "/api/echo/hello?times=3", "HTTP/1.1", HeaderMap::new()).body(Bytes::new());
            black_box(block_on(dispatcher.call(request)))
        });
    });

    group.bench_function("json_body", |b| {
        b.iter(|| {
            let request = RequestHead::new(Method::POST, "/api/orders", "HTTP/1.1", HeaderMap::new()).body(Bytes::from_static(b"[1,2,3,4]"));
            black_box(block_on(dispatcher.call(request)))
        });
    });

    group.finish();
}

criterion_group!(benches, bench_lookup, bench_dispatch);
criterion_main!(benches);
