use std::hint::black_box;
use std::io;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use bytes::BytesMut;
use criterion::{Criterion, criterion_group, criterion_main};
use futures::executor::block_on;
use http::StatusCode;
use probe_http::codec::{HeaderDecoder, ResponseEncoder};
use probe_http::connection::HttpConnection;
use probe_http::handler::make_handler;
use probe_http::protocol::{Request, Response, build_response};
use tokio::io::{AsyncRead, AsyncWrite, ReadBuf};
use tokio_util::codec::{Decoder, Encoder};

const SIMPLE_REQUEST: &[u8] = b"GET /api/echo/hello?times=3 HTTP/1.1\r\nHost: localhost\r\n\r\n";

const CURL_REQUEST: &[u8] = b"POST /api/users HTTP/1.1\r\n\
Host: 127.0.0.1:8080\r\n\
User-Agent: curl/7.79.1\r\n\
Accept: */*\r\n\
Content-Type: application/json\r\n\
Content-Length: 25\r\n\
\r\n\
{\"name\":\"Alice\",\"age\":20}";

// Mock IO for testing
#[derive(Clone)]
struct MockIO {
    read_data: Vec<u8>,
    write_data: Vec<u8>,
    read_pos: usize,
}

impl MockIO {
    fn new(read_data: Vec<u8>) -> Self {
        Self { read_data, write_data: Vec::new(), read_pos: 0 }
    }
}

impl AsyncRead for MockIO {
    fn poll_read(mut self: Pin<&mut Self>, _cx: &mut Context<'_>, buf: &mut ReadBuf<'_>) -> Poll<io::Result<()>> {
        let remaining = &self.read_data[self.read_pos..];
        let amt = std::cmp::min(remaining.len(), buf.remaining());
        buf.put_slice(&remaining[..amt]);
        self.read_pos += amt;
        Poll::Ready(Ok(()))
    }
}

impl AsyncWrite for MockIO {
    fn poll_write(mut self: Pin<&mut Self>, _cx: &mut Context<'_>, buf: &[u8]) -> Poll<Result<usize, io::Error>> {
        self.write_data.extend_from_slice(buf);
        Poll::Ready(Ok(buf.len()))
    }

    fn poll_flush(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<Result<(), io::Error>> {
        Poll::Ready(Ok(()))
    }

    fn poll_shutdown(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<Result<(), io::Error>> {
        Poll::Ready(Ok(()))
    }
}

async fn test_handler(request: Request) -> Response {
    build_response(StatusCode::OK, "text/plain; charset=utf-8", request.body().clone())
}

fn bench_header_decoder(c: &mut Criterion) {
    c.bench_function("decode_simple_request", |b| {
        b.iter(|| {
            let mut decoder = HeaderDecoder::new();
            let mut bytes = BytesMut::from(SIMPLE_REQUEST);
            black_box(decoder.decode(&mut bytes).unwrap());
        });
    });

    c.bench_function("decode_curl_request", |b| {
        b.iter(|| {
            let mut decoder = HeaderDecoder::new();
            let mut bytes = BytesMut::from(CURL_REQUEST);
            black_box(decoder.decode(&mut bytes).unwrap());
        });
    });
}

fn bench_response_encoder(c: &mut Criterion) {
    let response = build_response(StatusCode::OK, "application/json; charset=utf-8", r#"{"a":12,"b":30,"sum":42}"#);

    c.bench_function("encode_simple_response", |b| {
        b.iter(|| {
            let mut encoder = ResponseEncoder::new();
            let mut bytes = BytesMut::new();
            encoder.encode(response.clone(), &mut bytes).unwrap();
            black_box(bytes);
        });
    });
}

fn bench_http_connection(c: &mut Criterion) {
    let handler = Arc::new(make_handler(test_handler));

    c.bench_function("process_request_with_body", |b| {
        b.iter(|| {
            let mock_io = MockIO::new(CURL_REQUEST.to_vec());
            let (reader, writer) = (mock_io.clone(), mock_io);
            let connection = HttpConnection::new(reader, writer);
            black_box(block_on(connection.process(handler.clone())).unwrap());
        });
    });
}

criterion_group!(benches, bench_header_decoder, bench_response_encoder, bench_http_connection);
criterion_main!(benches);
