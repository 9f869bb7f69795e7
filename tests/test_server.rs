use std::io::{Read, Write};
use std::net::{Shutdown, SocketAddr, TcpListener, TcpStream};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;
use std::time::Duration;

use tube::app::{Application, StaticApp};
use tube::http::environment::Environment;
use tube::http::response::{Body, Response};
use tube::server::{Server, Strategy};

fn start(strategy: Strategy, app: Arc<dyn Application>) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    let server = Server::from_listener(listener, app);

    thread::spawn(move || {
        let _ = server.run(strategy);
    });
    addr
}

fn request(addr: SocketAddr, raw: &[u8]) -> Vec<u8> {
    let mut stream = TcpStream::connect(addr).unwrap();
    stream.set_read_timeout(Some(Duration::from_secs(10))).unwrap();
    stream.write_all(raw).unwrap();

    let mut buf = Vec::new();
    let _ = stream.read_to_end(&mut buf);
    buf
}

fn get(addr: SocketAddr, path: &str) -> String {
    let raw = format!("GET {path} HTTP/1.1\r\nHost: localhost\r\n\r\n");
    String::from_utf8(request(addr, raw.as_bytes())).unwrap()
}

/// Echoes the path after a short pause and records peak concurrency.
fn slow_echo(in_flight: Arc<AtomicUsize>, peak: Arc<AtomicUsize>) -> Arc<dyn Application> {
    Arc::new(move |env: Environment| -> anyhow::Result<Response> {
        let now = in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        peak.fetch_max(now, Ordering::SeqCst);
        thread::sleep(Duration::from_millis(100));
        in_flight.fetch_sub(1, Ordering::SeqCst);

        let body = env.path_info().to_string();
        Ok(Response::new(200, Vec::new(), Body::from(body)))
    })
}

fn concurrent_gets(addr: SocketAddr, clients: usize) -> Vec<(String, String)> {
    let handles: Vec<_> = (0..clients)
        .map(|i| {
            thread::spawn(move || {
                let path = format!("/client-{i}");
                let response = get(addr, &path);
                (path, response)
            })
        })
        .collect();

    handles.into_iter().map(|h| h.join().unwrap()).collect()
}

#[test]
fn test_sequential_serves_requests() {
    let addr = start(Strategy::Sequential, Arc::new(StaticApp::hello()));

    for _ in 0..3 {
        let response = get(addr, "/");
        assert!(response.starts_with("HTTP/1.1 200 OK\r\n\r\n"));
        assert!(response.ends_with("\r\n\r\nHello from the tube.\n"));
    }
}

#[test]
fn test_sequential_handles_one_connection_at_a_time() {
    let in_flight = Arc::new(AtomicUsize::new(0));
    let peak = Arc::new(AtomicUsize::new(0));
    let addr = start(Strategy::Sequential, slow_echo(in_flight, Arc::clone(&peak)));

    for (path, response) in concurrent_gets(addr, 4) {
        assert_eq!(response, format!("HTTP/1.1 200 OK\r\n\r\n\r\n{path}"));
    }
    assert_eq!(peak.load(Ordering::SeqCst), 1);
}

#[test]
fn test_sequential_survives_silent_and_broken_clients() {
    let addr = start(Strategy::Sequential, Arc::new(StaticApp::hello()));

    // Connects and leaves without a byte
    let silent = TcpStream::connect(addr).unwrap();
    silent.shutdown(Shutdown::Both).unwrap();
    drop(silent);

    let garbage = request(addr, b"GET / HTTP/1.1\r\nBroken Header\r\n\r\n");
    assert!(garbage.is_empty());

    assert!(get(addr, "/").starts_with("HTTP/1.1 200 OK"));
}

#[test]
fn test_sequential_survives_panicking_application() {
    let app: Arc<dyn Application> = Arc::new(|env: Environment| -> anyhow::Result<Response> {
        if env.path_info() == "/panic" {
            panic!("application blew up");
        }
        Ok(Response::ok("fine"))
    });
    let addr = start(Strategy::Sequential, app);

    assert!(request(addr, b"GET /panic HTTP/1.1\r\n\r\n").is_empty());
    assert!(get(addr, "/").ends_with("fine"));
}

#[test]
fn test_threaded_concurrent_clients_get_independent_responses() {
    let in_flight = Arc::new(AtomicUsize::new(0));
    let peak = Arc::new(AtomicUsize::new(0));
    let addr = start(Strategy::Threaded, slow_echo(in_flight, Arc::clone(&peak)));

    let results = concurrent_gets(addr, 16);

    assert_eq!(results.len(), 16);
    for (path, response) in results {
        assert_eq!(response, format!("HTTP/1.1 200 OK\r\n\r\n\r\n{path}"));
    }
    assert!(peak.load(Ordering::SeqCst) > 1);
}

#[test]
fn test_threaded_application_error_closes_without_response() {
    let app: Arc<dyn Application> = Arc::new(|env: Environment| -> anyhow::Result<Response> {
        if env.path_info() == "/fail" {
            anyhow::bail!("refused");
        }
        Ok(Response::ok("ok"))
    });
    let addr = start(Strategy::Threaded, app);

    assert!(request(addr, b"GET /fail HTTP/1.1\r\n\r\n").is_empty());
    assert!(get(addr, "/").ends_with("ok"));
}

#[test]
fn test_reactor_serves_requests() {
    let addr = start(Strategy::Reactor, Arc::new(StaticApp::hello()));

    let response = get(addr, "/");

    assert_eq!(
        response,
        "HTTP/1.1 200 OK\r\n\r\nContent-Type: text/plain\r\nContent-Length: 21\r\n\r\nHello from the tube.\n"
    );
}

#[test]
fn test_reactor_interleaved_partial_requests() {
    let app: Arc<dyn Application> = Arc::new(|env: Environment| -> anyhow::Result<Response> {
        Ok(Response::new(200, Vec::new(), Body::from(env.path_info().to_string())))
    });
    let addr = start(Strategy::Reactor, app);

    let mut a = TcpStream::connect(addr).unwrap();
    let mut b = TcpStream::connect(addr).unwrap();

    a.write_all(b"GET /a HTTP/1.1\r\n").unwrap();
    b.write_all(b"GET /b HTTP/1.1\r\n").unwrap();
    thread::sleep(Duration::from_millis(50));
    b.write_all(b"\r\n").unwrap();
    a.write_all(b"\r\n").unwrap();

    let mut out_a = String::new();
    let mut out_b = String::new();
    a.read_to_string(&mut out_a).unwrap();
    b.read_to_string(&mut out_b).unwrap();

    assert_eq!(out_a, "HTTP/1.1 200 OK\r\n\r\n\r\n/a");
    assert_eq!(out_b, "HTTP/1.1 200 OK\r\n\r\n\r\n/b");
}

#[test]
fn test_reactor_many_clients() {
    let addr = start(Strategy::Reactor, Arc::new(StaticApp::hello()));

    for (_, response) in concurrent_gets(addr, 8) {
        assert!(response.ends_with("Hello from the tube.\n"));
    }
}

#[test]
fn test_reactor_survives_silent_and_broken_clients() {
    let addr = start(Strategy::Reactor, Arc::new(StaticApp::hello()));

    let silent = TcpStream::connect(addr).unwrap();
    silent.shutdown(Shutdown::Both).unwrap();
    drop(silent);

    let garbage = request(addr, b"GET / HTTP/1.1\r\nBroken Header\r\n\r\n");
    assert!(garbage.is_empty());

    assert!(get(addr, "/").starts_with("HTTP/1.1 200 OK"));
}

#[test]
fn test_prefork_rejects_zero_workers() {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let server = Server::from_listener(listener, Arc::new(StaticApp::hello()));

    assert!(server.run(Strategy::Prefork { workers: 0 }).is_err());
}
