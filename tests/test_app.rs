use tube::app::{Application, LoadError, StaticApp, load_file, load_str};
use tube::http::environment::Environment;
use tube::http::request::RequestBuilder;
use tube::http::response::Response;
use tube::http::writer::ResponseWriter;

fn env(method: &str, target: &str) -> Environment {
    let req = RequestBuilder::new().method(method).target(target).build().unwrap();
    Environment::from_request(&req)
}

fn render(response: Response) -> String {
    let mut out = Vec::new();
    ResponseWriter::new(response).write_to(&mut out).unwrap();
    String::from_utf8(out).unwrap()
}

const APP: &str = r#"
routes:
  - path: /
    headers:
      Content-Type: text/plain
      X-Powered-By: tube
    body:
      - "Hello from "
      - "the tube.\n"
  - path: /teapot
    method: POST
    status: 418
    headers:
      Content-Length: 0
"#;

#[test]
fn test_hello_app_answers_every_path() {
    let app = StaticApp::hello();

    for path in ["/", "/anything", "/deep/path"] {
        let response = app.call(env("GET", path)).unwrap();
        assert_eq!(
            render(response),
            "HTTP/1.1 200 OK\r\n\r\nContent-Type: text/plain\r\nContent-Length: 21\r\n\r\nHello from the tube.\n"
        );
    }
}

#[test]
fn test_loaded_app_preserves_header_order() {
    let app = load_str(APP).unwrap();

    let response = app.call(env("GET", "/")).unwrap();

    assert_eq!(
        render(response),
        "HTTP/1.1 200 OK\r\n\r\nContent-Type: text/plain\r\nX-Powered-By: tube\r\nContent-Length: 21\r\n\r\nHello from the tube.\n"
    );
}

#[test]
fn test_loaded_app_route_method_filter() {
    let app = load_str(APP).unwrap();

    let teapot = app.call(env("POST", "/teapot")).unwrap();
    assert_eq!(teapot.status, 418);
    assert_eq!(teapot.header("Content-Length"), Some("0"));

    let missed = app.call(env("GET", "/teapot")).unwrap();
    assert_eq!(missed.status, 404);
}

#[test]
fn test_loaded_app_unknown_path_is_not_found() {
    let app = load_str(APP).unwrap();

    let response = app.call(env("GET", "/missing")).unwrap();

    assert_eq!(response.status, 404);
    assert!(render(response).starts_with("HTTP/1.1 404 Not found\r\n\r\n"));
}

#[test]
fn test_load_rejects_bad_status() {
    let err = load_str("routes:\n  - path: /\n    status: 42\n").unwrap_err();

    assert!(matches!(err, LoadError::InvalidRoute { index: 0, .. }));
}

#[test]
fn test_load_rejects_empty_path() {
    let err = load_str("routes:\n  - path: \"\"\n").unwrap_err();

    assert!(matches!(err, LoadError::InvalidRoute { .. }));
}

#[test]
fn test_load_rejects_unknown_fields() {
    let err = load_str("routes:\n  - path: /\n    bogus: true\n").unwrap_err();

    assert!(matches!(err, LoadError::Yaml(_)));
}

#[test]
fn test_load_rejects_non_string_header() {
    let err = load_str("routes:\n  - path: /\n    headers:\n      X-List: [1, 2]\n").unwrap_err();

    assert!(matches!(err, LoadError::InvalidRoute { .. }));
}

#[test]
fn test_load_file_roundtrip() {
    let path = std::env::temp_dir().join(format!("tube-app-{}.yaml", std::process::id()));
    std::fs::write(&path, APP).unwrap();

    let app = load_file(&path).unwrap();
    std::fs::remove_file(&path).unwrap();

    assert_eq!(app.routes().len(), 2);
    assert_eq!(app.routes()[1].status, 418);
}

#[test]
fn test_load_file_missing() {
    let err = load_file("/nonexistent/tube/app.yaml").unwrap_err();

    assert!(matches!(err, LoadError::Io { .. }));
}

#[test]
fn test_closure_is_an_application() {
    let app = |env: Environment| -> anyhow::Result<Response> {
        Ok(Response::ok(env.request_method().to_string()))
    };

    let response = Application::call(&app, env("DELETE", "/x")).unwrap();

    assert_eq!(response.status, 200);
    assert_eq!(response.header("Content-Length"), Some("6"));
}
