//! Full lifecycle over real HTTP.
//!
//! # Design
//! Starts the server on a random port in a background thread, then drives it
//! with a blocking `ureq` agent. Status codes are read as data rather than
//! errors so 404s can be asserted on.

use serde_json::Value;
use todo_core::{TodoService, TodoStore};

struct Client {
    agent: ureq::Agent,
    base: String,
}

impl Client {
    fn new(addr: std::net::SocketAddr) -> Self {
        let agent = ureq::Agent::config_builder()
            .http_status_as_error(false)
            .build()
            .new_agent();
        Self {
            agent,
            base: format!("http://{addr}"),
        }
    }

    fn call(&self, method: &str, path: &str, body: Option<&str>) -> (u16, String) {
        let url = format!("{}{path}", self.base);
        let mut response = match (method, body) {
            ("GET", _) => self.agent.get(&url).call(),
            ("DELETE", _) => self.agent.delete(&url).call(),
            ("PATCH", _) => self.agent.patch(&url).send_empty(),
            ("POST", Some(body)) => self
                .agent
                .post(&url)
                .content_type("application/json")
                .send(body.as_bytes()),
            ("PUT", Some(body)) => self
                .agent
                .put(&url)
                .content_type("application/json")
                .send(body.as_bytes()),
            other => panic!("unsupported request: {other:?}"),
        }
        .expect("HTTP transport error");

        let status = response.status().as_u16();
        let body = response.body_mut().read_to_string().unwrap_or_default();
        (status, body)
    }

    fn json(&self, method: &str, path: &str, body: Option<&str>) -> (u16, Value) {
        let (status, body) = self.call(method, path, body);
        (status, serde_json::from_str(&body).unwrap_or(Value::Null))
    }
}

fn spawn_server() -> std::net::SocketAddr {
    let std_listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = std_listener.local_addr().unwrap();
    std_listener.set_nonblocking(true).unwrap();

    std::thread::spawn(move || {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        rt.block_on(async {
            let store = TodoStore::in_memory().await.unwrap();
            let listener = tokio::net::TcpListener::from_std(std_listener).unwrap();
            todo_server::run(listener, TodoService::new(store), std::future::pending()).await
        })
        .unwrap();
    });

    addr
}

#[test]
fn crud_lifecycle() {
    let client = Client::new(spawn_server());

    // Step 1: health and an empty list.
    let (status, body) = client.json("GET", "/", None);
    assert_eq!(status, 200);
    assert_eq!(body["message"], "Healthy");

    let (status, body) = client.json("GET", "/api/todos", None);
    assert_eq!(status, 200);
    assert_eq!(body, Value::Array(Vec::new()));

    // Step 2: create.
    let (status, created) = client.json(
        "POST",
        "/api/todos",
        Some(r#"{"title":"Integration test","description":"over tcp"}"#),
    );
    assert_eq!(status, 201);
    assert_eq!(created["title"], "Integration test");
    assert_eq!(created["completed"], false);
    let id = created["id"].as_i64().unwrap();

    // Step 3: get.
    let (status, fetched) = client.json("GET", &format!("/api/todos/{id}"), None);
    assert_eq!(status, 200);
    assert_eq!(fetched, created);

    // Step 4: partial update of the title.
    let (status, updated) = client.json(
        "PUT",
        &format!("/api/todos/{id}"),
        Some(r#"{"title":"Updated title"}"#),
    );
    assert_eq!(status, 200);
    assert_eq!(updated["title"], "Updated title");
    assert_eq!(updated["description"], "over tcp");
    assert_eq!(updated["created_at"], created["created_at"]);

    // Step 5: toggle.
    let (status, toggled) = client.json("PATCH", &format!("/api/todos/{id}/toggle"), None);
    assert_eq!(status, 200);
    assert_eq!(toggled["completed"], true);

    // Step 6: delete, then the id is gone.
    let (status, body) = client.call("DELETE", &format!("/api/todos/{id}"), None);
    assert_eq!(status, 204);
    assert!(body.is_empty());

    let (status, body) = client.json("GET", &format!("/api/todos/{id}"), None);
    assert_eq!(status, 404);
    assert_eq!(body["detail"], format!("Todo with id={id} not found"));

    let (status, _) = client.call("DELETE", &format!("/api/todos/{id}"), None);
    assert_eq!(status, 404);

    // Step 7: list is empty again.
    let (_, body) = client.json("GET", "/api/todos", None);
    assert_eq!(body, Value::Array(Vec::new()));
}

#[test]
fn run_returns_once_shutdown_resolves() {
    let std_listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = std_listener.local_addr().unwrap();
    std_listener.set_nonblocking(true).unwrap();
    let (stop, stopped) = tokio::sync::oneshot::channel::<()>();

    let server = std::thread::spawn(move || {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        rt.block_on(async {
            let store = TodoStore::in_memory().await.unwrap();
            let listener = tokio::net::TcpListener::from_std(std_listener).unwrap();
            let shutdown = async move {
                stopped.await.ok();
            };
            todo_server::run(listener, TodoService::new(store), shutdown).await
        })
    });

    let client = Client::new(addr);
    let (status, _) = client.json("GET", "/", None);
    assert_eq!(status, 200);
    drop(client);

    stop.send(()).unwrap();
    server.join().unwrap().unwrap();
}
