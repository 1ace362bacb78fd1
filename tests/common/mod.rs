use {
    axum::{extract::State, http::StatusCode, routing::get, Router},
    co2_monitor::settings::Source,
    std::{
        net::SocketAddr,
        sync::{
            atomic::{AtomicUsize, Ordering},
            Arc, Mutex,
        },
        time::Duration,
    },
    tokio::net::TcpListener,
};

struct Reply {
    status: StatusCode,
    body: String,
    delay: Duration,
}

#[derive(Default)]
struct Counters {
    hits: AtomicUsize,
    in_flight: AtomicUsize,
    peak: AtomicUsize,
}

/// In-process HTTP endpoint serving `/co2` with a swappable reply.
pub struct StubEndpoint {
    addr: SocketAddr,
    reply: Arc<Mutex<Reply>>,
    counters: Arc<Counters>,
}

impl StubEndpoint {
    pub async fn start(body: &str) -> Self {
        let reply = Arc::new(Mutex::new(Reply {
            status: StatusCode::OK,
            body: body.to_string(),
            delay: Duration::ZERO,
        }));
        let counters = Arc::new(Counters::default());

        let app = Router::new()
            .route("/co2", get(respond))
            .with_state((reply.clone(), counters.clone()));

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move { axum::serve(listener, app).await.unwrap() });

        Self {
            addr,
            reply,
            counters,
        }
    }

    pub fn url(&self) -> String {
        format!("http://{}/co2", self.addr)
    }

    pub fn source(&self) -> Source {
        source(&self.url())
    }

    pub fn reply_with(&self, status: StatusCode, body: &str) {
        let mut reply = self.reply.lock().unwrap();
        reply.status = status;
        reply.body = body.to_string();
    }

    pub fn delay(&self, delay: Duration) {
        self.reply.lock().unwrap().delay = delay;
    }

    pub fn hits(&self) -> usize {
        self.counters.hits.load(Ordering::SeqCst)
    }

    /// Most requests that were being served at the same time.
    pub fn peak_in_flight(&self) -> usize {
        self.counters.peak.load(Ordering::SeqCst)
    }
}

async fn respond(
    State((reply, counters)): State<(Arc<Mutex<Reply>>, Arc<Counters>)>,
) -> (StatusCode, String) {
    counters.hits.fetch_add(1, Ordering::SeqCst);
    let in_flight = counters.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
    counters.peak.fetch_max(in_flight, Ordering::SeqCst);

    let delay = reply.lock().unwrap().delay;
    tokio::time::sleep(delay).await;

    counters.in_flight.fetch_sub(1, Ordering::SeqCst);
    let current = reply.lock().unwrap();
    (current.status, current.body.clone())
}

pub fn source(url: &str) -> Source {
    Source {
        url: url.to_string(),
        field: "co2level".to_string(),
        timeout_secs: 5,
        stale_on_parse_error: false,
    }
}

/// A URL nothing is listening on.
pub async fn refused_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    format!("http://{}/co2", addr)
}
