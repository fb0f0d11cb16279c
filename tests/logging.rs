mod common;

use std::io;
use std::sync::{Arc, Mutex};

use common::{product_page, MemorySink};
use mockito::Server;
use product_scraper::{logging, Config, Orchestrator, PageFetcher};

/// In-memory log destination shared with the subscriber.
#[derive(Clone, Default)]
struct LogBuffer(Arc<Mutex<Vec<u8>>>);

impl io::Write for LogBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl LogBuffer {
    fn error_lines(&self) -> Vec<String> {
        let contents = String::from_utf8(self.0.lock().unwrap().clone()).unwrap();
        contents
            .lines()
            .filter(|line| line.trim_start().starts_with("ERROR"))
            .map(String::from)
            .collect()
    }
}

/// Runs `urls` with every event of this crate captured into a buffer.
///
/// The default `#[tokio::test]` runtime is single threaded, so the
/// thread-local subscriber also sees the events of the spawned units.
async fn run_captured(urls: Vec<String>, sink: Arc<MemorySink>) -> LogBuffer {
    let buffer = LogBuffer::default();
    let writer = buffer.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter("product_scraper=info")
        .with_writer(move || writer.clone())
        .with_ansi(false)
        .without_time()
        .with_target(false)
        .finish();
    let _default = tracing::subscriber::set_default(subscriber);

    Orchestrator::new(PageFetcher::new().unwrap(), sink)
        .run(urls)
        .await;
    buffer
}

#[tokio::test]
async fn error_status_logs_one_error() {
    let mut server = Server::new_async().await;
    let _gone = server
        .mock("GET", "/gone")
        .with_status(404)
        .create_async()
        .await;
    let _good = server
        .mock("GET", "/good")
        .with_status(200)
        .with_body(product_page(Some("Good"), Some("£12.00"), Some("Two")))
        .create_async()
        .await;
    let gone = format!("{}/gone", server.url());
    let good = format!("{}/good", server.url());

    let sink = Arc::new(MemorySink::default());
    let log = run_captured(vec![gone.clone(), good.clone()], sink.clone()).await;

    let errors = log.error_lines();
    assert_eq!(errors.len(), 1, "{errors:?}");
    assert!(errors[0].contains("HttpStatusError"), "{}", errors[0]);
    assert!(errors[0].contains(&gone), "{}", errors[0]);
    assert!(sink.record_for(&gone).is_none());
    assert!(sink.record_for(&good).is_some());
}

#[tokio::test]
async fn network_failure_logs_one_error() {
    let unreachable = "http://127.0.0.1:1/unreachable".to_string();

    let sink = Arc::new(MemorySink::default());
    let log = run_captured(vec![unreachable.clone()], sink.clone()).await;

    let errors = log.error_lines();
    assert_eq!(errors.len(), 1, "{errors:?}");
    assert!(errors[0].contains("NetworkError"), "{}", errors[0]);
    assert!(errors[0].contains(&unreachable), "{}", errors[0]);
    assert!(sink.records().is_empty());
}

#[test]
fn configuration_failure_is_appended_to_the_log_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("scraper.log");
    std::fs::write(&path, "earlier run\n").unwrap();

    let guard = logging::init(&path).unwrap();
    assert!(Config::from_lookup(|_| None).is_err());
    drop(guard);

    let contents = std::fs::read_to_string(&path).unwrap();
    assert!(contents.starts_with("earlier run\n"), "{contents}");
    let line = contents
        .lines()
        .find(|line| line.contains("One or more environment variables are not set"))
        .unwrap_or_else(|| panic!("config error missing from log: {contents}"));
    assert!(line.contains("ERROR"), "{line}");
    assert!(line.contains("POSTGRES_USER"), "{line}");
}
