//! Market data acquisition and storage.
//!
//! The crate covers the path from the public archive to the local store:
//! [`ApiClient`] talks HTTP with retries, [`BinanceVisionFetcher`] mirrors
//! daily ZIP archives to disk, [`archive`] parses them, and
//! [`HistoricalDataProcessor`] inserts the parsed rows into a [`KlineStore`].
//! [`BarCache`] keeps recently loaded bar series in memory.

pub mod archive;
mod cache;
mod client;
mod fetcher;
mod processor;
mod store;

pub use cache::{BarCache, CacheStats};
pub use client::{ApiClient, ClientConfig};
pub use fetcher::{BinanceVisionFetcher, BINANCE_VISION_URL};
pub use processor::{find_archives, HistoricalDataProcessor, IngestSummary};
pub use store::KlineStore;

#[cfg(test)]
pub(crate) mod test_support {
    //! Minimal in-process HTTP server for exercising the client and fetcher.

    use std::collections::{HashMap, VecDeque};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// Queued responses per path. The last response for a path repeats.
    pub struct StubServer {
        pub base_url: String,
        hits: Arc<AtomicUsize>,
    }

    impl StubServer {
        pub async fn start(routes: Vec<(&str, Vec<(u16, Vec<u8>)>)>) -> Self {
            let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
            let addr = listener.local_addr().unwrap();
            let hits = Arc::new(AtomicUsize::new(0));

            let table: HashMap<String, VecDeque<(u16, Vec<u8>)>> = routes
                .into_iter()
                .map(|(path, responses)| (path.to_string(), responses.into_iter().collect()))
                .collect();
            let table = Arc::new(Mutex::new(table));

            let counter = hits.clone();
            tokio::spawn(async move {
                loop {
                    let Ok((mut socket, _)) = listener.accept().await else {
                        break;
                    };
                    let table = table.clone();
                    let counter = counter.clone();
                    tokio::spawn(async move {
                        let mut buf = Vec::new();
                        let mut chunk = [0u8; 1024];
                        while !buf.windows(4).any(|w| w == b"\r\n\r\n") {
                            match socket.read(&mut chunk).await {
                                Ok(0) | Err(_) => return,
                                Ok(n) => buf.extend_from_slice(&chunk[..n]),
                            }
                        }
                        counter.fetch_add(1, Ordering::SeqCst);

                        let request = String::from_utf8_lossy(&buf);
                        let path = request
                            .lines()
                            .next()
                            .and_then(|line| line.split_whitespace().nth(1))
                            .unwrap_or("/")
                            .to_string();

                        let (status, body) = {
                            let mut table = table.lock().unwrap();
                            match table.get_mut(&path) {
                                Some(queue) if queue.len() > 1 => queue.pop_front().unwrap(),
                                Some(queue) => queue.front().cloned().unwrap(),
                                None => (404, b"not found".to_vec()),
                            }
                        };

                        let head = format!(
                            "HTTP/1.1 {} Stub\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
                            status,
                            body.len()
                        );
                        let _ = socket.write_all(head.as_bytes()).await;
                        let _ = socket.write_all(&body).await;
                        let _ = socket.shutdown().await;
                    });
                }
            });

            Self {
                base_url: format!("http://{}", addr),
                hits,
            }
        }

        pub fn hits(&self) -> usize {
            self.hits.load(Ordering::SeqCst)
        }
    }
}
