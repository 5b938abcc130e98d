//! One-shot HTTP endpoint for tests: accepts a single connection on an
//! ephemeral port, records the request and answers with a canned response.

use std::io::{BufRead, BufReader, Read, Write};
use std::net::{TcpListener, TcpStream};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use reqwest::blocking::Client;

/// Client without proxy detection, so 127.0.0.1 is always reached directly.
pub(crate) fn test_client(timeout: Duration) -> Client {
    Client::builder()
        .timeout(timeout)
        .no_proxy()
        .build()
        .unwrap()
}

#[derive(Debug, Default)]
pub(crate) struct Received {
    pub request_line: String,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl Received {
    pub fn header(&self, name: &str) -> Option<String> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.clone())
    }
}

pub(crate) struct MockServer {
    pub url: String,
    handle: JoinHandle<Received>,
}

impl MockServer {
    pub fn respond(status: u16, body: &str) -> Self {
        Self::respond_claiming(status, body, body.len())
    }

    /// Announces `content_length` bytes but sends only `body`, then hangs up.
    pub fn truncated(status: u16, body: &str, content_length: usize) -> Self {
        Self::respond_claiming(status, body, content_length)
    }

    fn respond_claiming(status: u16, body: &str, content_length: usize) -> Self {
        let body = body.to_string();
        Self::spawn(move |mut stream| {
            let received = read_request(&stream);
            write!(
                stream,
                "HTTP/1.1 {status} Mock\r\n\
                 Content-Type: application/json\r\n\
                 Content-Length: {content_length}\r\n\
                 Connection: close\r\n\r\n{body}"
            )
            .unwrap();
            stream.flush().unwrap();
            received
        })
    }

    /// Accepts and reads the request, then holds the connection open
    /// without answering.
    pub fn stall(hold: Duration) -> Self {
        Self::spawn(move |stream| {
            let received = read_request(&stream);
            thread::sleep(hold);
            drop(stream);
            received
        })
    }

    /// Url of a port nothing listens on.
    pub fn closed_url() -> String {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        format!("http://{addr}")
    }

    fn spawn<F>(handler: F) -> Self
    where
        F: FnOnce(TcpStream) -> Received + Send + 'static,
    {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let url = format!("http://{}", listener.local_addr().unwrap());
        let handle = thread::spawn(move || {
            let (stream, _) = listener.accept().unwrap();
            handler(stream)
        });
        MockServer { url, handle }
    }

    pub fn received(self) -> Received {
        self.handle.join().unwrap()
    }
}

fn read_request(stream: &TcpStream) -> Received {
    let mut reader = BufReader::new(stream);
    let mut received = Received::default();

    let mut line = String::new();
    reader.read_line(&mut line).unwrap();
    received.request_line = line.trim_end().to_string();

    loop {
        line.clear();
        reader.read_line(&mut line).unwrap();
        let header = line.trim_end();
        if header.is_empty() {
            break;
        }
        if let Some((k, v)) = header.split_once(':') {
            received
                .headers
                .push((k.trim().to_string(), v.trim().to_string()));
        }
    }

    let len = received
        .header("content-length")
        .and_then(|l| l.parse::<usize>().ok())
        .unwrap_or(0);
    let mut body = vec![0; len];
    reader.read_exact(&mut body).unwrap();
    received.body = String::from_utf8(body).unwrap();
    received
}
