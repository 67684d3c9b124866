//! Minimal HTTP/1.1 server standing in for the token and catalog endpoints.

#![allow(dead_code)]

use std::{
    io::{BufRead, BufReader, Read, Write},
    net::{TcpListener, TcpStream},
    sync::Arc,
    thread,
    time::Duration,
};

use crossbeam_channel::{unbounded, Receiver, Sender};
use musicshop_core::config::Config;
use url::Url;

#[derive(Clone, Debug)]
pub struct Recorded {
    pub method: String,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl Recorded {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    pub fn query(&self, name: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }
}

pub struct Reply {
    pub status: u16,
    pub body: String,
    pub delay: Duration,
}

impl Reply {
    pub fn json(body: &str) -> Self {
        Self::status(200, body)
    }

    pub fn status(status: u16, body: &str) -> Self {
        Self {
            status,
            body: body.to_string(),
            delay: Duration::ZERO,
        }
    }

    pub fn after(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

pub struct StubServer {
    pub base: String,
    requests: Receiver<Recorded>,
}

impl StubServer {
    pub fn start<F>(router: F) -> Self
    where
        F: Fn(&Recorded) -> Reply + Send + Sync + 'static,
    {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let base = format!("http://{}/", listener.local_addr().unwrap());
        let (send, recv) = unbounded();
        let router = Arc::new(router);

        thread::spawn(move || {
            for stream in listener.incoming() {
                let Ok(stream) = stream else { break };
                let router = router.clone();
                let send = send.clone();
                thread::spawn(move || handle_connection(stream, &*router, &send));
            }
        });

        Self {
            base,
            requests: recv,
        }
    }

    /// Config pointing both the token URL and the API base at this server.
    pub fn config(&self) -> Config {
        Config {
            client_id: "my-client".to_string(),
            client_secret: "my-secret".to_string(),
            token_url: format!("{}api/token", self.base),
            api_base: self.base.clone(),
            ..Config::default()
        }
    }

    pub fn requests(&self) -> Vec<Recorded> {
        self.requests.try_iter().collect()
    }
}

/// Base URL of a port nothing listens on.
pub fn closed_port_base() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let base = format!("http://{}/", listener.local_addr().unwrap());
    drop(listener);
    base
}

fn handle_connection<F>(mut stream: TcpStream, router: &F, send: &Sender<Recorded>)
where
    F: Fn(&Recorded) -> Reply,
{
    let Some(recorded) = read_request(&stream) else {
        return;
    };
    let reply = router(&recorded);
    let _ = send.send(recorded);

    thread::sleep(reply.delay);
    let response = format!(
        "HTTP/1.1 {} {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        reply.status,
        if reply.status < 400 { "OK" } else { "Error" },
        reply.body.len(),
        reply.body
    );
    let _ = stream.write_all(response.as_bytes());
    let _ = stream.flush();
}

fn read_request(stream: &TcpStream) -> Option<Recorded> {
    let mut reader = BufReader::new(stream.try_clone().ok()?);

    let mut request_line = String::new();
    reader.read_line(&mut request_line).ok()?;
    let mut parts = request_line.split_whitespace();
    let method = parts.next()?.to_string();
    let target = parts.next()?.to_string();

    let mut headers = Vec::new();
    let mut content_length = 0;
    loop {
        let mut line = String::new();
        reader.read_line(&mut line).ok()?;
        let line = line.trim_end();
        if line.is_empty() {
            break;
        }
        if let Some((key, value)) = line.split_once(':') {
            let key = key.trim().to_ascii_lowercase();
            let value = value.trim().to_string();
            if key == "content-length" {
                content_length = value.parse().unwrap_or(0);
            }
            headers.push((key, value));
        }
    }

    let mut body = vec![0; content_length];
    reader.read_exact(&mut body).ok()?;

    let url = Url::parse(&format!("http://localhost{}", target)).ok()?;
    Some(Recorded {
        method,
        path: url.path().to_string(),
        query: url.query_pairs().into_owned().collect(),
        headers,
        body: String::from_utf8_lossy(&body).into_owned(),
    })
}
