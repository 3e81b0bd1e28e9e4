/// HTTP transport: POST the uncompressed JSON body to a GELF HTTP input.

use std::sync::Arc;
use std::time::Duration;

use gelf_types::Message;
use reqwest::blocking::Client;
use reqwest::header::CONTENT_TYPE;

use crate::error::{GelfError, Result};
use crate::logging::{DeliveryEvent, DeliveryLog, DeliveryLogger, TracingLogger};

pub struct HttpTransport {
    client: Client,
    url: String,
    logger: Arc<dyn DeliveryLogger>,
}

impl HttpTransport {
    /// `timeout` bounds each request; `None` waits indefinitely.
    pub fn new(url: impl Into<String>, timeout: Option<Duration>) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            url: url.into(),
            logger: Arc::new(TracingLogger),
        })
    }

    pub fn with_logger(mut self, logger: Arc<dyn DeliveryLogger>) -> Self {
        self.logger = logger;
        self
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn write_message(&self, message: &Message) -> Result<()> {
        self.post(message).inspect_err(|e| {
            self.logger.log(DeliveryLog {
                transport: "http",
                event: DeliveryEvent::Failed {
                    message: e.to_string(),
                },
            });
        })
    }

    fn post(&self, message: &Message) -> Result<()> {
        let body = message.to_json()?;
        let bytes = body.len();

        let response = self
            .client
            .post(&self.url)
            .header(CONTENT_TYPE, "application/json")
            .body(body)
            .send()?;

        // Consuming the response drains the body and releases the connection
        // back to the pool, whatever the status.
        let status = response.status();
        let drained = response.bytes();

        if !status.is_success() {
            return Err(GelfError::Rejected {
                status: status.as_u16(),
            });
        }
        drained?;

        self.logger.log(DeliveryLog {
            transport: "http",
            event: DeliveryEvent::Posted {
                status: status.as_u16(),
                bytes,
            },
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::io::{BufRead, BufReader, Read, Write};
    use std::net::{TcpListener, TcpStream};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::thread;

    use mockito::{Matcher, Server};

    use super::*;

    fn message() -> Message {
        Message::new("web-01", "hello").with_facility("tests")
    }

    #[test]
    fn posts_uncompressed_json() {
        let mut server = Server::new();
        let msg = message();
        let mock = server
            .mock("POST", "/gelf")
            .match_header("content-type", "application/json")
            .match_body(Matcher::Exact(
                String::from_utf8(msg.to_json().unwrap()).unwrap(),
            ))
            .with_status(202)
            .create();

        let transport = HttpTransport::new(format!("{}/gelf", server.url()), None).unwrap();
        transport.write_message(&msg).unwrap();
        mock.assert();
    }

    fn serve_connection(stream: TcpStream) {
        let mut writer = stream.try_clone().unwrap();
        let mut reader = BufReader::new(stream);
        loop {
            let mut line = String::new();
            match reader.read_line(&mut line) {
                Ok(0) | Err(_) => return,
                Ok(_) => {}
            }
            let mut content_length = 0;
            loop {
                line.clear();
                if reader.read_line(&mut line).unwrap_or(0) == 0 {
                    return;
                }
                if line == "\r\n" {
                    break;
                }
                if let Some(value) = line.to_ascii_lowercase().strip_prefix("content-length:") {
                    content_length = value.trim().parse().unwrap();
                }
            }
            let mut body = vec![0u8; content_length];
            if reader.read_exact(&mut body).is_err() {
                return;
            }
            let reply = b"HTTP/1.1 202 Accepted\r\nContent-Length: 8\r\n\r\naccepted";
            if writer.write_all(reply).is_err() {
                return;
            }
        }
    }

    /// Keep-alive HTTP/1.1 endpoint that counts accepted connections.
    fn counting_server() -> (String, Arc<AtomicUsize>) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let url = format!("http://{}/gelf", listener.local_addr().unwrap());
        let connections = Arc::new(AtomicUsize::new(0));
        let counter = connections.clone();
        thread::spawn(move || {
            for stream in listener.incoming() {
                let Ok(stream) = stream else { return };
                counter.fetch_add(1, Ordering::SeqCst);
                thread::spawn(move || serve_connection(stream));
            }
        });
        (url, connections)
    }

    #[test]
    fn drained_responses_keep_one_connection() {
        let (url, connections) = counting_server();
        let transport = HttpTransport::new(url, Some(Duration::from_secs(5))).unwrap();
        for _ in 0..10 {
            transport.write_message(&message()).unwrap();
            // let the pool take the idle connection back
            thread::sleep(Duration::from_millis(20));
        }
        assert_eq!(connections.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn repeated_posts_all_arrive() {
        let mut server = Server::new();
        let mock = server
            .mock("POST", "/gelf")
            .with_status(202)
            .with_body("accepted")
            .expect(25)
            .create();

        let transport = HttpTransport::new(format!("{}/gelf", server.url()), None).unwrap();
        for _ in 0..25 {
            transport.write_message(&message()).unwrap();
        }
        mock.assert();
    }

    #[test]
    fn non_success_status_is_rejected() {
        let mut server = Server::new();
        let mock = server
            .mock("POST", "/gelf")
            .with_status(500)
            .with_body("boom")
            .expect(3)
            .create();

        let transport = HttpTransport::new(format!("{}/gelf", server.url()), None).unwrap();
        for _ in 0..3 {
            let err = transport.write_message(&message()).unwrap_err();
            assert!(matches!(err, GelfError::Rejected { status: 500 }));
        }
        mock.assert();
    }

    #[test]
    fn connection_failure_is_surfaced() {
        // Bind then drop to get a port nothing listens on.
        let port = std::net::TcpListener::bind("127.0.0.1:0")
            .unwrap()
            .local_addr()
            .unwrap()
            .port();
        let transport = HttpTransport::new(
            format!("http://127.0.0.1:{port}/gelf"),
            Some(Duration::from_secs(2)),
        )
        .unwrap();

        let err = transport.write_message(&message()).unwrap_err();
        assert!(matches!(err, GelfError::Http(_)));
    }

    #[test]
    fn reserved_extension_key_is_not_posted() {
        let mut server = Server::new();
        let mock = server.mock("POST", "/gelf").expect(0).create();

        let mut msg = message();
        msg.insert_extra("host", "shadow").unwrap();
        let transport = HttpTransport::new(format!("{}/gelf", server.url()), None).unwrap();
        assert!(matches!(
            transport.write_message(&msg),
            Err(GelfError::Codec(_))
        ));
        mock.assert();
    }
}
