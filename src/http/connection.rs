use std::net::SocketAddr;
use std::sync::Arc;

use bytes::BytesMut;
use tokio::io::AsyncReadExt;
use tokio::net::TcpStream;

use crate::http::parser::{ParseError, parse_request};
use crate::http::request::Request;
use crate::http::writer::ResponseWriter;
use crate::serve::{engine, error_page};
use crate::site::SiteRegistry;

/// Cap on the buffered request, headers and body together.
const MAX_REQUEST_BYTES: usize = 64 * 1024;

pub struct Connection {
    stream: TcpStream,
    peer: SocketAddr,
    registry: Arc<SiteRegistry>,
    buffer: BytesMut,
    state: ConnectionState,
}

enum ConnectionState {
    Reading,
    Processing(Request),
    Writing(ResponseWriter),
    Closed,
}

enum ReadEvent {
    Complete(Box<Request>),
    Eof,
    Rejected { status: u16, version: Option<String> },
}

impl Connection {
    pub fn new(stream: TcpStream, peer: SocketAddr, registry: Arc<SiteRegistry>) -> Self {
        Self {
            stream,
            peer,
            registry,
            buffer: BytesMut::with_capacity(4096),
            state: ConnectionState::Reading,
        }
    }

    /// Runs the session to completion under the configured idle
    /// deadline. A connection that cannot finish in time is dropped,
    /// which closes the socket.
    pub async fn run(&mut self) -> anyhow::Result<()> {
        let deadline = self.registry.idle_timeout();
        match tokio::time::timeout(deadline, self.drive()).await {
            Ok(result) => result,
            Err(_) => {
                tracing::warn!(peer = %self.peer, "Idle deadline expired, dropping connection");
                Ok(())
            }
        }
    }

    /// Drives the connection through its states until the single response
    /// has been written and the socket can close.
    async fn drive(&mut self) -> anyhow::Result<()> {
        loop {
            match &mut self.state {
                ConnectionState::Reading => match self.read_request().await? {
                    ReadEvent::Complete(req) => {
                        self.state = ConnectionState::Processing(*req);
                    }
                    ReadEvent::Eof => {
                        self.state = ConnectionState::Closed;
                    }
                    ReadEvent::Rejected { status, version } => {
                        let response =
                            error_page::render(&self.registry, status, version.as_deref()).await;
                        tracing::info!(peer = %self.peer, status, "Request rejected");
                        self.state = ConnectionState::Writing(ResponseWriter::new(&response));
                    }
                },

                ConnectionState::Processing(req) => {
                    let response = engine::respond(req, &self.registry, self.peer).await;

                    tracing::info!(
                        peer = %self.peer,
                        method = %req.method,
                        path = %req.path,
                        host = req.host.as_deref().unwrap_or("-"),
                        status = response.status,
                        "Request handled"
                    );

                    self.state = ConnectionState::Writing(ResponseWriter::new(&response));
                }

                ConnectionState::Writing(writer) => {
                    writer.write_to_stream(&mut self.stream).await?;
                    self.state = ConnectionState::Closed;
                }

                ConnectionState::Closed => {
                    break;
                }
            }
        }

        Ok(())
    }

    /// Reads until the buffer parses as a full request or the client gives
    /// up. Parse verdicts that already carry an HTTP status are returned
    /// as `Rejected` so the caller can render the error page; only actual
    /// socket failures become errors.
    async fn read_request(&mut self) -> anyhow::Result<ReadEvent> {
        loop {
            match parse_request(&self.buffer) {
                Ok((request, consumed)) => {
                    let _ = self.buffer.split_to(consumed);
                    return Ok(ReadEvent::Complete(Box::new(request)));
                }

                Err(ParseError::Incomplete) => {
                    // Need more data, fall through to the read below
                }

                Err(ParseError::MissingHost) => {
                    return Ok(ReadEvent::Rejected {
                        status: 400,
                        version: Some("HTTP/1.1".to_string()),
                    });
                }

                Err(ParseError::UnsupportedMethod) | Err(ParseError::Malformed) => {
                    return Ok(ReadEvent::Rejected {
                        status: 501,
                        version: None,
                    });
                }
            }

            if self.buffer.len() > MAX_REQUEST_BYTES {
                return Ok(ReadEvent::Rejected {
                    status: 501,
                    version: None,
                });
            }

            let n = self.stream.read_buf(&mut self.buffer).await?;
            if n == 0 {
                // Client closed before completing a request
                return Ok(ReadEvent::Eof);
            }
        }
    }
}
