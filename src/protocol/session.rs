//! The per-connection SMTP handshake state machine.
//!
//! A session advances strictly through
//! `Connected -> Greeted -> ChallengeSent -> UsernameSent -> PasswordSent`
//! and terminates in `Authenticated` or `Rejected`. Every read and write
//! is bounded by one fixed timeout; any timeout, reset, or unexpected
//! status code fails the exchange without retry. Retrying is the
//! caller's policy decision, not the session's.
//!
//! Replies are read as raw bytes and decoded lossily: banner content is
//! untrusted and must never be able to error the read path.

use crate::error::{ProbeError, ProbeResult};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufStream};
use tokio::time::timeout;

/// Handshake progress of one connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Banner received and accepted.
    Connected,
    /// EHLO exchanged, capabilities acknowledged.
    Greeted,
    /// AUTH LOGIN accepted, server prompted for the username.
    ChallengeSent,
    /// Base64 username sent.
    UsernameSent,
    /// Base64 password sent.
    PasswordSent,
    /// Terminal: the server accepted the credentials.
    Authenticated,
    /// Terminal: any failure or refusal along the way.
    Rejected,
}

/// An SMTP session over any async byte stream.
///
/// Generic over the transport so the handshake can be exercised against
/// in-memory streams in tests.
#[derive(Debug)]
pub struct SmtpSession<S> {
    stream: BufStream<S>,
    timeout: Duration,
    state: SessionState,
    banner: String,
}

impl<S: AsyncRead + AsyncWrite + Unpin> SmtpSession<S> {
    /// Open a session: read the greeting and require a `220` status.
    ///
    /// On any other reply the stream is dropped (closing the transport)
    /// and the error carries a snippet of what the server said.
    pub async fn open(stream: S, read_timeout: Duration) -> ProbeResult<Self> {
        let mut session = Self {
            stream: BufStream::new(stream),
            timeout: read_timeout,
            state: SessionState::Connected,
            banner: String::new(),
        };

        let greeting = session.read_line().await?;
        if !greeting.starts_with("220") {
            session.state = SessionState::Rejected;
            return Err(ProbeError::UnexpectedReply {
                stage: "banner",
                reply: snippet(&greeting),
            });
        }

        session.banner = greeting;
        Ok(session)
    }

    /// The raw greeting line.
    pub fn banner(&self) -> &str {
        &self.banner
    }

    /// Current handshake state.
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Send EHLO and require a `250` code among the reply lines.
    pub async fn greet(&mut self, helo_name: &str) -> ProbeResult<()> {
        debug_assert_eq!(self.state, SessionState::Connected);

        self.send_line(&format!("EHLO {helo_name}")).await?;
        let reply = self.read_reply().await?;

        if reply.iter().any(|line| line.starts_with("250")) {
            self.state = SessionState::Greeted;
            Ok(())
        } else {
            self.state = SessionState::Rejected;
            Err(ProbeError::UnexpectedReply {
                stage: "greeting",
                reply: snippet(reply.first().map(String::as_str).unwrap_or("")),
            })
        }
    }

    /// Request AUTH LOGIN and require the `334` continuation prompt.
    pub async fn request_login(&mut self) -> ProbeResult<()> {
        debug_assert_eq!(self.state, SessionState::Greeted);

        self.send_line("AUTH LOGIN").await?;
        let reply = self.read_line().await?;

        if reply.starts_with("334") {
            self.state = SessionState::ChallengeSent;
            Ok(())
        } else {
            self.state = SessionState::Rejected;
            Err(ProbeError::UnexpectedReply {
                stage: "login request",
                reply: snippet(&reply),
            })
        }
    }

    /// Send the base64-encoded username.
    ///
    /// The reply (normally the password prompt) is read but not gated;
    /// servers vary here and the password reply is the real verdict.
    pub async fn submit_username(&mut self, username: &str) -> ProbeResult<()> {
        debug_assert_eq!(self.state, SessionState::ChallengeSent);

        self.send_line(&BASE64.encode(username)).await?;
        let reply = self.read_line().await?;
        tracing::trace!(reply = %snippet(&reply), "username prompt reply");

        self.state = SessionState::UsernameSent;
        Ok(())
    }

    /// Send the base64-encoded password and read the verdict.
    ///
    /// Returns `true` only on a `235` success reply; anything else is a
    /// rejection, not an error.
    pub async fn submit_password(&mut self, password: &str) -> ProbeResult<bool> {
        debug_assert_eq!(self.state, SessionState::UsernameSent);

        self.send_line(&BASE64.encode(password)).await?;
        self.state = SessionState::PasswordSent;

        let reply = self.read_line().await?;
        if reply.starts_with("235") {
            self.state = SessionState::Authenticated;
            Ok(true)
        } else {
            self.state = SessionState::Rejected;
            Ok(false)
        }
    }

    /// Best-effort QUIT and stream shutdown. Errors are ignored; the
    /// transport is released when the session drops in any case.
    pub async fn quit(&mut self) {
        if self.send_line("QUIT").await.is_ok() {
            let _ = self.read_line().await;
        }
        let wait = self.timeout;
        let stream = &mut self.stream;
        let _ = timeout(wait, stream.shutdown()).await;
    }

    async fn send_line(&mut self, line: &str) -> ProbeResult<()> {
        let wait = self.timeout;
        let stream = &mut self.stream;
        let write = async move {
            stream.write_all(line.as_bytes()).await?;
            stream.write_all(b"\r\n").await?;
            stream.flush().await
        };

        match timeout(wait, write).await {
            Ok(Ok(())) => Ok(()),
            Ok(Err(e)) => Err(ProbeError::Io(e)),
            Err(_) => Err(ProbeError::Timeout),
        }
    }

    async fn read_line(&mut self) -> ProbeResult<String> {
        let mut buf = Vec::new();
        let wait = self.timeout;
        let stream = &mut self.stream;

        match timeout(wait, stream.read_until(b'\n', &mut buf)).await {
            Ok(Ok(0)) => Err(ProbeError::ConnectionClosed),
            Ok(Ok(_)) => Ok(String::from_utf8_lossy(&buf).trim().to_string()),
            Ok(Err(e)) => Err(ProbeError::Io(e)),
            Err(_) => Err(ProbeError::Timeout),
        }
    }

    /// Read a possibly multi-line reply, ending at the `NNN<space>` line.
    async fn read_reply(&mut self) -> ProbeResult<Vec<String>> {
        let mut lines = Vec::new();

        loop {
            let line = match self.read_line().await {
                Ok(line) => line,
                // A close after some lines ends the reply; before any, it fails it.
                Err(ProbeError::ConnectionClosed) if !lines.is_empty() => break,
                Err(e) => return Err(e),
            };

            if line.is_empty() {
                continue;
            }

            let is_final = is_final_reply_line(&line);
            lines.push(line);
            if is_final {
                break;
            }
        }

        Ok(lines)
    }
}

/// A reply ends with a line whose status code is followed by a space.
fn is_final_reply_line(line: &str) -> bool {
    let bytes = line.as_bytes();
    bytes.len() >= 4 && bytes[..3].iter().all(u8::is_ascii_digit) && bytes[3] == b' '
}

fn snippet(reply: &str) -> String {
    reply.chars().take(64).collect()
}
