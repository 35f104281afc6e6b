//! Full-engine test against an in-process mock SMTP server.
//!
//! Two hosts are scanned with one user and two passwords. The first
//! host accepts exactly one credential pair; the second is never live.
//! The scan must record exactly one result, the report must list
//! exactly one server block, and regeneration must be idempotent.

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use mailsweep::config::ScanSettings;
use mailsweep::notify::{DispatchPolicy, GateConfig, NotificationGate, Notifier};
use mailsweep::scanner::{run_scan, ScanJob};
use mailsweep::storage::ResultStore;
use mailsweep::types::{HostTarget, ScanId};
use mailsweep::NotifyError;
use std::net::IpAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};
use tokio_util::sync::CancellationToken;

struct CountingNotifier(Arc<AtomicUsize>);

#[async_trait]
impl Notifier for CountingNotifier {
    async fn send(&self, _subject: &str, _body: &str) -> Result<(), NotifyError> {
        self.0.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

enum Phase {
    Command,
    Username,
    Password,
}

/// Speak just enough SMTP to exercise the scanner: banner, EHLO,
/// AUTH LOGIN, and a single accepted credential pair.
async fn serve_connection(stream: TcpStream, good_user_b64: String, good_pass_b64: String) {
    let (read_half, mut write_half) = stream.into_split();
    let mut reader = BufReader::new(read_half);

    if write_half
        .write_all(b"220 mail.testhost.com ESMTP ready\r\n")
        .await
        .is_err()
    {
        return;
    }

    let mut phase = Phase::Command;
    let mut user_ok = false;
    let mut line = String::new();

    loop {
        line.clear();
        match reader.read_line(&mut line).await {
            Ok(0) | Err(_) => break,
            Ok(_) => {}
        }
        let input = line.trim().to_string();

        let reply: String = match phase {
            Phase::Command => {
                let upper = input.to_uppercase();
                if upper.starts_with("EHLO") {
                    "250-mail.testhost.com\r\n250 AUTH LOGIN PLAIN".to_string()
                } else if upper == "AUTH LOGIN" {
                    phase = Phase::Username;
                    "334 VXNlcm5hbWU6".to_string()
                } else if upper == "QUIT" {
                    let _ = write_half.write_all(b"221 Bye\r\n").await;
                    break;
                } else {
                    "502 command not implemented".to_string()
                }
            }
            Phase::Username => {
                user_ok = input == good_user_b64;
                phase = Phase::Password;
                "334 UGFzc3dvcmQ6".to_string()
            }
            Phase::Password => {
                let accepted = user_ok && input == good_pass_b64;
                phase = Phase::Command;
                if accepted {
                    "235 2.7.0 Authentication successful".to_string()
                } else {
                    "535 5.7.8 Authentication credentials invalid".to_string()
                }
            }
        };

        if write_half
            .write_all(format!("{reply}\r\n").as_bytes())
            .await
            .is_err()
        {
            break;
        }
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn scan_records_exactly_one_verified_pair() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();

    // Only u1@testhost.com / p2 is accepted; the domain comes from the
    // banner, not from the probed address.
    let good_user = STANDARD.encode("u1@testhost.com");
    let good_pass = STANDARD.encode("p2");
    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((stream, _)) => {
                    tokio::spawn(serve_connection(
                        stream,
                        good_user.clone(),
                        good_pass.clone(),
                    ));
                }
                Err(_) => break,
            }
        }
    });

    let dir = tempfile::tempdir().unwrap();
    let store = ResultStore::new(dir.path().join("raw.txt"), dir.path().join("report.txt"));

    let sent = Arc::new(AtomicUsize::new(0));
    let mut gate = NotificationGate::new(
        GateConfig {
            state_path: dir.path().join("state.json"),
            max_per_hour: 10,
            min_interval_secs: 0,
            policy: DispatchPolicy::CountAttempts,
            enabled: true,
        },
        Box::new(CountingNotifier(Arc::clone(&sent))),
    );

    let mut settings = ScanSettings::default();
    settings.port = port;
    settings.timeout_ms = 3_000;
    settings.shutdown_grace_secs = 10;

    let hosts = vec![
        HostTarget::new("127.0.0.1", "127.0.0.1".parse::<IpAddr>().unwrap()),
        // Nothing listens here on the mock's port.
        HostTarget::new("127.0.0.2", "127.0.0.2".parse::<IpAddr>().unwrap()),
    ];

    let job = ScanJob {
        id: ScanId::new(),
        hosts,
        users: vec!["u1".to_string()],
        passwords: vec!["p1".to_string(), "p2".to_string()],
        workers: 3,
        settings,
        quiet: true,
        show_progress: false,
    };

    let summary = run_scan(job, &store, &mut gate, CancellationToken::new()).await;

    assert_eq!(summary.tasks_total, 4);
    assert_eq!(summary.found, 1);

    // Exactly one raw line, for the one accepted pair.
    let raw = std::fs::read_to_string(store.raw_path()).unwrap();
    let lines: Vec<&str> = raw.lines().collect();
    assert_eq!(lines.len(), 1);
    assert!(
        lines[0].starts_with("127.0.0.1|u1@testhost.com|p2|testhost.com|"),
        "unexpected raw line: {}",
        lines[0]
    );

    // The report lists exactly one numbered block.
    let report = std::fs::read_to_string(store.report_path()).unwrap();
    assert!(report.contains("Total servers: 1"));
    assert!(report.contains("Server #1"));
    assert!(!report.contains("Server #2"));

    // Regeneration without new records is byte-identical.
    store.write_report().unwrap();
    let regenerated = std::fs::read_to_string(store.report_path()).unwrap();
    assert_eq!(report, regenerated);

    // One per-host alert plus the end-of-scan summary.
    assert_eq!(sent.load(Ordering::SeqCst), 2);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn liveness_only_scan_records_nothing() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();

    let good_user = STANDARD.encode("unused");
    let good_pass = STANDARD.encode("unused");
    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((stream, _)) => {
                    tokio::spawn(serve_connection(
                        stream,
                        good_user.clone(),
                        good_pass.clone(),
                    ));
                }
                Err(_) => break,
            }
        }
    });

    let dir = tempfile::tempdir().unwrap();
    let store = ResultStore::new(dir.path().join("raw.txt"), dir.path().join("report.txt"));
    let sent = Arc::new(AtomicUsize::new(0));
    let mut gate = NotificationGate::new(
        GateConfig {
            state_path: dir.path().join("state.json"),
            max_per_hour: 10,
            min_interval_secs: 0,
            policy: DispatchPolicy::CountAttempts,
            enabled: true,
        },
        Box::new(CountingNotifier(Arc::clone(&sent))),
    );

    let mut settings = ScanSettings::default();
    settings.port = port;
    settings.timeout_ms = 3_000;

    let job = ScanJob {
        id: ScanId::new(),
        hosts: vec![HostTarget::new(
            "127.0.0.1",
            "127.0.0.1".parse::<IpAddr>().unwrap(),
        )],
        users: Vec::new(),
        passwords: vec!["p1".to_string()],
        workers: 2,
        settings,
        quiet: true,
        show_progress: false,
    };

    let summary = run_scan(job, &store, &mut gate, CancellationToken::new()).await;

    // One liveness task per host, no credentials tried, nothing stored.
    assert_eq!(summary.tasks_total, 1);
    assert_eq!(summary.found, 0);
    assert!(store.read_raw().unwrap().is_empty());
    assert_eq!(sent.load(Ordering::SeqCst), 0);
}
