//! Session lifecycle and request/response correlation against a mock backend.

mod common;

use std::time::Duration;

use common::{MOCK_SESSION_ID, MockBackend, Reply};
use icd_client::{
    Diagnostic, Error, FileInfoRequest, FileInfoResponse, MessageType, OpenFile, OpenFileAck,
    RegisterViewerAck, RequestOptions, SessionId, SessionState, SessionType,
};

fn open_file_ack(file_id: i32) -> Reply {
    Reply::message(OpenFileAck {
        success: true,
        file_id,
        ..Default::default()
    })
}

// ============================================================================
// Lifecycle
// ============================================================================

#[tokio::test]
async fn connect_registers_new_session() -> anyhow::Result<()> {
    let backend = MockBackend::silent().await;
    let client = backend.client();

    let session = client.connect().await?;

    assert_eq!(session.id, MOCK_SESSION_ID);
    assert_eq!(session.session_type, SessionType::New);
    assert_eq!(client.state(), SessionState::Active);
    assert_eq!(client.session(), Some(session));
    assert_eq!(backend.received_types(), vec![MessageType::RegisterViewer]);
    Ok(())
}

#[tokio::test]
async fn connect_resumes_known_session() -> anyhow::Result<()> {
    let backend = MockBackend::silent().await;
    let client = icd_client::Client::builder()
        .url(backend.url())
        .session_id(SessionId::new(42))
        .api_key("key")
        .build()?;

    let session = client.connect().await?;

    assert_eq!(session.id, SessionId::new(42));
    assert!(session.is_resumed());

    let register: icd_client::RegisterViewer = backend.received()[0].body();
    assert_eq!(register.session_id, SessionId::new(42));
    assert_eq!(register.api_key, "key");
    Ok(())
}

#[tokio::test]
async fn rejected_registration_leaves_client_disconnected() {
    let backend = MockBackend::start(|inbound| match inbound.message_type() {
        MessageType::RegisterViewer => vec![Reply::message(RegisterViewerAck {
            success: false,
            message: "Invalid API key".to_string(),
            ..Default::default()
        })],
        _ => Vec::new(),
    })
    .await;
    let client = backend.client();

    let err = client.connect().await.expect_err("rejected");

    assert!(matches!(&err, Error::Backend { message } if message == "Invalid API key"));
    assert_eq!(client.state(), SessionState::Disconnected);
    assert!(client.session().is_none());
}

#[tokio::test]
async fn second_connect_while_active_fails() {
    let backend = MockBackend::silent().await;
    let client = backend.connected_client().await;

    assert!(matches!(
        client.connect().await,
        Err(Error::Protocol { .. })
    ));
    assert_eq!(client.state(), SessionState::Active);
}

#[tokio::test]
async fn reconnect_after_close() -> anyhow::Result<()> {
    let backend = MockBackend::start(|inbound| match inbound.message_type() {
        MessageType::OpenFile => vec![open_file_ack(0)],
        _ => Vec::new(),
    })
    .await;
    let client = backend.connected_client().await;

    client.close();
    assert_eq!(client.state(), SessionState::Disconnected);

    client.connect().await?;
    let ack = client.open_file("set_QA", "M17_SWex.fits", "0", 0).await?;
    assert!(ack.success);
    Ok(())
}

// ============================================================================
// Correlation
// ============================================================================

#[tokio::test]
async fn open_file_resolves_with_ack() -> anyhow::Result<()> {
    let backend = MockBackend::start(|inbound| match inbound.message_type() {
        MessageType::OpenFile => {
            let request: OpenFile = inbound.body();
            vec![open_file_ack(request.file_id)]
        }
        _ => Vec::new(),
    })
    .await;
    let client = backend.connected_client().await;

    let ack = client.open_file("set_QA", "M17_SWex.fits", "0", 3).await?;

    assert!(ack.success);
    assert_eq!(ack.file_id, 3);
    assert_eq!(client.pending_count(), 0);
    Ok(())
}

#[tokio::test]
async fn failed_file_info_rejects_with_backend_message() {
    let backend = MockBackend::start(|inbound| match inbound.message_type() {
        MessageType::FileInfoRequest => vec![Reply::message(FileInfoResponse {
            success: false,
            message: "File does not exist".to_string(),
            ..Default::default()
        })],
        _ => Vec::new(),
    })
    .await;
    let client = backend.connected_client().await;

    let err = client
        .request(&FileInfoRequest {
            directory: "set_QA".to_string(),
            file: "missing.fits".to_string(),
            hdu: String::new(),
        })
        .await
        .expect_err("rejected");

    assert_eq!(err.to_string(), "Backend error: File does not exist");
    assert_eq!(client.state(), SessionState::Active);
}

#[tokio::test]
async fn concurrent_opens_are_told_apart_by_predicate() -> anyhow::Result<()> {
    // Acks arrive in reverse order once both requests are in.
    let backend = MockBackend::start(|inbound| match inbound.message_type() {
        MessageType::OpenFile if inbound.body::<OpenFile>().file_id == 1 => {
            vec![open_file_ack(1), open_file_ack(0)]
        }
        _ => Vec::new(),
    })
    .await;
    let client = backend.connected_client().await;

    let first = client.open_file("set_QA", "a.fits", "0", 0);
    let second = async {
        tokio::time::sleep(Duration::from_millis(20)).await;
        client.open_file("set_QA", "b.fits", "0", 1).await
    };
    let (first, second) = tokio::join!(first, second);

    assert_eq!(first?.file_id, 0);
    assert_eq!(second?.file_id, 1);
    Ok(())
}

#[tokio::test]
async fn same_type_requests_match_fifo() -> anyhow::Result<()> {
    let backend = MockBackend::start(|inbound| match inbound.message_type() {
        MessageType::OpenFile if inbound.body::<OpenFile>().file_id == 1 => {
            vec![open_file_ack(10), open_file_ack(11)]
        }
        _ => Vec::new(),
    })
    .await;
    let client = backend.connected_client().await;

    let zero = OpenFile {
        file_id: 0,
        ..Default::default()
    };
    let one = OpenFile {
        file_id: 1,
        ..Default::default()
    };
    let (first, second) = tokio::join!(client.request(&zero), async {
        tokio::time::sleep(Duration::from_millis(20)).await;
        client.request(&one).await
    });

    assert_eq!(first?.file_id, 10);
    assert_eq!(second?.file_id, 11);
    Ok(())
}

#[tokio::test]
async fn request_times_out_and_late_response_is_dropped() {
    let backend = MockBackend::start(|inbound| match inbound.message_type() {
        MessageType::OpenFile => vec![Reply::Delay(Duration::from_millis(200)), open_file_ack(0)],
        _ => Vec::new(),
    })
    .await;
    let client = backend.connected_client().await;
    let mut diagnostics = client.diagnostics();

    let err = client
        .request_with(
            &OpenFile::default(),
            RequestOptions::new().timeout(Duration::from_millis(50)),
        )
        .await
        .expect_err("timeout");

    assert!(matches!(
        err,
        Error::RequestTimeout {
            message_type: MessageType::OpenFileAck,
            timeout_ms: 50,
            ..
        }
    ));
    assert_eq!(client.pending_count(), 0);

    let diagnostic = tokio::time::timeout(Duration::from_secs(2), diagnostics.recv())
        .await
        .expect("late ack")
        .expect("diagnostic");
    assert!(matches!(
        diagnostic,
        Diagnostic::UnmatchedResponse {
            message_type: MessageType::OpenFileAck,
            ..
        }
    ));
}

#[tokio::test]
async fn pending_limit_rejects_excess_requests() {
    let backend = MockBackend::silent().await;
    let client = icd_client::Client::builder()
        .url(backend.url())
        .max_pending_requests(1)
        .build()
        .expect("client");
    client.connect().await.expect("connect");

    let stuck = {
        let client = client.clone();
        tokio::spawn(async move { client.request(&OpenFile::default()).await })
    };
    while client.pending_count() == 0 {
        tokio::time::sleep(Duration::from_millis(5)).await;
    }

    assert!(matches!(
        client.request(&OpenFile::default()).await,
        Err(Error::Protocol { .. })
    ));

    client.close();
    assert!(matches!(stuck.await, Ok(Err(Error::ConnectionClosed))));
}

// ============================================================================
// Close
// ============================================================================

#[tokio::test]
async fn close_fails_pending_requests_exactly_once() {
    let backend = MockBackend::silent().await;
    let client = backend.connected_client().await;

    let requests: Vec<_> = (0..3)
        .map(|file_id| {
            let client = client.clone();
            tokio::spawn(async move {
                client
                    .request(&OpenFile {
                        file_id,
                        ..Default::default()
                    })
                    .await
            })
        })
        .collect();
    while client.pending_count() < 3 {
        tokio::time::sleep(Duration::from_millis(5)).await;
    }

    client.close();
    client.close();

    for request in requests {
        assert!(matches!(request.await, Ok(Err(Error::ConnectionClosed))));
    }
    assert_eq!(client.state(), SessionState::Disconnected);
    assert_eq!(client.message_receiving(), 0);
    assert!(matches!(
        client.request(&OpenFile::default()).await,
        Err(Error::NotConnected)
    ));
}

#[tokio::test]
async fn remote_close_fails_pending_requests() {
    let backend = MockBackend::start(|inbound| match inbound.message_type() {
        MessageType::OpenFile => vec![Reply::Close],
        _ => Vec::new(),
    })
    .await;
    let client = backend.connected_client().await;
    let mut diagnostics = client.diagnostics();

    let result = client.request(&OpenFile::default()).await;

    assert!(matches!(result, Err(Error::ConnectionClosed)));
    assert_eq!(client.state(), SessionState::Disconnected);
    assert_eq!(diagnostics.recv().await.ok(), Some(Diagnostic::Disconnected));
}

#[tokio::test]
async fn malformed_frame_does_not_break_the_session() -> anyhow::Result<()> {
    let backend = MockBackend::start(|inbound| match inbound.message_type() {
        MessageType::OpenFile => vec![Reply::Raw(vec![0xde, 0xad]), open_file_ack(0)],
        _ => Vec::new(),
    })
    .await;
    let client = backend.connected_client().await;
    let mut diagnostics = client.diagnostics();

    let ack = client.open_file("set_QA", "M17_SWex.fits", "0", 0).await?;

    assert!(ack.success);
    assert!(matches!(
        diagnostics.recv().await,
        Ok(Diagnostic::DecodeFailed { .. })
    ));
    // RegisterViewerAck, the malformed frame and OpenFileAck.
    assert_eq!(client.message_receiving(), 3);
    Ok(())
}
