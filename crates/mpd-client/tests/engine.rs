//! Integration tests against the seed scenarios of §8.

mod support;

use mpd_client::{Client, ConnectionState, Endpoint, MpdError, Subsystem};
use support::{Listener, Stub};

async fn connect_pair(welcome: &[u8]) -> (std::sync::Arc<Client>, Stub) {
    let listener = Listener::bind().await;
    let addr = listener.addr;
    let (client, stub) = tokio::join!(
        Client::connect_async(Endpoint::new(addr.ip().to_string(), addr.port())),
        listener.accept(welcome)
    );
    (std::sync::Arc::new(client.unwrap()), stub)
}

#[tokio::test]
async fn s1_connect_reports_version_and_state() {
    let (client, _stub) = connect_pair(b"OK MPD 0.22.3\n").await;

    assert_eq!(client.version().await, mpd_client::Version::new(0, 22, 3));
    assert_eq!(client.state().await, ConnectionState::Connected);
}

#[tokio::test]
async fn s2_status_reply() {
    let (client, mut stub) = connect_pair(b"OK MPD 0.22.3\n").await;

    let handle = {
        let client = client.clone();
        tokio::spawn(async move { client.status().await })
    };
    let sent = stub.recv_client_bytes().await;
    assert_eq!(sent, b"status\n");
    stub.send(b"volume: 42\nstate: play\nOK\n").await;

    let status = handle.await.unwrap().unwrap();
    assert_eq!(status.volume, Some(42));
    assert_eq!(
        status.playback,
        mpd_proto::accumulators::PlaybackState::Playing
    );
}

#[tokio::test]
async fn s3_currentsong_reply() {
    let (client, mut stub) = connect_pair(b"OK MPD 0.22.3\n").await;

    let handle = {
        let client = client.clone();
        tokio::spawn(async move { client.currentsong().await })
    };
    let sent = stub.recv_client_bytes().await;
    assert_eq!(sent, b"currentsong\n");
    stub.send(b"file: a/b.flac\nTitle: Hi\nTitle: Also\nOK\n")
        .await;

    let song = handle.await.unwrap().unwrap();
    assert_eq!(song.file.as_deref(), Some("a/b.flac"));
    assert_eq!(
        song.tag_values("Title"),
        ["Hi".to_string(), "Also".to_string()]
    );
}

#[tokio::test]
async fn s4_ack_does_not_poison_the_queue() {
    let (client, mut stub) = connect_pair(b"OK MPD 0.22.3\n").await;

    let first = {
        let client = client.clone();
        tokio::spawn(async move { client.status().await })
    };
    let sent = stub.recv_client_bytes().await;
    assert_eq!(sent, b"status\n");
    stub.send(b"ACK [2@0] {status} bad args\n").await;

    let err = first.await.unwrap().unwrap_err();
    match err {
        MpdError::Protocol(ack) => assert_eq!(ack.message, "bad args"),
        other => panic!("expected Protocol error, got {other:?}"),
    }

    let second = {
        let client = client.clone();
        tokio::spawn(async move { client.stats().await })
    };
    let sent = stub.recv_client_bytes().await;
    assert_eq!(sent, b"stats\n");
    stub.send(b"songs: 7\nOK\n").await;
    let stats = second.await.unwrap().unwrap();
    assert_eq!(stats.songs, Some(7));
}

#[tokio::test]
async fn s5_noidle_interjection() {
    let (client, mut stub) = connect_pair(b"OK MPD 0.22.3\n").await;

    let idle_client = client.clone();
    let idle_handle = tokio::spawn(async move {
        idle_client
            .idle(Subsystem::empty(), mpd_client::CancelHandle::new())
            .await
    });
    let idle_sent = stub.recv_client_bytes().await;
    assert_eq!(idle_sent, b"idle\n");

    // Give the idle task time to actually reach the queue before the
    // second command is submitted, so `noidle` has a tail to interject
    // against.
    tokio::time::sleep(std::time::Duration::from_millis(20)).await;

    let status_client = client.clone();
    let status_handle = tokio::spawn(async move { status_client.status().await });

    let mut captured = Vec::new();
    while captured.len() < b"noidle\nstatus\n".len() {
        captured.extend(stub.recv_client_bytes().await);
    }
    assert_eq!(captured, b"noidle\nstatus\n");

    stub.send(b"changed: player\nOK\n").await;
    let idle_outcome = idle_handle.await.unwrap().unwrap();
    assert!(idle_outcome.changed.contains(Subsystem::PLAYER));

    stub.send(b"volume: 10\nstate: stop\nOK\n").await;
    let status = status_handle.await.unwrap().unwrap();
    assert_eq!(status.volume, Some(10));
}

#[tokio::test]
async fn s5b_idle_self_completion_does_not_leave_a_stray_noidle() {
    let (client, mut stub) = connect_pair(b"OK MPD 0.22.3\n").await;

    let idle_client = client.clone();
    let idle_handle = tokio::spawn(async move {
        idle_client
            .idle(Subsystem::empty(), mpd_client::CancelHandle::new())
            .await
    });
    let idle_sent = stub.recv_client_bytes().await;
    assert_eq!(idle_sent, b"idle\n");

    // The server reports a change on its own, with no `noidle` from the
    // client at all (§6) — the idle task self-completes.
    stub.send(b"changed: player\nOK\n").await;
    let idle_outcome = idle_handle.await.unwrap().unwrap();
    assert!(idle_outcome.changed.contains(Subsystem::PLAYER));

    // Give the reader task a beat to clear the pending-noidle flag after
    // delivering that outcome, before the next command is submitted.
    tokio::time::sleep(std::time::Duration::from_millis(20)).await;

    let status_client = client.clone();
    let status_handle = tokio::spawn(async move { status_client.status().await });
    let sent = stub.recv_client_bytes().await;
    assert_eq!(sent, b"status\n");

    stub.send(b"volume: 10\nstate: stop\nOK\n").await;
    let status = status_handle.await.unwrap().unwrap();
    assert_eq!(status.volume, Some(10));
}

#[tokio::test(start_paused = true)]
async fn s6_timeout_fails_head_and_closes() {
    let (client, mut stub) = connect_pair(b"OK MPD 0.22.3\n").await;
    client.set_timeout(Some(std::time::Duration::from_secs(1)));

    let handle = {
        let client = client.clone();
        tokio::spawn(async move { client.status().await })
    };
    let sent = stub.recv_client_bytes().await;
    assert_eq!(sent, b"status\n");

    tokio::time::advance(std::time::Duration::from_secs(2)).await;

    let err = handle.await.unwrap().unwrap_err();
    assert!(matches!(err, MpdError::TimedOut));
    assert_eq!(client.state().await, ConnectionState::Closed);

    let err = client.status().await.unwrap_err();
    assert!(matches!(err, MpdError::Closed));
}
