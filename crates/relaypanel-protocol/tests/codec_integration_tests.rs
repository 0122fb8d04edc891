//! Integration tests for RelayLineCodec with Tokio streams.

use futures::{SinkExt, StreamExt};
use relaypanel_protocol::{Command, ProtocolError, RelayId, RelayLineCodec, RelayMask, StatusLine};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio_util::codec::{Framed, FramedRead};

#[tokio::test]
async fn test_framed_read_from_device_output() {
    let wire: &[u8] = b"boot v1.2\nHB:01\nRELAYS:0x05\nHB:02\nRELAYS:00\n";
    let mut reader = FramedRead::new(wire, RelayLineCodec::new());

    let mut lines = Vec::new();
    while let Some(line) = reader.next().await {
        lines.push(line.unwrap());
    }

    assert_eq!(lines.len(), 5);
    assert_eq!(lines[0], StatusLine::Unrecognized("boot v1.2".to_string()));
    assert!(lines[1].is_heartbeat());
    assert_eq!(lines[2], StatusLine::Relays(RelayMask::new(0x05)));
    assert_eq!(lines[4], StatusLine::Relays(RelayMask::new(0x00)));
}

#[tokio::test]
async fn test_malformed_line_surfaces_as_error() {
    let wire: &[u8] = b"RELAYS:zz\n";
    let mut reader = FramedRead::new(wire, RelayLineCodec::new());

    let first = reader.next().await.unwrap();
    assert!(matches!(first, Err(ProtocolError::InvalidRelayMask { .. })));
}

#[tokio::test]
async fn test_commands_written_without_terminator() {
    let (host, mut device) = tokio::io::duplex(64);
    let mut framed = Framed::new(host, RelayLineCodec::new());

    framed
        .send(Command::Toggle(RelayId::parse("3").unwrap()))
        .await
        .unwrap();
    framed.send(Command::Buzz).await.unwrap();

    let mut received = [0u8; 2];
    device.read_exact(&mut received).await.unwrap();
    assert_eq!(&received, b"31");
}

#[tokio::test]
async fn test_status_lines_split_across_writes() {
    let (host, mut device) = tokio::io::duplex(64);
    let mut framed = Framed::new(host, RelayLineCodec::new());

    device.write_all(b"REL").await.unwrap();
    device.write_all(b"AYS:8").await.unwrap();
    device.write_all(b"1\n").await.unwrap();

    let line = framed.next().await.unwrap().unwrap();
    assert_eq!(line, StatusLine::Relays(RelayMask::new(0x81)));
}
