use super::*;
use std::time::Duration;

#[test]
fn artdmx_header_layout() {
    let packet = build_artdmx_packet(7, 0x0123, &[10, 20, 30]);
    assert_eq!(packet.len(), 530);
    assert_eq!(&packet[..8], b"Art-Net\0");
    assert_eq!(&packet[8..10], &[0x00, 0x50]);
    assert_eq!(&packet[10..12], &[0x00, 0x0E]);
    assert_eq!(packet[12], 7);
    assert_eq!(packet[13], 0);
    assert_eq!(packet[14], 0x23);
    assert_eq!(packet[15], 0x01);
    assert_eq!(&packet[16..18], &[0x02, 0x00]);
    assert_eq!(&packet[18..21], &[10, 20, 30]);
    assert!(packet[21..].iter().all(|&b| b == 0));
}

#[test]
fn oversized_frames_are_truncated() {
    let frame = vec![9u8; 600];
    let packet = build_artdmx_packet(1, 0, &frame);
    assert_eq!(packet.len(), 530);
    assert!(packet[18..].iter().all(|&b| b == 9));
}

#[test]
fn net_byte_keeps_fifteen_bits() {
    let packet = build_artdmx_packet(1, 0xFFFF, &[]);
    assert_eq!(packet[14], 0xFF);
    assert_eq!(packet[15], 0x7F);
}

#[test]
fn sends_packets_to_a_local_receiver() {
    let receiver = UdpSocket::bind("127.0.0.1:0").unwrap();
    receiver
        .set_read_timeout(Some(Duration::from_secs(2)))
        .unwrap();
    let port = receiver.local_addr().unwrap().port();

    let mut sender = ArtNetSender::connect("127.0.0.1", port, 3).unwrap();
    sender.send(&[1, 2, 3]);
    sender.set_universe(5);
    sender.send(&[4]);

    let mut buf = [0u8; 600];
    let (n, _) = receiver.recv_from(&mut buf).unwrap();
    assert_eq!(n, 530);
    assert_eq!(buf[12], 1);
    assert_eq!(buf[14], 3);
    assert_eq!(&buf[18..21], &[1, 2, 3]);

    let (_, _) = receiver.recv_from(&mut buf).unwrap();
    assert_eq!(buf[12], 2);
    assert_eq!(buf[14], 5);
    assert_eq!(buf[18], 4);
}
