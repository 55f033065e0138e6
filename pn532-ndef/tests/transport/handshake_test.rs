use pn532_ndef::bus::MockBus;
use pn532_ndef::transport::Transport;
use pn532_ndef::Error;

#[test]
fn ack_consumed_after_send() {
    let mut bus = MockBus::new();
    bus.queue_ack();

    let mut transport = Transport::new(Box::new(bus));
    transport.send(&[0x02], &[]).unwrap();
}

#[test]
fn missing_ack_is_timeout() {
    let mut transport = Transport::new(Box::new(MockBus::new()));
    match transport.send(&[0x02], &[]) {
        Err(Error::AckTimeout(_)) => {}
        other => panic!("expected AckTimeout, got {:?}", other),
    }
}

#[test]
fn mismatched_ack_pattern_is_timeout() {
    let mut bus = MockBus::new();
    // wrong pattern, right length
    bus.queue_bytes(&[0x00, 0x00, 0xFF, 0xFF, 0x00, 0x00]);

    let mut transport = Transport::new(Box::new(bus));
    match transport.send(&[0x02], &[]) {
        Err(Error::AckTimeout(_)) => {}
        other => panic!("expected AckTimeout, got {:?}", other),
    }
}

#[test]
fn write_failure_surfaces_as_bus_error() {
    let mut bus = MockBus::new();
    bus.set_write_failures(1);
    bus.queue_ack();

    let mut transport = Transport::new(Box::new(bus));
    match transport.send(&[0x02], &[]) {
        Err(Error::BusIo(_)) => {}
        other => panic!("expected BusIo, got {:?}", other),
    }
}

#[test]
fn empty_header_is_rejected_before_touching_the_bus() {
    let mut transport = Transport::new(Box::new(MockBus::new()));
    match transport.send(&[], &[]) {
        Err(Error::InvalidLength { expected: 1, .. }) => {}
        other => panic!("expected InvalidLength, got {:?}", other),
    }
}
