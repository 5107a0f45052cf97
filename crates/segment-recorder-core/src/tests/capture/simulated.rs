use crate::{
    CaptureBackend, DevicePosition, MediaKind, RecorderError, SimulatedBackend, SimulatedDevices,
    StreamTap, tests::support::Harness,
};

/// WHAT: A second input of the same kind is rejected
/// WHY: Real capture sessions accept one camera and one microphone
#[test]
fn given_attached_camera_when_adding_second_camera_then_input_rejected() {
    // Given: A backend with the back camera attached
    let mut backend = SimulatedBackend::new(SimulatedDevices::default());
    let back = backend.camera_input(DevicePosition::Back).unwrap();
    backend.add_input(&back).unwrap();

    // When: Attaching the front camera too
    let front = backend.camera_input(DevicePosition::Front).unwrap();
    let result = backend.add_input(&front);

    // Then: Rejected
    assert!(matches!(result, Err(RecorderError::InputRejected { .. })));
}

/// WHAT: Connections are rebuilt once, on commit
/// WHY: Intermediate states inside a configuration must not be observable
#[tokio::test]
async fn given_configuration_transaction_when_swapping_inputs_then_connections_change_on_commit() {
    // Given: A backend with both inputs and outputs attached
    let harness = Harness::new();
    let tap = StreamTap::new(harness.formats.clone(), harness.coordinator.clone(), 4).unwrap();
    let mut backend = SimulatedBackend::new(SimulatedDevices::default());
    let back = backend.camera_input(DevicePosition::Back).unwrap();
    let mic = backend.microphone_input().unwrap();
    backend.add_input(&back).unwrap();
    backend.add_input(&mic).unwrap();
    backend.add_output(tap.sink(MediaKind::Video)).unwrap();
    backend.add_output(tap.sink(MediaKind::Audio)).unwrap();
    let before = backend.connection(MediaKind::Video).unwrap();

    // When: Replacing the camera inside a transaction
    backend.begin_configuration();
    backend.remove_input(&back);
    let front = backend.camera_input(DevicePosition::Front).unwrap();
    backend.add_input(&front).unwrap();
    let during = backend.connection(MediaKind::Video);
    backend.commit_configuration();

    // Then: The old connection survives until commit, then a new one appears
    assert_eq!(during, Some(before));
    let after = backend.connection(MediaKind::Video).unwrap();
    assert_ne!(after.id(), before.id());
}

/// WHAT: The feed only emits while running and connected
#[tokio::test]
async fn given_feed_when_not_running_then_nothing_emitted() {
    let harness = Harness::new();
    let tap = StreamTap::new(harness.formats.clone(), harness.coordinator.clone(), 4).unwrap();
    let mut backend = SimulatedBackend::new(SimulatedDevices::default());
    let feed = backend.feed();

    // Given/When: Not connected
    backend.start_running();
    assert!(!feed.emit_video());

    // And: Connected but stopped
    let back = backend.camera_input(DevicePosition::Back).unwrap();
    backend.add_input(&back).unwrap();
    backend.add_output(tap.sink(MediaKind::Video)).unwrap();
    assert!(feed.emit_video());
    backend.stop_running();

    // Then: Nothing is emitted anymore
    assert!(!feed.emit_video());
    assert!(!feed.emit_audio());
}
