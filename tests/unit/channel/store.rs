use super::*;

#[test]
fn unset_slots_read_zero() {
    let store = ChannelStore::new(4);
    assert_eq!(store.len(), 4);
    assert_eq!(store.get(Channel::at(1)), 0);
    assert_eq!(store.get(Channel::at(600)), 0);
}

#[test]
fn one_based_addressing() {
    let mut store = ChannelStore::new(4);
    store.set(Channel::at(1), 10);
    store.set(Channel::at(4), 40);
    assert_eq!(store.as_slice(), &[10, 0, 0, 40]);
}

#[test]
fn writes_past_the_end_grow_the_frame() {
    let mut store = ChannelStore::new(2);
    store.set(Channel::at(6), 9);
    assert_eq!(store.as_slice(), &[0, 0, 0, 0, 0, 9]);
    store.ensure_frame_size(3);
    assert_eq!(store.len(), 6);
    store.ensure_frame_size(8);
    assert_eq!(store.len(), 8);
}

#[test]
fn set_rounded_clamps() {
    let mut store = ChannelStore::new(3);
    store.set_rounded(Channel::at(1), -5.0);
    store.set_rounded(Channel::at(2), 300.0);
    store.set_rounded(Channel::at(3), 127.6);
    assert_eq!(store.as_slice(), &[0, 255, 128]);
}

#[test]
fn snapshot_is_a_plain_json_array() {
    let mut store = ChannelStore::new(3);
    store.set(Channel::at(2), 7);
    let json = serde_json::to_string(&store).unwrap();
    assert_eq!(json, "[0,7,0]");
    let back = ChannelStore::from_reader(json.as_bytes()).unwrap();
    assert_eq!(back, store);
}

#[test]
fn snapshot_file_round_trip() {
    let dir = std::path::PathBuf::from("target").join("store_snapshot");
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join("state.json");

    let mut store = ChannelStore::new(5);
    store.set(Channel::at(5), 200);
    store.write_to_path(&path).unwrap();
    assert_eq!(ChannelStore::from_path(&path).unwrap(), store);
}

#[test]
fn bad_snapshot_is_a_serde_error() {
    let err = ChannelStore::from_reader("[1, 2, 999]".as_bytes()).unwrap_err();
    assert!(matches!(err, MotionError::Serde(_)));
}
