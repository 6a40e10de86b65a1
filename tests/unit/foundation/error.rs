use super::*;

#[test]
fn display_prefixes_are_stable() {
    assert!(
        MotionError::validation("x")
            .to_string()
            .contains("validation error:")
    );
    assert!(
        MotionError::invalid_arc_payload("x")
            .to_string()
            .contains("invalid arc payload:")
    );
    assert!(
        MotionError::serde("x")
            .to_string()
            .contains("serialization error:")
    );
    assert!(MotionError::io("x").to_string().contains("io error:"));
}

#[test]
fn inconsistent_center_reports_both_radii() {
    let err = MotionError::InconsistentCenter {
        current_radius: 1.5,
        target_radius: 2.25,
    };
    let msg = err.to_string();
    assert!(msg.contains("invalid center point"));
    assert!(msg.contains("1.500000"));
    assert!(msg.contains("2.250000"));
}
