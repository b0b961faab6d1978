use realmgate_client::config::{AutomationConfig, LoginCoordinates, Point};
use realmgate_runner::{CaptureTool, FieldId, InputAction, RecordingDriver};

fn tool(recorder: &RecordingDriver) -> CaptureTool {
    CaptureTool::new(AutomationConfig::immediate()).with_driver_factory(recorder.factory())
}

#[test]
fn test_capture_save_load_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("login_coords_stormforge_mop.json");
    let mut coords = LoginCoordinates::default();

    let recorder = RecordingDriver::new().with_pointer(Point::new(640, 360));
    let point = tool(&recorder)
        .capture_into(&mut coords, FieldId::Username)
        .unwrap();
    assert_eq!(point, Point::new(640, 360));

    let recorder = RecordingDriver::new().with_pointer(Point::new(655, 410));
    let tool = tool(&recorder);
    tool.capture_into(&mut coords, FieldId::Password).unwrap();

    tool.save(&coords, &path).unwrap();
    let loaded = LoginCoordinates::load(&path).unwrap();
    assert_eq!(loaded, coords);
    assert_eq!(loaded.username, Point::new(640, 360));
    assert_eq!(loaded.password, Point::new(655, 410));
}

#[test]
fn test_capture_does_not_move_the_pointer() {
    let recorder = RecordingDriver::new().with_pointer(Point::new(1, 2));
    tool(&recorder).capture(FieldId::Password).unwrap();
    assert!(recorder.actions().is_empty());
}

#[test]
fn test_test_only_moves_the_pointer() {
    let recorder = RecordingDriver::new();
    let coords = LoginCoordinates {
        username: Point::new(300, 200),
        password: Point::new(300, 260),
    };
    let before = coords;

    tool(&recorder).test(&coords).unwrap();

    assert_eq!(coords, before);
    assert_eq!(
        recorder.actions(),
        vec![
            InputAction::MoveTo(Point::new(300, 200)),
            InputAction::MoveTo(Point::new(300, 260)),
        ]
    );
}

#[test]
fn test_save_into_unwritable_location_fails() {
    let dir = tempfile::tempdir().unwrap();
    let blocker = dir.path().join("file");
    std::fs::write(&blocker, "not a directory").unwrap();

    let recorder = RecordingDriver::new();
    let result = tool(&recorder).save(&LoginCoordinates::default(), &blocker.join("coords.json"));
    assert!(result.is_err());
}
