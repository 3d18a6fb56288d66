//! Progress reporting integration tests.

mod common;

use std::{
    fs,
    sync::{Arc, Mutex},
};

use framesift::{
    Cataloger, FrameSelector, OperationType, PipelineConfig, ProgressCallback, ProgressInfo,
};

use common::{ScriptedRunner, frame_folder, probe_json};

#[derive(Default)]
struct RecordingProgress {
    infos: Mutex<Vec<ProgressInfo>>,
}

impl ProgressCallback for RecordingProgress {
    fn on_progress(&self, info: &ProgressInfo) {
        self.infos.lock().unwrap().push(info.clone());
    }
}

#[test]
fn organizing_reports_each_folder() {
    let temporary_directory = tempfile::tempdir().expect("Failed to create temp dir");
    for index in 0..3 {
        frame_folder(temporary_directory.path(), &format!("30_A00{index}"), "30", 30);
    }
    let recorder = Arc::new(RecordingProgress::default());
    let config = PipelineConfig::new().with_progress(recorder.clone());

    FrameSelector::new(&config)
        .organize_all(temporary_directory.path())
        .expect("Failed to organize");

    let infos = recorder.infos.lock().unwrap();
    assert_eq!(infos.len(), 3);
    for info in infos.iter() {
        assert_eq!(info.operation, OperationType::Organizing);
        assert_eq!(info.total, Some(3));
    }
    for window in infos.windows(2) {
        assert!(
            window[1].current > window[0].current,
            "Progress current should increase",
        );
    }
    assert_eq!(infos[2].percentage, Some(100.0));
    assert!(infos[0].current_item.as_deref().is_some_and(|item| item.ends_with("30_A000")));
}

#[test]
fn batch_size_limits_callbacks_but_still_finishes() {
    let temporary_directory = tempfile::tempdir().expect("Failed to create temp dir");
    let mut runner = ScriptedRunner::new();
    for index in 0..5 {
        let name = format!("A00{index}.mov");
        fs::write(temporary_directory.path().join(&name), b"video").expect("Failed to write video");
        runner = runner.with_probe(&name, probe_json("30"));
    }
    let recorder = Arc::new(RecordingProgress::default());
    let config = PipelineConfig::new()
        .with_progress(recorder.clone())
        .with_batch_size(2);

    Cataloger::new(&config, &runner)
        .catalog(
            temporary_directory.path(),
            &temporary_directory.path().join("list.txt"),
        )
        .expect("Failed to catalog");

    let infos = recorder.infos.lock().unwrap();
    let currents: Vec<u64> = infos.iter().map(|info| info.current).collect();
    assert_eq!(currents, vec![2, 4, 5]);
    assert!(infos.iter().all(|info| info.operation == OperationType::Cataloging));
    assert!(infos[2].current_item.is_none(), "The closing report names no item");
}
