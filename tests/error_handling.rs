//! Error handling integration tests.
//!
//! These tests verify that meaningful errors are returned for various
//! failure conditions.

mod common;

use std::{ffi::OsString, path::Path};

use framesift::{
    Cataloger, FrameExtractor, FramesiftError, MediaProbe, PipelineConfig, Sidecar, ToolConfig,
    ToolRunner, read_manifest, tool_available,
};

use common::ScriptedRunner;

#[test]
fn catalog_nonexistent_folder() {
    let temporary_directory = tempfile::tempdir().expect("Failed to create temp dir");
    let config = PipelineConfig::new();
    let runner = ScriptedRunner::new();

    let result = Cataloger::new(&config, &runner).catalog(
        &temporary_directory.path().join("no_such_card"),
        &temporary_directory.path().join("list.txt"),
    );
    assert!(result.is_err());

    let error_message = result.unwrap_err().to_string();
    assert!(
        error_message.contains("Failed to open"),
        "Error message should mention open failure: {error_message}",
    );
}

#[test]
fn catalog_unwritable_manifest() {
    let temporary_directory = tempfile::tempdir().expect("Failed to create temp dir");
    std::fs::write(temporary_directory.path().join("A001.mov"), b"video")
        .expect("Failed to write video");
    let config = PipelineConfig::new();
    let runner = ScriptedRunner::new().with_probe("A001.mov", common::probe_json("30"));

    let result = Cataloger::new(&config, &runner).catalog(
        temporary_directory.path(),
        &temporary_directory.path().join("no_such_dir").join("list.txt"),
    );
    assert!(matches!(result, Err(FramesiftError::FileOpen { .. })));
}

#[test]
fn extract_nonexistent_manifest() {
    let temporary_directory = tempfile::tempdir().expect("Failed to create temp dir");
    let config = PipelineConfig::new();
    let runner = ScriptedRunner::new();

    let result = FrameExtractor::new(&config, &runner)
        .extract_manifest(&temporary_directory.path().join("missing.txt"));
    assert!(matches!(result, Err(FramesiftError::FileOpen { .. })));
}

#[test]
fn missing_manifest_file() {
    let result = read_manifest(Path::new("this_manifest_does_not_exist.txt"));
    assert!(result.is_err());
}

#[test]
fn probe_failure_carries_stderr() {
    let runner = ScriptedRunner::new();
    let tools = ToolConfig::default();

    let result = MediaProbe::new(&runner, &tools).probe("unknown.mov");
    match result {
        Err(FramesiftError::ToolFailed { tool, status, stderr }) => {
            assert_eq!(tool, "ffprobe");
            assert_eq!(status, Some(1));
            assert!(stderr.contains("Invalid data found"), "{stderr}");
        }
        other => panic!("Expected ToolFailed, got: {other:?}"),
    }
}

#[test]
fn unlaunchable_tool() {
    let runner = ScriptedRunner::new();
    let tools = ToolConfig {
        ffprobe: "/nonexistent/ffprobe-missing".into(),
        ..ToolConfig::default()
    };

    let result = MediaProbe::new(&runner, &tools).probe("a.mov");
    assert!(matches!(result, Err(FramesiftError::ToolLaunch { .. })));
    assert!(!tool_available(&runner, Path::new("/nonexistent/ffprobe-missing")));
}

#[test]
fn probe_output_without_video_stream() {
    let runner = ScriptedRunner::new().with_probe(
        "audio_only.mov",
        r#"{"streams": [], "format": {"duration": "3.0"}}"#.to_string(),
    );
    let tools = ToolConfig::default();

    let result = MediaProbe::new(&runner, &tools).probe("audio_only.mov");
    let error_message = result.unwrap_err().to_string();
    assert!(
        error_message.contains("Failed to parse probe output"),
        "Error should mention probe parsing: {error_message}",
    );
}

#[test]
fn missing_sidecar() {
    let temporary_directory = tempfile::tempdir().expect("Failed to create temp dir");
    let result = Sidecar::read(&temporary_directory.path().join("source.txt"));
    assert!(matches!(result, Err(FramesiftError::SidecarMissing(_))));
}

#[test]
fn sidecar_with_non_object_metadata() {
    let result = Sidecar::parse(Path::new("source.txt"), "[Metadata]\n[1, 2, 3]");
    let error_message = result.unwrap_err().to_string();
    assert!(
        error_message.contains("expected a JSON object"),
        "Error should describe the metadata shape: {error_message}",
    );
}

#[test]
fn tool_failed_without_exit_code() {
    let error = FramesiftError::ToolFailed {
        tool: "ffmpeg".to_string(),
        status: None,
        stderr: "Killed".to_string(),
    };
    assert_eq!(
        error.to_string(),
        "ffmpeg exited with no exit code (terminated by signal):\nKilled"
    );
}

#[test]
fn io_errors_convert() {
    fn open() -> Result<(), FramesiftError> {
        std::fs::read("/definitely/not/here")?;
        Ok(())
    }
    assert!(matches!(open(), Err(FramesiftError::IoError(_))));
}

struct AlwaysFails;

impl ToolRunner for AlwaysFails {
    fn run(
        &self,
        program: &Path,
        _args: &[OsString],
    ) -> Result<framesift::ToolOutput, FramesiftError> {
        Err(FramesiftError::ToolLaunch {
            tool: program.display().to_string(),
            reason: "permission denied".to_string(),
        })
    }
}

#[test]
fn custom_runner_errors_propagate() {
    let tools = ToolConfig::default();
    let error = MediaProbe::new(&AlwaysFails, &tools)
        .probe("a.mov")
        .unwrap_err();
    assert_eq!(error.to_string(), "Failed to launch ffprobe: permission denied");
}
