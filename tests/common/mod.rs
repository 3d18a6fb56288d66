//! Shared fixtures: a scripted tool runner and frame folder builders.

#![allow(dead_code)]

use std::{
    collections::HashMap,
    ffi::OsString,
    fs,
    path::{Path, PathBuf},
    sync::Mutex,
};

use framesift::{FramesiftError, MetadataRecord, Sidecar, ToolOutput, ToolRunner};

/// Probe output for a video with the given `nb_frames`.
pub fn probe_json(nb_frames: &str) -> String {
    format!(
        r#"{{"programs": [], "streams": [{{"codec_name": "prores", "r_frame_rate": "24/1", "nb_frames": "{nb_frames}"}}], "format": {{"duration": "12.500000"}}}}"#
    )
}

/// Probe output with no frame count at all.
pub fn probe_json_without_count() -> String {
    r#"{"streams": [{"codec_name": "prores", "r_frame_rate": "24/1"}], "format": {"duration": "12.5"}}"#
        .to_string()
}

/// Stands in for ffmpeg and ffprobe.
///
/// ffprobe answers with the output registered for the probed file name and
/// fails for unknown files. ffmpeg writes `frames_to_write` empty frame
/// files when asked for a frame dump, or an output file when asked for a
/// stream copy, unless `fail_ffmpeg` is set.
#[derive(Default)]
pub struct ScriptedRunner {
    probes: HashMap<String, String>,
    pub frames_to_write: usize,
    pub fail_ffmpeg: bool,
    pub calls: Mutex<Vec<(PathBuf, Vec<String>)>>,
}

impl ScriptedRunner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_probe(mut self, file_name: &str, stdout: String) -> Self {
        self.probes.insert(file_name.to_string(), stdout);
        self
    }

    pub fn with_frames(mut self, count: usize) -> Self {
        self.frames_to_write = count;
        self
    }

    pub fn failing_ffmpeg(mut self) -> Self {
        self.fail_ffmpeg = true;
        self
    }

    pub fn calls_to(&self, program: &str) -> Vec<Vec<String>> {
        self.calls
            .lock()
            .expect("Runner lock poisoned")
            .iter()
            .filter(|(called, _)| called == Path::new(program))
            .map(|(_, args)| args.clone())
            .collect()
    }

    fn failure(stderr: &str) -> ToolOutput {
        ToolOutput {
            status: Some(1),
            success: false,
            stdout: String::new(),
            stderr: stderr.to_string(),
        }
    }

    fn success() -> ToolOutput {
        ToolOutput {
            status: Some(0),
            success: true,
            ..ToolOutput::default()
        }
    }

    fn fake_ffprobe(&self, args: &[String]) -> ToolOutput {
        let file_name = args
            .last()
            .and_then(|path| Path::new(path).file_name())
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        match self.probes.get(&file_name) {
            Some(stdout) => ToolOutput {
                stdout: stdout.clone(),
                ..Self::success()
            },
            None => Self::failure(&format!("{file_name}: Invalid data found when processing input")),
        }
    }

    fn fake_ffmpeg(&self, args: &[String]) -> ToolOutput {
        if self.fail_ffmpeg {
            return Self::failure("Error opening input: Invalid data found when processing input");
        }
        let Some(target) = args.last().map(PathBuf::from) else {
            return Self::failure("no output given");
        };

        if args.iter().any(|arg| arg == "-pix_fmt") {
            let directory = target.parent().unwrap_or(Path::new("")).to_path_buf();
            let extension = target
                .extension()
                .map(|extension| extension.to_string_lossy().into_owned())
                .unwrap_or_default();
            for index in 1..=self.frames_to_write {
                fs::write(directory.join(format!("{index:08}.{extension}")), b"frame")
                    .expect("Failed to write fake frame");
            }
        } else {
            fs::write(&target, b"trimmed").expect("Failed to write fake output");
        }
        Self::success()
    }
}

impl ToolRunner for ScriptedRunner {
    fn run(&self, program: &Path, args: &[OsString]) -> Result<ToolOutput, FramesiftError> {
        let args: Vec<String> = args
            .iter()
            .map(|arg| arg.to_string_lossy().into_owned())
            .collect();
        self.calls
            .lock()
            .expect("Runner lock poisoned")
            .push((program.to_path_buf(), args.clone()));

        let name = program
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        match name.as_str() {
            "ffprobe" => Ok(self.fake_ffprobe(&args)),
            "ffmpeg" => Ok(self.fake_ffmpeg(&args)),
            _ => Err(FramesiftError::ToolLaunch {
                tool: program.display().to_string(),
                reason: "No such file or directory (os error 2)".to_string(),
            }),
        }
    }
}

/// Create `<root>/<name>` holding a sidecar with `nominal` frames and
/// `available` empty frame files.
pub fn frame_folder(root: &Path, name: &str, nominal: &str, available: usize) -> PathBuf {
    let folder = root.join(name);
    fs::create_dir_all(&folder).expect("Failed to create frame folder");
    Sidecar::new(
        format!("/media/card/{name}.mov"),
        MetadataRecord::from_pairs([("nb_frames", nominal), ("r_frame_rate", "24/1")]),
    )
    .write(&folder.join("source.txt"))
    .expect("Failed to write sidecar");
    for index in 1..=available {
        fs::write(folder.join(format!("{index:08}.tiff")), b"frame")
            .expect("Failed to write frame");
    }
    folder
}

/// Sorted file names directly inside `folder`.
pub fn file_names(folder: &Path) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(folder)
        .expect("Failed to list folder")
        .map(|entry| {
            entry
                .expect("Failed to read entry")
                .file_name()
                .to_string_lossy()
                .into_owned()
        })
        .collect();
    names.sort();
    names
}

/// Frame names (`00000001.tiff` style) for 0-based `indices`.
pub fn frame_names(indices: impl IntoIterator<Item = usize>) -> Vec<String> {
    indices
        .into_iter()
        .map(|index| format!("{:08}.tiff", index + 1))
        .collect()
}
