//! ffmpeg subprocess transcoder.
//!
//! Input and output live in a private temporary directory that is removed on every
//! exit path, so a failed or killed encode leaves nothing behind.

use std::{
    fs::{self, File},
    path::Path,
    process::{Command, Stdio},
    thread,
    time::{Duration, Instant},
};

use log::{debug, warn};

use crate::{config::TranscodeConfig, transcode::Transcoder, transcode::error::TranscodeError};

const POLL_INTERVAL: Duration = Duration::from_millis(20);

pub struct FfmpegTranscoder {
    config: TranscodeConfig,
}

impl FfmpegTranscoder {
    pub fn new(config: TranscodeConfig) -> Self {
        Self { config }
    }

    /// Arguments for one encode.
    ///
    /// -vn                 : drop video streams (embedded art)
    /// -map_metadata -1    : drop source tags, the tag is written afterwards
    /// -id3v2_version 0    : no ID3v2 header from ffmpeg
    /// -write_id3v1 0      : no ID3v1 trailer
    pub fn args(&self, input: &Path, output: &Path) -> Vec<String> {
        vec![
            "-hide_banner".into(),
            "-nostdin".into(),
            "-loglevel".into(),
            "error".into(),
            "-i".into(),
            input.to_string_lossy().into_owned(),
            "-vn".into(),
            "-map_metadata".into(),
            "-1".into(),
            "-codec:a".into(),
            "libmp3lame".into(),
            "-ar".into(),
            self.config.sample_rate.to_string(),
            "-ac".into(),
            self.config.channels.to_string(),
            "-b:a".into(),
            format!("{}k", self.config.bitrate_kbps),
            "-id3v2_version".into(),
            "0".into(),
            "-write_id3v1".into(),
            "0".into(),
            "-f".into(),
            "mp3".into(),
            "-y".into(),
            output.to_string_lossy().into_owned(),
        ]
    }

    fn run(&self, workdir: &Path, input: &Path, output: &Path) -> Result<(), TranscodeError> {
        let log_path = workdir.join("ffmpeg.log");
        let log_file = File::create(&log_path)?;

        let mut child = Command::new(&self.config.ffmpeg_path)
            .args(self.args(input, output))
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::from(log_file))
            .spawn()
            .map_err(|source| TranscodeError::Spawn {
                path: self.config.ffmpeg_path.clone(),
                source,
            })?;

        let timeout = self.config.timeout();
        let started = Instant::now();
        let status = loop {
            match child.try_wait() {
                Ok(Some(status)) => break status,
                Ok(None) => {}
                Err(err) => {
                    let _ = child.kill();
                    let _ = child.wait();
                    return Err(err.into());
                }
            }
            if started.elapsed() >= timeout {
                warn!("ffmpeg exceeded {timeout:?}, killing it");
                let _ = child.kill();
                let _ = child.wait();
                return Err(TranscodeError::TimedOut(timeout));
            }
            thread::sleep(POLL_INTERVAL);
        };

        if status.success() {
            debug!("ffmpeg finished in {:?}", started.elapsed());
            return Ok(());
        }

        let log = fs::read_to_string(&log_path).unwrap_or_default();
        Err(TranscodeError::Failed {
            status: status.to_string(),
            message: log
                .lines()
                .rev()
                .find(|line| !line.trim().is_empty())
                .unwrap_or("Unknown error")
                .to_string(),
        })
    }
}

impl Transcoder for FfmpegTranscoder {
    fn transcode(&self, input: &[u8]) -> Result<Vec<u8>, TranscodeError> {
        if input.is_empty() {
            return Err(TranscodeError::EmptyInput);
        }

        let workdir = tempfile::tempdir()?;
        let input_path = workdir.path().join("input");
        let output_path = workdir.path().join("output.mp3");
        fs::write(&input_path, input)?;

        debug!(
            "transcoding {} bytes at {}kbps, {}Hz, {} channels",
            input.len(),
            self.config.bitrate_kbps,
            self.config.sample_rate,
            self.config.channels
        );
        self.run(workdir.path(), &input_path, &output_path)?;

        let encoded = fs::read(&output_path)?;
        if encoded.is_empty() {
            return Err(TranscodeError::EmptyOutput);
        }
        Ok(encoded)
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;
    use crate::testing::{ffmpeg_available, silent_wav};

    fn transcoder() -> FfmpegTranscoder {
        FfmpegTranscoder::new(TranscodeConfig::default())
    }

    #[test]
    fn args_follow_config() {
        let transcoder = FfmpegTranscoder::new(TranscodeConfig {
            bitrate_kbps: 320,
            sample_rate: 48_000,
            channels: 1,
            ..TranscodeConfig::default()
        });

        let args = transcoder.args(Path::new("/tmp/in"), Path::new("/tmp/out.mp3"));
        let joined = args.join(" ");

        assert!(joined.contains("-i /tmp/in"));
        assert!(joined.contains("-ar 48000"));
        assert!(joined.contains("-ac 1"));
        assert!(joined.contains("-b:a 320k"));
        assert!(joined.contains("-id3v2_version 0"));
        assert_eq!(args.last().map(String::as_str), Some("/tmp/out.mp3"));
    }

    #[test]
    fn default_target_is_stereo_44k_192k() {
        let args = transcoder().args(Path::new("in"), Path::new("out.mp3")).join(" ");
        assert!(args.contains("-ar 44100 -ac 2 -b:a 192k"));
    }

    #[test]
    fn empty_input_is_rejected_before_spawning() {
        let transcoder = FfmpegTranscoder::new(TranscodeConfig {
            ffmpeg_path: PathBuf::from("/nonexistent/ffmpeg"),
            ..TranscodeConfig::default()
        });
        assert!(matches!(
            transcoder.transcode(&[]),
            Err(TranscodeError::EmptyInput)
        ));
    }

    #[test]
    fn missing_engine_is_a_spawn_error() {
        let transcoder = FfmpegTranscoder::new(TranscodeConfig {
            ffmpeg_path: PathBuf::from("/nonexistent/ffmpeg"),
            ..TranscodeConfig::default()
        });
        assert!(matches!(
            transcoder.transcode(b"not audio"),
            Err(TranscodeError::Spawn { .. })
        ));
    }

    #[test]
    fn stuck_engine_is_killed_on_timeout() {
        // `yes` never exits on its own, so only the kill path can end the run.
        let transcoder = FfmpegTranscoder::new(TranscodeConfig {
            ffmpeg_path: PathBuf::from("yes"),
            timeout_secs: 0,
            ..TranscodeConfig::default()
        });

        match transcoder.transcode(b"not audio") {
            Err(TranscodeError::TimedOut(timeout)) => assert_eq!(timeout, Duration::ZERO),
            Err(TranscodeError::Spawn { .. }) => eprintln!("yes not found, skipping"),
            other => panic!("expected a timeout, got {other:?}"),
        }
    }

    #[test]
    fn encodes_silent_wav() -> anyhow::Result<()> {
        if !ffmpeg_available() {
            eprintln!("ffmpeg not found, skipping");
            return Ok(());
        }

        let encoded = transcoder().transcode(&silent_wav(3))?;

        assert!(!encoded.starts_with(b"ID3"), "ffmpeg must not write its own tag");
        // first MPEG frame sync
        assert_eq!(encoded[0], 0xFF);
        assert_eq!(encoded[1] & 0xE0, 0xE0);
        Ok(())
    }

    #[test]
    fn corrupt_input_fails() {
        if !ffmpeg_available() {
            eprintln!("ffmpeg not found, skipping");
            return;
        }

        let err = transcoder().transcode(b"definitely not audio").unwrap_err();
        assert!(matches!(err, TranscodeError::Failed { .. }), "{err}");
    }
}
