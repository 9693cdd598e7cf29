//! Test fixtures: stub collaborators, local HTTP doubles and audio.

use std::{
    net::SocketAddr,
    process::Command,
    sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
        mpsc::Sender,
    },
    thread::JoinHandle,
};

use anyhow::anyhow;
use rouille::{Request, Response};

use crate::{
    cover::{CoverFetcher, FetchError},
    domain::{
        audio::CoverImage,
        track::{TrackMetadata, TrackQuery},
    },
    pipeline::Pipeline,
    resolver::{MetadataResolver, ResolveError},
    tagging::TagWriter,
    transcode::{TranscodeError, Transcoder},
};

/// A minimal MPEG-1 Layer III frame header followed by padding.
pub const ENCODED: &[u8] = &[0xFF, 0xFB, 0x90, 0x64, 0x00, 0x00, 0x00, 0x00];
pub const JPEG: &[u8] = &[0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10, b'J', b'F', b'I', b'F'];

pub struct StubServer {
    addr: SocketAddr,
    stop: Option<Sender<()>>,
    handle: Option<JoinHandle<()>>,
}

impl StubServer {
    pub fn start<F>(handler: F) -> anyhow::Result<Self>
    where
        F: Fn(&Request) -> Response + Send + Sync + 'static,
    {
        let server = rouille::Server::new("127.0.0.1:0", handler)
            .map_err(|e| anyhow!("failed to start stub server: {e}"))?;
        let addr = server.server_addr();
        let (handle, stop) = server.stoppable();

        Ok(Self {
            addr,
            stop: Some(stop),
            handle: Some(handle),
        })
    }

    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url(), path)
    }
}

impl Drop for StubServer {
    fn drop(&mut self) {
        if let Some(stop) = self.stop.take() {
            let _ = stop.send(());
        }
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

/// 16-bit mono PCM WAV of `seconds` of silence at 44.1kHz.
pub fn silent_wav(seconds: u32) -> Vec<u8> {
    const SAMPLE_RATE: u32 = 44_100;
    let data_len = SAMPLE_RATE * seconds * 2;

    let mut wav = Vec::with_capacity(44 + data_len as usize);
    wav.extend_from_slice(b"RIFF");
    wav.extend_from_slice(&(36 + data_len).to_le_bytes());
    wav.extend_from_slice(b"WAVEfmt ");
    wav.extend_from_slice(&16u32.to_le_bytes());
    wav.extend_from_slice(&1u16.to_le_bytes()); // PCM
    wav.extend_from_slice(&1u16.to_le_bytes()); // mono
    wav.extend_from_slice(&SAMPLE_RATE.to_le_bytes());
    wav.extend_from_slice(&(SAMPLE_RATE * 2).to_le_bytes());
    wav.extend_from_slice(&2u16.to_le_bytes());
    wav.extend_from_slice(&16u16.to_le_bytes());
    wav.extend_from_slice(b"data");
    wav.extend_from_slice(&data_len.to_le_bytes());
    wav.resize(44 + data_len as usize, 0);
    wav
}

/// True when an ffmpeg with the LAME encoder is on PATH.
pub fn ffmpeg_available() -> bool {
    Command::new("ffmpeg")
        .args(["-hide_banner", "-encoders"])
        .output()
        .map(|out| out.status.success() && String::from_utf8_lossy(&out.stdout).contains("libmp3lame"))
        .unwrap_or(false)
}

#[derive(Clone, Default)]
pub struct Calls(Arc<AtomicUsize>);

impl Calls {
    pub fn hit(&self) {
        self.0.fetch_add(1, Ordering::SeqCst);
    }

    pub fn count(&self) -> usize {
        self.0.load(Ordering::SeqCst)
    }
}

pub struct StubResolver {
    pub result: Result<Option<TrackMetadata>, String>,
    pub calls: Calls,
}

impl MetadataResolver for StubResolver {
    fn resolve(&self, _query: &TrackQuery) -> Result<Option<TrackMetadata>, ResolveError> {
        self.calls.hit();
        self.result.clone().map_err(ResolveError::Api)
    }
}

pub struct StubFetcher {
    pub cover: Option<Vec<u8>>,
    pub calls: Calls,
}

impl CoverFetcher for StubFetcher {
    fn fetch(&self, url: &str) -> Result<CoverImage, FetchError> {
        self.calls.hit();
        match &self.cover {
            Some(data) => Ok(CoverImage::jpeg(data.clone())),
            None => Err(FetchError::Status {
                url: url.to_string(),
                status: 404,
            }),
        }
    }
}

pub struct StubTranscoder {
    pub ok: bool,
    pub calls: Calls,
}

impl Transcoder for StubTranscoder {
    fn transcode(&self, input: &[u8]) -> Result<Vec<u8>, TranscodeError> {
        self.calls.hit();
        if self.ok && !input.is_empty() {
            Ok(ENCODED.to_vec())
        } else {
            Err(TranscodeError::Failed {
                status: "exit status: 1".into(),
                message: "Invalid data found when processing input".into(),
            })
        }
    }
}

pub fn song_metadata() -> TrackMetadata {
    TrackMetadata {
        title: "Song".into(),
        artist: "Test".into(),
        album: "Album".into(),
        cover_url: "http://x/y.jpg".into(),
        genres: "Pop".into(),
        release_date: "2020-01-01".into(),
        track_number: Some(1),
    }
}

/// Pipeline over stubs, for tests that do not care about call counts.
pub fn stub_pipeline(
    metadata: Option<TrackMetadata>,
    cover: Option<&[u8]>,
    transcode_ok: bool,
) -> Pipeline {
    Pipeline::new(
        Box::new(StubResolver {
            result: Ok(metadata),
            calls: Calls::default(),
        }),
        Box::new(StubFetcher {
            cover: cover.map(<[u8]>::to_vec),
            calls: Calls::default(),
        }),
        Box::new(StubTranscoder {
            ok: transcode_ok,
            calls: Calls::default(),
        }),
        TagWriter::default(),
    )
}
