use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use once_cell::sync::Lazy;
use serde::de::DeserializeOwned;
use serde::Deserialize;

static MANIFEST: Lazy<Manifest> = Lazy::new(|| {
    let raw = include_str!("../../../../fixtures/manifest.json");
    serde_json::from_str(raw).expect("fixtures manifest should parse")
});

#[derive(Debug, Deserialize)]
struct Manifest {
    traces: HashMap<String, String>,
}

fn fixtures_root() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("../../../fixtures")
}

fn resolve_path(rel: &str) -> PathBuf {
    fixtures_root().join(rel)
}

fn read_to_string(rel: &str) -> Result<String> {
    let path = resolve_path(rel);
    fs::read_to_string(&path)
        .with_context(|| format!("failed to read fixture at {}", path.display()))
}

fn load_json<T: DeserializeOwned>(rel: &str) -> Result<T> {
    let text = read_to_string(rel)?;
    serde_json::from_str(&text).with_context(|| format!("failed to parse JSON fixture {rel}"))
}

fn lookup<'a, T>(map: &'a HashMap<String, T>, kind: &str, name: &str) -> Result<&'a T> {
    map.get(name)
        .ok_or_else(|| anyhow!("unknown {kind} fixture '{name}'"))
}

/// A run of equally spaced frames.
#[derive(Debug, Clone, Deserialize)]
pub struct Segment {
    /// Clock delta per frame; negative values model a clock stepping back.
    pub frame_ms: f64,
    pub frames: u32,
}

/// Recorded frame pacing: the clock reading at the end of every frame.
#[derive(Debug, Clone, Deserialize)]
pub struct FrameTrace {
    pub name: String,
    #[serde(default)]
    pub start_ms: f64,
    pub segments: Vec<Segment>,
}

impl FrameTrace {
    /// Clock readings at each frame end, in order.
    pub fn timestamps(&self) -> Vec<f64> {
        let mut now = self.start_ms;
        let mut out = Vec::with_capacity(self.frame_count());
        for seg in &self.segments {
            for _ in 0..seg.frames {
                now += seg.frame_ms;
                out.push(now);
            }
        }
        out
    }

    pub fn frame_count(&self) -> usize {
        self.segments.iter().map(|s| s.frames as usize).sum()
    }
}

pub mod traces {
    use super::*;

    pub fn keys() -> Vec<String> {
        MANIFEST.traces.keys().cloned().collect()
    }

    pub fn path(name: &str) -> Result<PathBuf> {
        let rel = lookup(&MANIFEST.traces, "trace", name)?;
        Ok(resolve_path(rel))
    }

    pub fn load(name: &str) -> Result<FrameTrace> {
        let rel = lookup(&MANIFEST.traces, "trace", name)?;
        load_json(rel)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_manifest_trace_loads() {
        for key in traces::keys() {
            assert!(traces::path(&key).unwrap().is_file(), "{key} missing on disk");
            let trace = traces::load(&key).unwrap();
            assert_eq!(trace.name, key);
            assert_eq!(trace.timestamps().len(), trace.frame_count());
        }
    }

    #[test]
    fn unknown_trace_is_an_error() {
        assert!(traces::load("missing").is_err());
        assert!(traces::path("missing").is_err());
    }

    #[test]
    fn timestamps_accumulate_segments() {
        let trace = FrameTrace {
            name: "t".into(),
            start_ms: 5.0,
            segments: vec![
                Segment {
                    frame_ms: 10.0,
                    frames: 2,
                },
                Segment {
                    frame_ms: -3.0,
                    frames: 1,
                },
            ],
        };
        assert_eq!(trace.timestamps(), vec![15.0, 25.0, 22.0]);
    }
}
