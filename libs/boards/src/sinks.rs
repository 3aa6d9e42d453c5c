//! Display sink: the final `flush(buffer)` step, behind one trait shared by
//! a hardware stub, a PNG-writing simulator, and a mock used in tests.

use std::path::{Path, PathBuf};

use image::RgbImage;
use tracing::{info, warn};

use crate::error::{BoardsError, Result};

pub trait DisplaySink: Send {
    fn flush(&mut self, buffer: &RgbImage) -> Result<()>;
    fn close(&mut self) {}
}

/// Real GPIO push is out of this crate's reach without hardware attached;
/// this is an interface plus a documented no-op, per the orchestrator's
/// "final pixel-to-GPIO push...treated as a flush(framebuffer) sink" framing.
pub struct HardwareSink;

impl DisplaySink for HardwareSink {
    fn flush(&mut self, _buffer: &RgbImage) -> Result<()> {
        warn!("hardware sink is a stub; no GPIO driver is linked in this build");
        Ok(())
    }

    fn close(&mut self) {
        info!("hardware sink close: would clear the panel");
    }
}

/// Writes `frame.png` every tick, plus a numbered snapshot every 100th
/// tick, into an output directory.
pub struct SimulatorSink {
    output_dir: PathBuf,
    tick: u64,
}

impl SimulatorSink {
    pub fn new(output_dir: impl Into<PathBuf>) -> std::io::Result<Self> {
        let output_dir = output_dir.into();
        std::fs::create_dir_all(&output_dir)?;
        Ok(Self { output_dir, tick: 0 })
    }

    fn frame_path(&self) -> PathBuf {
        self.output_dir.join("frame.png")
    }

    fn snapshot_path(&self, seq: u64) -> PathBuf {
        self.output_dir.join(format!("frame_{seq:06}.png"))
    }
}

impl DisplaySink for SimulatorSink {
    fn flush(&mut self, buffer: &RgbImage) -> Result<()> {
        buffer.save(self.frame_path()).map_err(|e| BoardsError::SinkFlush(e.to_string()))?;
        self.tick += 1;
        if self.tick % 100 == 0 {
            buffer.save(self.snapshot_path(self.tick)).map_err(|e| BoardsError::SinkFlush(e.to_string()))?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct MockFailureMode {
    pub fail_on_flush: bool,
    pub fail_on_render: bool,
}

/// Records every flush call for assertions, and can be configured to fail
/// deterministically for orchestrator error-path tests.
pub struct MockSink {
    pub flush_count: u32,
    pub failure: MockFailureMode,
    pub last_buffer_dims: Option<(u32, u32)>,
}

impl MockSink {
    pub fn new(failure: MockFailureMode) -> Self {
        Self { flush_count: 0, failure, last_buffer_dims: None }
    }
}

impl DisplaySink for MockSink {
    fn flush(&mut self, buffer: &RgbImage) -> Result<()> {
        if self.failure.fail_on_flush {
            return Err(BoardsError::SinkFlush("mock sink configured to fail".into()));
        }
        self.flush_count += 1;
        self.last_buffer_dims = Some((buffer.width(), buffer.height()));
        Ok(())
    }
}

pub fn is_hardware_dir_available(path: &Path) -> bool {
    path.exists()
}
