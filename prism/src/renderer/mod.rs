//! The software rasterizer and its frame driver.
//!
//! Rendering either happens inline on the caller's thread, or on a
//! worker that produces scanlines for the consumer to pull one at a
//! time while the frame is still being drawn.

mod pixel;
mod post;
mod raster;
mod texture;


use std::sync::Arc;
use std::thread::JoinHandle;

use crossbeam_channel::{bounded, unbounded, Receiver, Sender};
use log::debug;

use crate::polygon::Polygon;
use crate::state::{RenderState, TextureVram};

use raster::RenderCore;

pub use raster::{NUM_SCANLINES, SCANLINE_WIDTH};

/// Everything needed to draw one frame: the preprocessed polygon list,
/// the latched register file, the VRAM flat views, and the dirty state
/// derived by the VRAM tracker.
pub struct FrameInput {
    pub polygons: Arc<Vec<Polygon>>,
    pub state: RenderState,
    pub vram: Arc<TextureVram>,
    pub texture_dirty: bool,
    pub tex_pal_dirty: bool,
}

impl FrameInput {
    /// A frame can skip rendering entirely when neither VRAM bank
    /// changed and the geometry stage flagged its output as unchanged.
    fn identical(&self) -> bool {
        !(self.texture_dirty || self.tex_pal_dirty) && self.state.frame_identical
    }
}

#[derive(Clone, Copy, Default)]
pub struct RenderSettings {
    pub threaded: bool,
}

/// The software renderer.
///
/// In threaded mode a worker owns the pixel buffers for the duration of
/// a frame; the consumer pulls completed rows through [`Self::get_line`]
/// and synchronizes at [`Self::vcount_144`]. In synchronous mode the
/// whole frame is drawn inside [`Self::render_frame`].
pub struct SoftRenderer {
    threaded: bool,

    // exactly one of these is populated: the worker owns the core
    // while it runs and hands it back on shutdown
    core: Option<Box<RenderCore>>,
    worker: Option<RenderWorker>,

    line_buffer: Vec<u32>,
}

struct RenderWorker {
    frame_tx: Sender<FrameInput>,
    line_rx: Receiver<Box<[u32]>>,
    done_rx: Receiver<()>,
    handle: JoinHandle<Box<RenderCore>>,
}

impl SoftRenderer {
    pub fn new(settings: RenderSettings) -> Self {
        let mut renderer = Self {
            threaded: false,
            core: Some(Box::new(RenderCore::new())),
            worker: None,
            line_buffer: vec![0; SCANLINE_WIDTH],
        };
        renderer.set_render_settings(settings);
        renderer
    }

    pub fn set_render_settings(&mut self, settings: RenderSettings) {
        debug!("render settings: threaded={}", settings.threaded);
        self.threaded = settings.threaded;
        if settings.threaded {
            if self.worker.is_none() {
                self.start_worker();
            }
        } else {
            self.stop_worker();
        }
    }

    /// Zero the pixel buffers and restart the worker as configured.
    /// Buffer contents otherwise persist across frames and mode
    /// switches.
    pub fn reset(&mut self) {
        self.stop_worker();
        self.core
            .as_mut()
            .expect("core is held locally while no worker runs")
            .reset();
        if self.threaded {
            self.start_worker();
        }
    }

    /// Kick off rendering of a frame.
    ///
    /// An identical frame skips re-rendering; in threaded mode the line
    /// channel is still fed with the previous frame's rows so the
    /// consumer's pull loop is unaffected.
    pub fn render_frame(&mut self, input: FrameInput) {
        debug!(
            "render frame: {} polygons, identical={}",
            input.polygons.len(),
            input.identical()
        );

        if let Some(worker) = &self.worker {
            worker
                .frame_tx
                .send(input)
                .expect("render thread is running");
        } else if !input.identical() {
            let core = self
                .core
                .as_mut()
                .expect("core is held locally while no worker runs");
            core.clear_buffers(&input.state, &input.vram);
            core.render_frame(&input.state, &input.vram, input.polygons.as_slice(), |_| ());
        }
    }

    /// Fetch one output row, 258 pixels wide with the usable image at
    /// offset 1, packed 6-6-6-5 RGBA. In threaded mode this blocks
    /// until the worker has finished the row.
    pub fn get_line(&mut self, line: usize) -> &[u32] {
        if let Some(worker) = &self.worker {
            if line < 192 {
                if let Ok(row) = worker.line_rx.recv() {
                    self.line_buffer.copy_from_slice(&row);
                }
            }
            &self.line_buffer
        } else {
            self.core
                .as_ref()
                .expect("core is held locally while no worker runs")
                .line(line)
        }
    }

    /// End-of-visible-frame synchronization: blocks until the worker
    /// has finished the frame. The buffers must not be considered
    /// stable before this returns.
    pub fn vcount_144(&mut self) {
        if let Some(worker) = &self.worker {
            let _ = worker.done_rx.recv();
        }
    }

    fn start_worker(&mut self) {
        let core = self
            .core
            .take()
            .expect("core is held locally while no worker runs");

        let (frame_tx, frame_rx) = bounded(1);
        let (line_tx, line_rx) = unbounded();
        let (done_tx, done_rx) = unbounded();

        let handle = std::thread::spawn(move || render_thread(core, frame_rx, line_tx, done_tx));

        self.worker = Some(RenderWorker {
            frame_tx,
            line_rx,
            done_rx,
            handle,
        });
    }

    fn stop_worker(&mut self) {
        if let Some(worker) = self.worker.take() {
            // hanging up the frame channel ends the worker loop
            drop(worker.frame_tx);

            // drop rows left over from a partially consumed frame
            while worker.line_rx.try_recv().is_ok() {}
            while worker.done_rx.try_recv().is_ok() {}

            self.core = Some(worker.handle.join().expect("render thread panicked"));
        }
    }
}

impl Drop for SoftRenderer {
    fn drop(&mut self) {
        self.stop_worker();
    }
}

/// Body of the render worker. Owns the buffers for as long as it runs
/// and hands them back when the frame channel hangs up.
fn render_thread(
    mut core: Box<RenderCore>,
    frame_rx: Receiver<FrameInput>,
    line_tx: Sender<Box<[u32]>>,
    done_tx: Sender<()>,
) -> Box<RenderCore> {
    while let Ok(input) = frame_rx.recv() {
        if input.identical() {
            // nothing changed: replay the rows of the previous frame
            for y in 0..192 {
                let _ = line_tx.send(core.line(y).into());
            }
        } else {
            core.clear_buffers(&input.state, &input.vram);
            core.render_frame(&input.state, &input.vram, input.polygons.as_slice(), |row| {
                let _ = line_tx.send(row.into());
            });
        }

        let _ = done_tx.send(());
    }

    core
}
