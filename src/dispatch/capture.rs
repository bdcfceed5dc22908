//! Render capture: crop, scale and encode a frame off the tick thread.

use std::sync::mpsc;

use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::imageops::{self, FilterType};
use image::{ColorType, ImageEncoder, RgbImage, RgbaImage};

use crate::error::ClientError;
use crate::protocol::transfer::GetRenderRequestMessage;
use crate::protocol::MediaType;

/// Largest output width or height a render request may ask for.
pub const MAX_CAPTURE_SIDE: u32 = 8192;

/// Read-back of the last rendered frame, tightly packed RGBA8.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapturedFrame {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// `width * height * 4` bytes, row-major, top row first.
    pub rgba: Vec<u8>,
}

/// Where the capture state machine is. At most one capture is in flight.
#[derive(Debug, Clone, PartialEq)]
pub enum CaptureState {
    /// No capture pending; messages may be dispatched.
    Ready,
    /// Request received this tick; the frame still shows older state.
    Triggered(GetRenderRequestMessage),
    /// One frame has been drawn since the request; read it back next.
    Pause(GetRenderRequestMessage),
    /// Encoding on the background thread, as the job with this id.
    InProgress(u64),
}

impl CaptureState {
    /// Whether the dispatcher may apply messages.
    #[must_use]
    pub const fn is_ready(&self) -> bool {
        matches!(self, Self::Ready)
    }
}

/// Largest centered region of a `source` frame with the aspect ratio of
/// `target`, as `(x, y, width, height)`.
#[must_use]
pub fn center_crop(source: (u32, u32), target: (u32, u32)) -> (u32, u32, u32, u32) {
    let (sw, sh) = source;
    let source_aspect = sw as f64 / sh as f64;
    let target_aspect = target.0 as f64 / target.1 as f64;
    let (w, h) = if source_aspect > target_aspect {
        (((target_aspect * sh as f64).round() as u32).clamp(1, sw), sh)
    } else if source_aspect < target_aspect {
        (sw, ((sw as f64 / target_aspect).round() as u32).clamp(1, sh))
    } else {
        (sw, sh)
    };
    ((sw - w) / 2, (sh - h) / 2, w, h)
}

/// Crop `frame` to the requested aspect, resize it and encode it.
///
/// JPEG has no alpha, so translucent pixels are composited over white.
///
/// # Errors
///
/// [`ClientError::Capture`] when either size is zero, the requested size
/// exceeds [`MAX_CAPTURE_SIDE`], the buffer does not match its dimensions,
/// or the encoder fails.
pub fn encode_capture(
    frame: CapturedFrame,
    request: &GetRenderRequestMessage,
) -> Result<Vec<u8>, ClientError> {
    let (tw, th) = (request.width, request.height);
    if frame.width == 0 || frame.height == 0 || tw == 0 || th == 0 {
        return Err(ClientError::Capture(format!(
            "cannot capture {}x{} into {tw}x{th}",
            frame.width, frame.height
        )));
    }
    if tw > MAX_CAPTURE_SIDE || th > MAX_CAPTURE_SIDE {
        return Err(ClientError::Capture(format!(
            "requested {tw}x{th} capture exceeds {MAX_CAPTURE_SIDE} pixels per side"
        )));
    }
    let source = RgbaImage::from_raw(frame.width, frame.height, frame.rgba)
        .ok_or_else(|| ClientError::Capture("frame buffer does not match its size".into()))?;
    let (x, y, w, h) = center_crop((frame.width, frame.height), (tw, th));
    let cropped = imageops::crop_imm(&source, x, y, w, h).to_image();
    let scaled = imageops::resize(&cropped, tw, th, FilterType::Triangle);

    let mut out = Vec::new();
    match request.format {
        MediaType::Png => {
            PngEncoder::new(&mut out).write_image(scaled.as_raw(), tw, th, ColorType::Rgba8)?;
        }
        MediaType::Jpeg => {
            let flat = RgbImage::from_fn(tw, th, |px, py| {
                let [r, g, b, a] = scaled.get_pixel(px, py).0;
                let over_white = |c: u8| {
                    let alpha = u16::from(a);
                    ((u16::from(c) * alpha + 255 * (255 - alpha) + 127) / 255) as u8
                };
                image::Rgb([over_white(r), over_white(g), over_white(b)])
            });
            JpegEncoder::new_with_quality(&mut out, request.quality.clamp(1, 100))
                .write_image(flat.as_raw(), tw, th, ColorType::Rgb8)?;
        }
    }
    Ok(out)
}

enum EncodeRequest {
    Encode {
        job: u64,
        frame: CapturedFrame,
        request: GetRenderRequestMessage,
    },
    Shutdown,
}

/// Finished job id and its outcome.
pub type EncodeResult = (u64, Result<Vec<u8>, String>);

/// Result slot shared with the encoder thread.
type Encoded = Option<EncodeResult>;

/// Background thread that encodes captured frames.
pub struct CaptureEncoder {
    request_tx: mpsc::Sender<EncodeRequest>,
    result: triple_buffer::Output<Encoded>,
    next_job: u64,
    thread: Option<std::thread::JoinHandle<()>>,
}

impl CaptureEncoder {
    /// Spawn the encoder thread.
    ///
    /// # Errors
    ///
    /// Returns [`std::io::Error`] if the background thread fails to spawn.
    pub fn new() -> Result<Self, std::io::Error> {
        let (request_tx, request_rx) = mpsc::channel::<EncodeRequest>();
        let (input, output) = triple_buffer::triple_buffer(&None);

        let thread = std::thread::Builder::new()
            .name("capture-encoder".into())
            .spawn(move || {
                Self::thread_loop(request_rx, input);
            })?;

        Ok(Self {
            request_tx,
            result: output,
            next_job: 0,
            thread: Some(thread),
        })
    }

    /// Queue a frame for encoding (non-blocking). Returns the job id its
    /// result will carry.
    ///
    /// # Errors
    ///
    /// [`ClientError::Capture`] if the encoder thread has stopped.
    pub fn submit(
        &mut self,
        frame: CapturedFrame,
        request: GetRenderRequestMessage,
    ) -> Result<u64, ClientError> {
        let job = self.next_job;
        self.next_job += 1;
        self.request_tx
            .send(EncodeRequest::Encode {
                job,
                frame,
                request,
            })
            .map_err(|_| ClientError::Capture("encoder thread has stopped".into()))?;
        Ok(job)
    }

    /// Non-blocking check for a finished encode.
    pub fn try_recv(&mut self) -> Option<EncodeResult> {
        let _ = self.result.update();
        self.result.output_buffer_mut().take()
    }

    /// Shut down the encoder thread and wait for it to finish.
    pub fn shutdown(&mut self) {
        let _ = self.request_tx.send(EncodeRequest::Shutdown);
        if let Some(handle) = self.thread.take() {
            let _ = handle.join();
        }
    }

    #[allow(clippy::needless_pass_by_value)]
    fn thread_loop(
        request_rx: mpsc::Receiver<EncodeRequest>,
        mut input: triple_buffer::Input<Encoded>,
    ) {
        while let Ok(request) = request_rx.recv() {
            match request {
                EncodeRequest::Shutdown => break,
                EncodeRequest::Encode {
                    job,
                    frame,
                    request,
                } => {
                    let started = web_time::Instant::now();
                    let encoded =
                        encode_capture(frame, &request).map_err(|e| e.to_string());
                    log::debug!(
                        "encoded {}x{} {:?} capture in {:?}",
                        request.width,
                        request.height,
                        request.format,
                        started.elapsed()
                    );
                    input.write(Some((job, encoded)));
                }
            }
        }
    }
}

impl Drop for CaptureEncoder {
    fn drop(&mut self) {
        self.shutdown();
    }
}
