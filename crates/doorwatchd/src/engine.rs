use doorwatch_core::{Doorbell, FaceEncoder, Matcher, Observation, Transport};
use doorwatch_hw::{CaptureSource, Frame};
use std::time::Duration;

/// Capture cadence and preprocessing.
#[derive(Debug, Clone)]
pub struct LoopSettings {
    /// Sleep between frame reads.
    pub interval: Duration,
    /// Frames are shrunk by this factor before detection.
    pub downscale: u32,
}

/// Counters reported when the loop ends.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct LoopStats {
    pub frames: u64,
    pub read_failures: u64,
    pub vision_failures: u64,
    pub notifications: u64,
}

/// Discard frames while the camera's auto exposure settles.
pub fn discard_warmup<C: CaptureSource>(camera: &mut C, count: usize) {
    if count == 0 {
        return;
    }
    tracing::info!(count, "discarding warmup frames");
    for _ in 0..count {
        let _ = camera.read_frame();
    }
}

/// Pull frames until the camera closes, feeding each through the doorbell.
///
/// Read and vision failures skip the current cycle. The camera is released on
/// exit.
pub fn run_capture_loop<C, E, T, M>(
    camera: &mut C,
    encoder: &mut E,
    transport: &mut T,
    doorbell: &mut Doorbell<M>,
    settings: &LoopSettings,
) -> LoopStats
where
    C: CaptureSource,
    E: FaceEncoder,
    T: Transport,
    M: Matcher,
{
    let mut stats = LoopStats::default();
    tracing::info!(
        interval_ms = settings.interval.as_millis() as u64,
        downscale = settings.downscale,
        "capture loop started"
    );

    while camera.is_open() {
        match camera.read_frame() {
            Ok(frame) => {
                stats.frames += 1;
                process_frame(&frame, encoder, transport, doorbell, settings, &mut stats);
            }
            Err(e) => {
                stats.read_failures += 1;
                if !camera.is_open() {
                    break;
                }
                tracing::warn!(error = %e, "frame read failed; retrying next cycle");
            }
        }

        if !settings.interval.is_zero() {
            std::thread::sleep(settings.interval);
        }
    }

    camera.release();
    tracing::info!(?stats, "capture loop finished");
    stats
}

fn process_frame<E, T, M>(
    frame: &Frame,
    encoder: &mut E,
    transport: &mut T,
    doorbell: &mut Doorbell<M>,
    settings: &LoopSettings,
    stats: &mut LoopStats,
) where
    E: FaceEncoder,
    T: Transport,
    M: Matcher,
{
    let small = frame.downscaled(settings.downscale);

    let encodings = match encoder.detect_and_encode(&small.image) {
        Ok(encodings) => encodings,
        Err(e) => {
            stats.vision_failures += 1;
            tracing::warn!(seq = frame.sequence, error = %e, "face encoding failed; skipping frame");
            return;
        }
    };
    tracing::debug!(seq = frame.sequence, faces = encodings.len(), "frame analysed");

    match doorbell.observe(&encodings, &small.image, transport) {
        Ok(Observation::Notified { verdicts, report }) => {
            stats.notifications += 1;
            tracing::info!(
                ?verdicts,
                delivered = report.delivered.len(),
                failed = report.failed.len(),
                "notification dispatched"
            );
        }
        Ok(Observation::Unchanged(_)) | Ok(Observation::NoFaces) => {}
        Err(e) => tracing::warn!(seq = frame.sequence, error = %e, "notification abandoned"),
    }
}
