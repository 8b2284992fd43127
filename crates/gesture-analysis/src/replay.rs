//! Offline replay of recorded landmark streams.
//!
//! Input is JSON Lines: one [`FrameLandmarks`] object per line. Blank lines
//! are skipped.

use std::io::BufRead;

use gesture_core::{Error, FrameLandmarks, Result};

use crate::pipeline::GesturePipeline;
use crate::record::RecordSink;

/// Drive `pipeline` with every frame in `input`, writing one record per
/// frame to `sink`. Returns the number of frames processed. A line that is
/// not a valid frame aborts the replay with its 1-based line number.
pub fn replay<R: BufRead>(
    pipeline: &mut GesturePipeline,
    input: R,
    sink: &mut dyn RecordSink,
) -> Result<u64> {
    let mut frames = 0;

    for (index, line) in input.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }

        let frame: FrameLandmarks = serde_json::from_str(&line)
            .map_err(|e| Error::Serialization(format!("line {}: {}", index + 1, e)))?;
        let record = pipeline.process_frame(&frame);
        sink.write(&record)?;
        frames += 1;
    }

    sink.flush()?;
    tracing::info!("Replayed {} frames", frames);
    Ok(frames)
}
