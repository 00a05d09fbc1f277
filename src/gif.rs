//! Animated GIF export of simulated frames

use crate::output::{ensure_parent, OutputError};
use image::codecs::gif::{GifEncoder, Repeat};
use image::{Delay, Frame, RgbaImage};
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

/// GIF frame delay for a frame duration.
///
/// GIF stores delays in centiseconds; anything shorter than 10 ms is
/// rounded up to one centisecond.
pub fn frame_delay(frame_ms: u32) -> Delay {
    let delay_cs = (frame_ms / 10).max(1);
    Delay::from_numer_denom_ms(delay_cs * 10, 1)
}

/// Encode frames as an animated GIF.
///
/// Frames are consumed as they are produced so long simulations never hold
/// more than one frame. Returns the number of frames written; an empty
/// sequence is an error and leaves no file behind.
pub fn render_gif<I>(frames: I, frame_ms: u32, loop_anim: bool, path: &Path) -> Result<usize, OutputError>
where
    I: IntoIterator<Item = RgbaImage>,
{
    let mut frames = frames.into_iter().peekable();
    if frames.peek().is_none() {
        return Err(OutputError::Empty);
    }

    ensure_parent(path)?;
    let writer = BufWriter::new(File::create(path)?);
    let mut encoder = GifEncoder::new(writer);
    encoder.set_repeat(if loop_anim { Repeat::Infinite } else { Repeat::Finite(0) })?;

    let delay = frame_delay(frame_ms);
    let mut written = 0;
    for image in frames {
        encoder.encode_frame(Frame::from_parts(image, 0, 0, delay))?;
        written += 1;
    }
    log::debug!("wrote {} GIF frames to {}", written, path.display());
    Ok(written)
}
