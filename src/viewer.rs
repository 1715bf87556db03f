use std::path::Path;
use std::thread;
use std::time::Duration;

use anyhow::{ensure, Context, Result};
use minifb::{Window, WindowOptions};
use tracing::info;

use crate::field::{self, Snapshot};

/// Fixed window size: two stacked panels.
pub const FRAME_WIDTH: usize = 640;
pub const FRAME_HEIGHT: usize = 960;

/// Pause between timesteps.
const FRAME_DELAY: Duration = Duration::from_millis(100);

/// Replays every saved timestep under `root` in a window, one frame per
/// timestep. A snapshot that fails to load aborts the replay at that
/// timestep. Closing the window stops the replay early.
pub fn play(root: &Path) -> Result<()> {
    let timesteps = field::discover_timesteps(root)?;
    ensure!(
        !timesteps.is_empty(),
        "no timestep directories under {}",
        root.display()
    );
    info!("replaying {} timesteps from {}", timesteps.len(), root.display());

    let mut window = Window::new(
        "flowviz",
        FRAME_WIDTH,
        FRAME_HEIGHT,
        WindowOptions::default(),
    )
    .context("creating display window")?;

    let mut rgb = vec![0u8; FRAME_WIDTH * FRAME_HEIGHT * 3];
    let mut framebuf = vec![0u32; FRAME_WIDTH * FRAME_HEIGHT];
    for dir in &timesteps {
        if !window.is_open() {
            break;
        }
        let snapshot = Snapshot::load(dir)?;
        field::render_frame(&snapshot, &mut rgb, FRAME_WIDTH as u32, FRAME_HEIGHT as u32)?;
        rgb_to_0rgb(&rgb, &mut framebuf);
        window
            .update_with_buffer(&framebuf, FRAME_WIDTH, FRAME_HEIGHT)
            .context("updating display")?;
        info!(timestep = %snapshot.name, "displayed");
        thread::sleep(FRAME_DELAY);
    }

    Ok(())
}

/// Convert RGB `&[u8]` buffer to 0RGB `&[u32]` buffer for minifb.
fn rgb_to_0rgb(rgb: &[u8], out: &mut [u32]) {
    for (i, pixel) in rgb.chunks_exact(3).enumerate() {
        out[i] = (pixel[0] as u32) << 16 | (pixel[1] as u32) << 8 | pixel[2] as u32;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn packs_rgb_bytes_into_0rgb_words() {
        let rgb = [0x12, 0x34, 0x56, 0xff, 0x00, 0x7f];
        let mut out = [0u32; 2];
        rgb_to_0rgb(&rgb, &mut out);
        assert_eq!(out, [0x0012_3456, 0x00ff_007f]);
    }
}
