//! The abstract presentation interfaces this crate consumes rather than
//! implements. A concrete windowing/audio backend (the teacher's `eframe`
//! GUI, `rodio` output, or anything else) lives entirely outside this
//! crate and is wired in by implementing these traits.

/// A 2D image surface a `Core` can push pixel data into. `Image` is an
/// opaque handle owned by the implementor (a GPU texture id, a CPU
/// framebuffer, whatever the host uses).
pub trait HostGraphics {
    type Image;

    fn new_image(&mut self, format: HostPixelFormat, width: u32, height: u32) -> Self::Image;

    fn replace_pixels(
        &mut self,
        image: &mut Self::Image,
        bytes: &[u8],
        x: u32,
        y: u32,
        width: u32,
        height: u32,
    );

    fn image_width(&self, image: &Self::Image) -> u32;
    fn image_height(&self, image: &Self::Image) -> u32;

    fn show_message(&mut self, text: &str, frames: u32);
}

/// An audio output stream a `Core` can queue resampled PCM into.
pub trait HostAudio {
    type Source;

    fn new_source(&mut self, sample_rate: u32) -> Self::Source;
    fn queue(&mut self, source: &mut Self::Source, bytes: &[u8], sample_rate: u32);
    fn free_buffer_count(&self, source: &Self::Source) -> usize;
    fn is_playing(&self, source: &Self::Source) -> bool;
    fn play(&mut self, source: &mut Self::Source);
}

/// The host-side pixel format a `Core` picks when it (re)allocates an
/// image, chosen from the module's reported [`libretro_sys::PixelFormat`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostPixelFormat {
    /// 4 bytes per pixel, byte order `R,G,B,A`.
    Rgba8,
    /// 2 bytes per pixel, native `RGB565` packing.
    Rgb565,
    /// 2 bytes per pixel, `RGB5A1` packing.
    Rgb5A1,
}

impl HostPixelFormat {
    pub fn bytes_per_pixel(self) -> usize {
        match self {
            HostPixelFormat::Rgba8 => 4,
            HostPixelFormat::Rgb565 | HostPixelFormat::Rgb5A1 => 2,
        }
    }
}
