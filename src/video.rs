//! C4 — Video Translator.
//!
//! Converts the module's raw framebuffer (one of three libretro pixel
//! formats, arbitrary pitch) into a host image, reconstructing the image
//! and scratch buffer whenever dimensions or pixel format change. Ported
//! from `Core::videoRefresh`/`Core::videoSetGeometry` in the original.

use libretro_sys::PixelFormat;

use crate::router::RawFrame;
use crate::traits::{HostGraphics, HostPixelFormat};

/// `(baseWidth, baseHeight, maxWidth, maxHeight, aspectRatio)`. If
/// `aspect_ratio <= 0.0`, callers must recompute it as `base_width as f32 /
/// base_height as f32` before storing — this type only carries the value,
/// it does not normalize it itself, since the recomputation also feeds the
/// `SET_GEOMETRY` / `SET_SYSTEM_AV_INFO` handlers directly.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Geometry {
    pub base_width: u32,
    pub base_height: u32,
    pub max_width: u32,
    pub max_height: u32,
    pub aspect_ratio: f32,
}

impl Geometry {
    pub fn normalized_aspect_ratio(&self) -> f32 {
        if self.aspect_ratio > 0.0 {
            self.aspect_ratio
        } else {
            self.base_width as f32 / self.base_height as f32
        }
    }
}

fn host_format_for(module_format: PixelFormat) -> (HostPixelFormat, usize) {
    match module_format {
        PixelFormat::ARGB8888 => (HostPixelFormat::Rgba8, 4),
        PixelFormat::RGB565 => (HostPixelFormat::Rgb565, 2),
        PixelFormat::ARGB1555 => (HostPixelFormat::Rgb5A1, 2),
    }
}

/// Holds the cached host image and scratch buffer across `video_refresh`
/// calls, reconstructing both only when the module's reported dimensions or
/// pixel format actually change.
pub(crate) struct VideoPipeline<G: HostGraphics> {
    image: Option<G::Image>,
    scratch: Vec<u8>,
    width: u32,
    height: u32,
    module_format: Option<PixelFormat>,
}

impl<G: HostGraphics> VideoPipeline<G> {
    pub fn new() -> Self {
        Self {
            image: None,
            scratch: Vec::new(),
            width: 0,
            height: 0,
            module_format: None,
        }
    }

    /// Forces reconstruction of the image and scratch buffer on the next
    /// `refresh`, per a `SET_GEOMETRY`/`SET_SYSTEM_AV_INFO` change.
    pub fn invalidate(&mut self) {
        self.image = None;
        self.scratch.clear();
    }

    pub fn image(&self) -> Option<&G::Image> {
        self.image.as_ref()
    }

    /// # Safety
    /// `frame.data`, when non-null, must point to at least
    /// `frame.height * frame.pitch` readable bytes.
    pub unsafe fn refresh(&mut self, host: &mut G, frame: RawFrame, module_format: PixelFormat) {
        // Null data means "duplicate the previous frame": leave everything
        // as-is and do not touch the host image.
        let Some(data) = (!frame.data.is_null()).then_some(frame.data) else {
            return;
        };

        let needs_reconstruction = self.image.is_none()
            || self.width != frame.width
            || self.height != frame.height
            || self.module_format != Some(module_format);

        let (host_format, bpp) = host_format_for(module_format);

        if needs_reconstruction {
            self.scratch = vec![0u8; frame.width as usize * frame.height as usize * bpp];
            self.image = Some(host.new_image(host_format, frame.width, frame.height));
            self.width = frame.width;
            self.height = frame.height;
            self.module_format = Some(module_format);
        }

        let src = std::slice::from_raw_parts(data.cast::<u8>(), frame.height as usize * frame.pitch);
        let row_bytes = frame.width as usize * bpp;

        if module_format == PixelFormat::ARGB8888 {
            for y in 0..frame.height as usize {
                let src_row = &src[y * frame.pitch..][..row_bytes];
                let dst_row = &mut self.scratch[y * row_bytes..][..row_bytes];
                for (src_px, dst_px) in src_row.chunks_exact(4).zip(dst_row.chunks_exact_mut(4)) {
                    let pixel = u32::from_ne_bytes([src_px[0], src_px[1], src_px[2], src_px[3]]);
                    let converted = 0xFF000000
                        | (pixel & 0x00FF0000) >> 16
                        | (pixel & 0x0000FF00)
                        | (pixel & 0x000000FF) << 16;
                    dst_px.copy_from_slice(&converted.to_ne_bytes());
                }
            }
        } else {
            for y in 0..frame.height as usize {
                let src_row = &src[y * frame.pitch..][..row_bytes];
                let dst_row = &mut self.scratch[y * row_bytes..][..row_bytes];
                dst_row.copy_from_slice(src_row);
            }
        }

        if let Some(image) = &mut self.image {
            host.replace_pixels(image, &self.scratch, 0, 0, frame.width, frame.height);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FakeImage {
        format: HostPixelFormat,
        width: u32,
        height: u32,
    }

    #[derive(Default)]
    struct FakeGraphics {
        replace_calls: usize,
        last_bytes: Vec<u8>,
    }

    impl HostGraphics for FakeGraphics {
        type Image = FakeImage;

        fn new_image(&mut self, format: HostPixelFormat, width: u32, height: u32) -> Self::Image {
            FakeImage {
                format,
                width,
                height,
            }
        }

        fn replace_pixels(
            &mut self,
            _image: &mut Self::Image,
            bytes: &[u8],
            _x: u32,
            _y: u32,
            _width: u32,
            _height: u32,
        ) {
            self.replace_calls += 1;
            self.last_bytes = bytes.to_vec();
        }

        fn image_width(&self, image: &Self::Image) -> u32 {
            image.width
        }

        fn image_height(&self, image: &Self::Image) -> u32 {
            image.height
        }

        fn show_message(&mut self, _text: &str, _frames: u32) {}
    }

    #[test]
    fn argb8888_refresh_swaps_channels_and_forces_alpha() {
        let pixels: [u32; 2] = [0x0011_2233, 0x00AA_BBCC];
        let data = pixels.as_ptr().cast::<std::ffi::c_void>();

        let mut pipeline = VideoPipeline::<FakeGraphics>::new();
        let mut host = FakeGraphics::default();

        unsafe {
            pipeline.refresh(
                &mut host,
                RawFrame {
                    data,
                    width: 2,
                    height: 1,
                    pitch: 8,
                },
                PixelFormat::ARGB8888,
            );
        }

        assert_eq!(host.replace_calls, 1);
        assert_eq!(
            host.last_bytes,
            vec![0x11, 0x22, 0x33, 0xFF, 0xAA, 0xBB, 0xCC, 0xFF]
        );
        assert_eq!(pipeline.image().unwrap().format, HostPixelFormat::Rgba8);
    }

    #[test]
    fn frame_duplication_is_a_no_op() {
        let mut pipeline = VideoPipeline::<FakeGraphics>::new();
        let mut host = FakeGraphics::default();

        unsafe {
            pipeline.refresh(
                &mut host,
                RawFrame {
                    data: std::ptr::null(),
                    width: 64,
                    height: 64,
                    pitch: 256,
                },
                PixelFormat::ARGB8888,
            );
        }

        assert_eq!(host.replace_calls, 0);
        assert!(pipeline.image().is_none());
    }

    #[test]
    fn geometry_recomputes_nonpositive_aspect_ratio() {
        let geometry = Geometry {
            base_width: 256,
            base_height: 224,
            max_width: 256,
            max_height: 224,
            aspect_ratio: 0.0,
        };

        assert!((geometry.normalized_aspect_ratio() - 256.0 / 224.0).abs() < f32::EPSILON);
    }
}
