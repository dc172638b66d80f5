// Load boundary for textures.  Everything that crosses into the renderer is
// converted here to the single canonical pixel layout, 0xAARRGGBB.

use std::ops::{Index, IndexMut};
use std::path::Path;

use crate::renderer::{Argb, Surface, SurfaceError, TRANSPARENT};

/// A texture is a read-only [`Surface`]; no separate type needed.
pub type Texture = Surface;

/// Things that can go wrong when loading or building a texture.
#[derive(Debug, thiserror::Error)]
pub enum TextureError {
    /// The external decoder could not read the file / bytes.
    #[error("cannot decode image: {0}")]
    Decode(#[from] image::ImageError),

    /// Dimensions and pixel data disagree.
    #[error(transparent)]
    Surface(#[from] SurfaceError),
}

/// 256-entry colour table for indexed textures (0xAARRGGBB entries).
pub struct Palette(pub [Argb; 256]);
impl Default for Palette {
    fn default() -> Self {
        Palette([0u32; 256])
    }
}
impl Index<usize> for Palette {
    type Output = Argb;
    fn index(&self, idx: usize) -> &Argb {
        &self.0[idx]
    }
}
impl IndexMut<usize> for Palette {
    fn index_mut(&mut self, idx: usize) -> &mut Argb {
        &mut self.0[idx]
    }
}
impl Palette {
    /// Build from up to 256 colours; missing entries are transparent.
    pub fn from_colors(colors: &[Argb]) -> Self {
        let mut p = Palette::default();
        for (dst, &c) in p.0.iter_mut().zip(colors) {
            *dst = c;
        }
        p
    }
}

/*──────────────────────── channel order ──────────────────────────*/

/// 0xRRGGBBAA → 0xAARRGGBB.
#[inline(always)]
pub const fn rgba_to_argb(rgba: u32) -> Argb {
    rgba.rotate_right(8)
}

/// 0xAARRGGBB → 0xRRGGBBAA.
#[inline(always)]
pub const fn argb_to_rgba(argb: Argb) -> u32 {
    argb.rotate_left(8)
}

/// Pack `R, G, B, A` byte quadruplets (decoder output order) into ARGB
/// words.  Fully transparent pixels collapse to [`TRANSPARENT`], the
/// sentinel the sprite blitter skips.  A trailing partial quadruplet is
/// ignored.
pub fn argb_from_rgba_bytes(bytes: &[u8]) -> Vec<Argb> {
    bytes
        .chunks_exact(4)
        .map(|px| {
            let [r, g, b, a] = [px[0], px[1], px[2], px[3]];
            if a == 0 {
                TRANSPARENT
            } else {
                u32::from_be_bytes([a, r, g, b])
            }
        })
        .collect()
}

/*──────────────────────── constructors ───────────────────────────*/

impl Surface {
    /// Decode an image file (any format the `image` crate knows).
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Texture, TextureError> {
        let path = path.as_ref();
        let img = image::open(path)?.to_rgba8();
        tracing::debug!(
            path = %path.display(),
            width = img.width(),
            height = img.height(),
            "loaded texture"
        );
        Self::from_rgba_image(img)
    }

    /// Decode an in-memory encoded image.
    pub fn from_memory(bytes: &[u8]) -> Result<Texture, TextureError> {
        let img = image::load_from_memory(bytes)?.to_rgba8();
        Self::from_rgba_image(img)
    }

    fn from_rgba_image(img: image::RgbaImage) -> Result<Texture, TextureError> {
        let (w, h) = (img.width() as usize, img.height() as usize);
        let pixels = argb_from_rgba_bytes(img.as_raw());
        Ok(Surface::from_pixels(w, h, pixels)?)
    }

    /// Expand 8-bit palette indices into a true-colour texture.
    pub fn from_indexed(
        width: usize,
        height: usize,
        indices: &[u8],
        palette: &Palette,
    ) -> Result<Texture, TextureError> {
        let pixels = indices.iter().map(|&i| palette[i as usize]).collect();
        Ok(Surface::from_pixels(width, height, pixels)?)
    }

    /// `size`×`size` checkerboard of single-pixel squares, the fallback used
    /// when no image is supplied.
    pub fn checker(size: usize, a: Argb, b: Argb) -> Texture {
        let mut tex = Surface::new(size, size);
        for y in 0..size {
            for x in 0..size {
                tex.set(x as i32, y as i32, if (x ^ y) & 1 == 0 { a } else { b });
            }
        }
        tex
    }
}

/*======================================================================*/
/*                               Tests                                  */
/*======================================================================*/
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn channel_conversion_moves_alpha() {
        assert_eq!(rgba_to_argb(0x11223344), 0x44112233);
        assert_eq!(argb_to_rgba(0x44112233), 0x11223344);
    }

    #[test]
    fn byte_packing_orders_channels_and_keys_out_alpha_zero() {
        let bytes = [0x10, 0x20, 0x30, 0xFF, 0x99, 0x99, 0x99, 0x00, 7];
        assert_eq!(argb_from_rgba_bytes(&bytes), vec![0xFF10_2030, TRANSPARENT]);
    }

    #[test]
    fn indexed_textures_use_palette() {
        let pal = Palette::from_colors(&[0xFF00_0000, 0xFFFF_0000, 0xFF00_FF00]);
        let tex = Surface::from_indexed(2, 2, &[0, 1, 2, 1], &pal).unwrap();
        assert_eq!(tex.pixels(), &[0xFF00_0000, 0xFFFF_0000, 0xFF00_FF00, 0xFFFF_0000]);
    }

    #[test]
    fn indexed_size_mismatch_is_an_error() {
        let pal = Palette::default();
        assert!(matches!(
            Surface::from_indexed(3, 3, &[0; 4], &pal),
            Err(TextureError::Surface(_))
        ));
    }

    #[test]
    fn checker_alternates() {
        let tex = Surface::checker(4, 1, 2);
        assert_eq!(tex.get(0, 0), Some(1));
        assert_eq!(tex.get(1, 0), Some(2));
        assert_eq!(tex.get(1, 1), Some(1));
    }

    #[test]
    fn decodes_png_from_memory() {
        let mut img = image::RgbaImage::new(2, 1);
        img.put_pixel(0, 0, image::Rgba([255, 0, 0, 255]));
        img.put_pixel(1, 0, image::Rgba([0, 0, 255, 0]));
        let mut encoded = Vec::new();
        image::DynamicImage::ImageRgba8(img)
            .write_to(
                &mut std::io::Cursor::new(&mut encoded),
                image::ImageOutputFormat::Png,
            )
            .unwrap();

        let tex = Surface::from_memory(&encoded).unwrap();
        assert_eq!(tex.width(), 2);
        assert_eq!(tex.pixels(), &[0xFFFF_0000, TRANSPARENT]);
    }

    #[test]
    fn garbage_bytes_fail_to_decode() {
        assert!(matches!(
            Surface::from_memory(b"not an image"),
            Err(TextureError::Decode(_))
        ));
    }
}
