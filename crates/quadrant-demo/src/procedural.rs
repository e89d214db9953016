//! Textures and a bitmap font generated at startup, so the demo ships no
//! image files.

use std::rc::Rc;

use quadrant_engine::assets::{AssetCache, Font, Texture};
use quadrant_engine::gfx::RenderBackend;

pub const FONT_NAME: &str = "tiny";

const TILE: u32 = 16;

/// One 16x16 tile per pattern and hue. More tiles than a batch has texture
/// slots, so the renderer has to split batches.
pub fn tile_textures<B: RenderBackend>(
    gpu: &mut B,
    assets: &mut AssetCache,
    count: usize,
) -> anyhow::Result<Vec<Rc<Texture>>> {
    (0..count)
        .map(|i| {
            let hue = i as f32 / count as f32;
            let pixels = tile_pixels(i % 3, hue_to_rgb(hue));
            let texture = assets.load_texture(gpu, &format!("tile-{i}"), TILE, TILE, &pixels)?;
            Ok(texture)
        })
        .collect()
}

fn tile_pixels(pattern: usize, [r, g, b]: [u8; 3]) -> Vec<u8> {
    let mut out = Vec::with_capacity((TILE * TILE * 4) as usize);
    let center = (TILE as f32 - 1.0) / 2.0;
    for y in 0..TILE {
        for x in 0..TILE {
            let lit = match pattern {
                0 => ((x / 4) + (y / 4)) % 2 == 0,
                1 => (x + y) % 6 < 3,
                _ => {
                    let (dx, dy) = (x as f32 - center, y as f32 - center);
                    (dx * dx + dy * dy).sqrt() < center
                }
            };
            // Pattern 2 is a disc on a transparent background.
            let (shade, alpha) = match (lit, pattern) {
                (true, _) => (1.0, 255),
                (false, 2) => (0.0, 0),
                (false, _) => (0.45, 255),
            };
            out.extend_from_slice(&[
                (r as f32 * shade) as u8,
                (g as f32 * shade) as u8,
                (b as f32 * shade) as u8,
                alpha,
            ]);
        }
    }
    out
}

fn hue_to_rgb(h: f32) -> [u8; 3] {
    let x = |n: f32| {
        let k = (n + h * 6.0) % 6.0;
        let v = 1.0 - (k.min(4.0 - k).clamp(0.0, 1.0));
        (v * 255.0) as u8
    };
    [x(5.0), x(3.0), x(1.0)]
}

const GLYPH_W: u32 = 3;
const GLYPH_H: u32 = 5;
const COLUMNS: u32 = 16;

/// Characters in atlas order, paired with 3x5 bitmaps (one byte per row,
/// bit 2 is the leftmost pixel).
const GLYPHS: &[(char, [u8; 5])] = &[
    (' ', [0b000, 0b000, 0b000, 0b000, 0b000]),
    ('0', [0b111, 0b101, 0b101, 0b101, 0b111]),
    ('1', [0b010, 0b110, 0b010, 0b010, 0b111]),
    ('2', [0b111, 0b001, 0b111, 0b100, 0b111]),
    ('3', [0b111, 0b001, 0b011, 0b001, 0b111]),
    ('4', [0b101, 0b101, 0b111, 0b001, 0b001]),
    ('5', [0b111, 0b100, 0b111, 0b001, 0b111]),
    ('6', [0b111, 0b100, 0b111, 0b101, 0b111]),
    ('7', [0b111, 0b001, 0b010, 0b010, 0b010]),
    ('8', [0b111, 0b101, 0b111, 0b101, 0b111]),
    ('9', [0b111, 0b101, 0b111, 0b001, 0b111]),
    ('A', [0b010, 0b101, 0b111, 0b101, 0b101]),
    ('B', [0b110, 0b101, 0b110, 0b101, 0b110]),
    ('C', [0b011, 0b100, 0b100, 0b100, 0b011]),
    ('D', [0b110, 0b101, 0b101, 0b101, 0b110]),
    ('E', [0b111, 0b100, 0b110, 0b100, 0b111]),
    ('F', [0b111, 0b100, 0b110, 0b100, 0b100]),
    ('G', [0b011, 0b100, 0b101, 0b101, 0b011]),
    ('H', [0b101, 0b101, 0b111, 0b101, 0b101]),
    ('I', [0b111, 0b010, 0b010, 0b010, 0b111]),
    ('J', [0b001, 0b001, 0b001, 0b101, 0b010]),
    ('K', [0b101, 0b101, 0b110, 0b101, 0b101]),
    ('L', [0b100, 0b100, 0b100, 0b100, 0b111]),
    ('M', [0b101, 0b111, 0b111, 0b101, 0b101]),
    ('N', [0b110, 0b101, 0b101, 0b101, 0b101]),
    ('O', [0b010, 0b101, 0b101, 0b101, 0b010]),
    ('P', [0b110, 0b101, 0b110, 0b100, 0b100]),
    ('Q', [0b010, 0b101, 0b101, 0b110, 0b011]),
    ('R', [0b110, 0b101, 0b110, 0b101, 0b101]),
    ('S', [0b011, 0b100, 0b010, 0b001, 0b110]),
    ('T', [0b111, 0b010, 0b010, 0b010, 0b010]),
    ('U', [0b101, 0b101, 0b101, 0b101, 0b111]),
    ('V', [0b101, 0b101, 0b101, 0b101, 0b010]),
    ('W', [0b101, 0b101, 0b111, 0b111, 0b101]),
    ('X', [0b101, 0b101, 0b010, 0b101, 0b101]),
    ('Y', [0b101, 0b101, 0b010, 0b010, 0b010]),
    ('Z', [0b111, 0b001, 0b010, 0b100, 0b111]),
    (':', [0b000, 0b010, 0b000, 0b010, 0b000]),
    ('.', [0b000, 0b000, 0b000, 0b000, 0b010]),
    ('-', [0b000, 0b000, 0b111, 0b000, 0b000]),
    ('/', [0b001, 0b001, 0b010, 0b100, 0b100]),
    ('?', [0b111, 0b001, 0b010, 0b000, 0b010]),
];

/// Rasterizes the built-in 3x5 font and registers it as [`FONT_NAME`].
pub fn tiny_font<B: RenderBackend>(gpu: &mut B, assets: &mut AssetCache) -> anyhow::Result<Rc<Font>> {
    let rows = (GLYPHS.len() as u32).div_ceil(COLUMNS);
    let (width, height) = (COLUMNS * GLYPH_W, rows * GLYPH_H);
    let mut pixels = vec![0u8; (width * height * 4) as usize];

    for (i, (_, bits)) in GLYPHS.iter().enumerate() {
        let (cx, cy) = ((i as u32 % COLUMNS) * GLYPH_W, (i as u32 / COLUMNS) * GLYPH_H);
        for (row, mask) in bits.iter().enumerate() {
            for col in 0..GLYPH_W {
                if mask & (1 << (GLYPH_W - 1 - col)) == 0 {
                    continue;
                }
                let at = (((cy + row as u32) * width + cx + col) * 4) as usize;
                pixels[at..at + 4].copy_from_slice(&[255; 4]);
            }
        }
    }

    let texture = assets.load_texture(gpu, "font-tiny", width, height, &pixels)?;
    let charset: String = GLYPHS.iter().map(|(c, _)| *c).collect();
    let font = Font::from_grid(FONT_NAME, &texture, GLYPH_W, GLYPH_H, 1, &charset).with_fallback('?');
    Ok(assets.insert_font(font))
}

#[cfg(test)]
mod tests {
    use super::*;
    use quadrant_engine::gfx::RecordingBackend;

    #[test]
    fn font_covers_the_status_line() {
        let mut gpu = RecordingBackend::new();
        let mut assets = AssetCache::new();
        let font = tiny_font(&mut gpu, &mut assets).unwrap();

        for ch in "QUADRANT 0123456789 FPS: DRAWS/QUADS.-".chars() {
            assert!(font.has_glyph(ch), "missing glyph {ch:?}");
        }
        // Lowercase falls back to '?'.
        assert!(font.glyph('q').is_some());
    }

    #[test]
    fn more_tiles_than_batch_slots() {
        let mut gpu = RecordingBackend::new();
        let mut assets = AssetCache::new();
        let tiles = tile_textures(&mut gpu, &mut assets, 12).unwrap();
        assert_eq!(tiles.len(), 12);
        assert_eq!(assets.texture_count(), 12);
    }
}
