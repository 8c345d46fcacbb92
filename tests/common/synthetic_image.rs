/// Generates a uniform grayscale image.
pub fn uniform_u8(width: usize, height: usize, value: u8) -> Vec<u8> {
    vec![value; width * height]
}

/// Paints axis-aligned squares of value 255 on a zero background.
///
/// `size` must be odd so that each square is centred on its pixel centre.
pub fn squares_u8(
    width: usize,
    height: usize,
    centres: &[(usize, usize)],
    size: usize,
) -> Vec<u8> {
    assert!(size % 2 == 1, "square size must be odd");
    let mut img = vec![0u8; width * height];
    let half = size / 2;
    for &(cx, cy) in centres {
        assert!(cx >= half && cx + half < width, "square sticks out in x");
        assert!(cy >= half && cy + half < height, "square sticks out in y");
        for y in cy - half..=cy + half {
            for x in cx - half..=cx + half {
                img[y * width + x] = 255;
            }
        }
    }
    img
}

/// Paints a slanted bar: a `bar_width`-pixel-wide run per row, shifted right
/// by `shear` pixels per row of height. Adjacent rows stay 4-connected as
/// long as `shear <= 1`.
pub fn sheared_bar_u8(
    img: &mut [u8],
    width: usize,
    x0: usize,
    y0: usize,
    bar_width: usize,
    bar_height: usize,
    shear: f64,
) {
    for dy in 0..bar_height {
        let off = (dy as f64 * shear).floor() as usize;
        let y = y0 + dy;
        for k in 0..bar_width {
            img[y * width + x0 + off + k] = 255;
        }
    }
}
