use super::{LinkMap, EAST, NORTH, SOUTH, WEST};
use crate::error::Result;
use crate::image::{ImageView, Sample};

/// Fill a link map for `img`.
///
/// Neighbour pixels belong to the same region when their absolute difference
/// is at most `threshold` (converted once into the sample space); a converted
/// threshold of zero selects exact equality instead. Both endpoints of every
/// link are written in the same pass, so the result is symmetric.
pub(crate) fn build_links<S: Sample>(img: &ImageView<'_, S>, threshold: f64) -> Result<LinkMap> {
    img.validate()?;
    let mut map = LinkMap::new(img.width, img.height)?;
    if img.width == 0 || img.height == 0 {
        return Ok(map);
    }
    let tol = S::threshold_from(threshold);
    if tol.is_zero() {
        fill(img, &mut map, |a: S, b: S| a == b);
    } else {
        fill(img, &mut map, move |a: S, b: S| a.within(b, tol));
    }
    Ok(map)
}

fn fill<S: Sample>(img: &ImageView<'_, S>, map: &mut LinkMap, similar: impl Fn(S, S) -> bool) {
    let w = img.width;

    // First row: only east/west pairs, there is no row below.
    let row0 = img.row(0);
    for x in 1..w {
        if similar(row0[x], row0[x - 1]) {
            map.bits[x - 1] |= EAST;
            map.bits[x] |= WEST;
        }
    }

    // Remaining rows: pair each pixel with its west and south neighbours,
    // setting both sides of each link.
    for y in 1..img.height {
        let row = img.row(y);
        let below = img.row(y - 1);
        let base = y * w;
        if similar(row[0], below[0]) {
            map.bits[base - w] |= NORTH;
            map.bits[base] |= SOUTH;
        }
        for x in 1..w {
            let mut bits = 0u8;
            if similar(row[x], row[x - 1]) {
                map.bits[base + x - 1] |= EAST;
                bits |= WEST;
            }
            if similar(row[x], below[x]) {
                map.bits[base - w + x] |= NORTH;
                bits |= SOUTH;
            }
            map.bits[base + x] |= bits;
        }
    }
}
