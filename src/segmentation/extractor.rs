use super::types::{Point, Segment};
use crate::error::{Error, Result};
use crate::links::{LinkMap, EAST, NORTH, OWNED, SOUTH, WEST};

/// Collapse a link map into segments.
///
/// Seeds are taken in raster order: the first pixel not yet owned by a
/// region starts the next segment. Within a segment, points are emitted in
/// breadth-first order; the packed point buffer itself serves as the work
/// queue, so the traversal is deterministic. The `OWNED` bit of the link map
/// marks visited pixels and never reaches the emitted points.
pub(super) fn extract(map: &mut LinkMap) -> Result<(Vec<Point>, Vec<Segment>)> {
    let width = map.width();
    let npixels = width * map.height();

    let mut points: Vec<Point> = Vec::new();
    points
        .try_reserve_exact(npixels)
        .map_err(|_| Error::OutOfMemory)?;
    let mut segments: Vec<Segment> = Vec::new();

    for seed in 0..npixels {
        if map.at(seed) & OWNED != 0 {
            continue;
        }
        let first = points.len();
        store(map, &mut points, seed, width);

        // Scan the freshly stored points as a queue, appending unowned
        // neighbours as they are discovered.
        let mut j = first;
        while j < points.len() {
            let p = points[j];
            let idx = p.y as usize * width + p.x as usize;
            let mask = p.link;
            if mask & WEST != 0 && map.at(idx - 1) & OWNED == 0 {
                store(map, &mut points, idx - 1, width);
            }
            if mask & EAST != 0 && map.at(idx + 1) & OWNED == 0 {
                store(map, &mut points, idx + 1, width);
            }
            if mask & SOUTH != 0 && map.at(idx - width) & OWNED == 0 {
                store(map, &mut points, idx - width, width);
            }
            if mask & NORTH != 0 && map.at(idx + width) & OWNED == 0 {
                store(map, &mut points, idx + width, width);
            }
            j += 1;
        }

        segments.push(summarize(&points[first..], first));
    }

    Ok((points, segments))
}

#[inline]
fn store(map: &mut LinkMap, points: &mut Vec<Point>, idx: usize, width: usize) {
    points.push(Point {
        x: (idx % width) as i16,
        y: (idx / width) as i16,
        link: map.at(idx),
    });
    map.or_at(idx, OWNED);
}

/// Bounding box, dimensions and centre of one emitted region.
pub(super) fn summarize(points: &[Point], first: usize) -> Segment {
    let mut xmin = points[0].x;
    let mut xmax = xmin;
    let mut ymin = points[0].y;
    let mut ymax = ymin;
    for p in &points[1..] {
        if p.x < xmin {
            xmin = p.x;
        }
        if p.x > xmax {
            xmax = p.x;
        }
        if p.y < ymin {
            ymin = p.y;
        }
        if p.y > ymax {
            ymax = p.y;
        }
    }
    Segment {
        first,
        count: points.len(),
        xmin: xmin as i32,
        xmax: xmax as i32,
        ymin: ymin as i32,
        ymax: ymax as i32,
        width: (xmax - xmin + 1) as i32,
        height: (ymax - ymin + 1) as i32,
        xcen: (xmin as f64 + xmax as f64) * 0.5,
        ycen: (ymin as f64 + ymax as f64) * 0.5,
    }
}
