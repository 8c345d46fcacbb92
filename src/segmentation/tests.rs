use super::*;
use crate::links::{EAST, INTERIOR, NORTH, SOUTH, WEST};

fn segment_u8(data: &[u8], w: usize, h: usize, threshold: f64) -> Segmentation {
    let view = ImageView::new(data, 0, w, h, w).expect("valid view");
    Segmentation::from_image(&view, threshold).expect("segmentation")
}

#[test]
fn empty_image_yields_empty_segmentation() {
    let sgm = segment_u8(&[], 0, 0, 0.0);
    assert_eq!(sgm.len(), 0);
    assert_eq!(sgm.points().len(), 0);
    assert_eq!(sgm.image_width(), 0);
    assert_eq!(sgm.image_height(), 0);
}

#[test]
fn uniform_image_is_one_segment() {
    let data = vec![42u8; 16];
    let sgm = segment_u8(&data, 4, 4, 0.0);
    assert_eq!(sgm.len(), 1);

    let s = &sgm.segments()[0];
    assert_eq!(s.count, 16);
    assert_eq!((s.xmin, s.xmax, s.ymin, s.ymax), (0, 3, 0, 3));
    assert_eq!((s.width, s.height), (4, 4));
    assert_eq!((s.xcen, s.ycen), (1.5, 1.5));

    // The four centre pixels are interior; the twelve edge pixels are not.
    let interior = sgm
        .segment_points(0)
        .unwrap()
        .iter()
        .filter(|p| p.link & INTERIOR == INTERIOR)
        .count();
    assert_eq!(interior, 4, "4x4 uniform image has exactly 4 interior pixels");
}

#[test]
fn threshold_merges_and_splits_a_row() {
    let data = [10u8, 10, 20, 20];

    let merged = segment_u8(&data, 4, 1, 5.0);
    assert_eq!(merged.len(), 1, "all |d| <= 5 so one segment expected");
    assert_eq!(merged.segments()[0].count, 4);

    let split = segment_u8(&data, 4, 1, 0.0);
    assert_eq!(split.len(), 2);
    assert_eq!((split.segments()[0].xmin, split.segments()[0].xmax), (0, 1));
    assert_eq!((split.segments()[1].xmin, split.segments()[1].xmax), (2, 3));
}

#[test]
fn single_column_image_links_vertically() {
    let data = [7u8, 7, 7, 9, 9];
    let sgm = segment_u8(&data, 1, 5, 0.0);
    assert_eq!(sgm.len(), 2, "a 1-wide image must still link vertically");
    assert_eq!(sgm.segments()[0].count, 3);
    assert_eq!(sgm.segments()[1].count, 2);
    assert_eq!((sgm.segments()[0].ymin, sgm.segments()[0].ymax), (0, 2));
}

#[test]
fn single_pixel_image_is_one_point_segment() {
    let sgm = segment_u8(&[42], 1, 1, 0.0);
    assert_eq!(sgm.len(), 1);
    let s = sgm.segments()[0];
    assert_eq!(s.count, 1);
    assert_eq!((s.width, s.height), (1, 1));
    assert_eq!(sgm.segment_points(0).unwrap()[0].link, 0);
}

#[test]
fn segments_partition_the_image() {
    let w = 11;
    let h = 7;
    let data: Vec<u8> = (0..w * h).map(|i| ((i * 7 + 3) % 5) as u8).collect();
    let sgm = segment_u8(&data, w, h, 1.0);

    assert_eq!(sgm.points().len(), w * h, "every pixel emitted exactly once");
    let mut seen = vec![false; w * h];
    for p in sgm.points() {
        let idx = p.y as usize * w + p.x as usize;
        assert!(!seen[idx], "pixel ({},{}) emitted twice", p.x, p.y);
        seen[idx] = true;
    }
    assert!(seen.iter().all(|&v| v), "some pixel was never emitted");

    let total: usize = sgm.counts().iter().sum();
    assert_eq!(total, w * h);
}

#[test]
fn segment_points_are_connected() {
    let w = 9;
    let h = 9;
    let data: Vec<u8> = (0..w * h).map(|i| ((i / 3) % 4) as u8).collect();
    let sgm = segment_u8(&data, w, h, 0.0);

    for j in 0..sgm.len() {
        let pts = sgm.segment_points(j).unwrap();
        // Breadth-first emission guarantees every point after the seed is
        // adjacent (via an in-segment link) to an earlier point.
        for (k, p) in pts.iter().enumerate().skip(1) {
            let reachable = pts[..k].iter().any(|q| {
                let dx = (p.x - q.x).abs();
                let dy = (p.y - q.y).abs();
                dx + dy == 1
            });
            assert!(
                reachable,
                "point ({},{}) of segment {j} not adjacent to any earlier point",
                p.x, p.y
            );
        }
    }
}

#[test]
fn emitted_links_never_carry_the_visited_mark() {
    let data = vec![7u8; 25];
    let sgm = segment_u8(&data, 5, 5, 0.0);
    for p in sgm.points() {
        assert_eq!(p.link & !INTERIOR, 0, "unexpected bits in link mask");
    }
}

#[test]
fn link_masks_match_region_geometry() {
    let data = vec![1u8; 4];
    let sgm = segment_u8(&data, 2, 2, 0.0);
    let pts = sgm.segment_points(0).unwrap();
    for p in pts {
        let expect = match (p.x, p.y) {
            (0, 0) => EAST | NORTH,
            (1, 0) => WEST | NORTH,
            (0, 1) => EAST | SOUTH,
            (1, 1) => WEST | SOUTH,
            _ => unreachable!(),
        };
        assert_eq!(p.link, expect, "bad mask at ({},{})", p.x, p.y);
    }
}

#[test]
fn extraction_is_deterministic() {
    let w = 16;
    let h = 12;
    let data: Vec<u8> = (0..w * h).map(|i| ((i * 13 + 5) % 7) as u8).collect();
    let a = segment_u8(&data, w, h, 2.0);
    let b = segment_u8(&data, w, h, 2.0);
    assert_eq!(a.points(), b.points());
    assert_eq!(a.segments(), b.segments());
}

#[test]
fn bounding_boxes_match_point_extrema() {
    let w = 10;
    let h = 10;
    let data: Vec<u8> = (0..w * h).map(|i| ((i % w) / 3) as u8).collect();
    let sgm = segment_u8(&data, w, h, 0.0);
    for j in 0..sgm.len() {
        let s = sgm.segments()[j];
        let pts = sgm.segment_points(j).unwrap();
        let xmin = pts.iter().map(|p| p.x).min().unwrap() as i32;
        let xmax = pts.iter().map(|p| p.x).max().unwrap() as i32;
        let ymin = pts.iter().map(|p| p.y).min().unwrap() as i32;
        let ymax = pts.iter().map(|p| p.y).max().unwrap() as i32;
        assert_eq!((s.xmin, s.xmax, s.ymin, s.ymax), (xmin, xmax, ymin, ymax));
        assert_eq!(s.width, xmax - xmin + 1);
        assert_eq!(s.height, ymax - ymin + 1);
        assert_eq!(s.xcen, (xmin as f64 + xmax as f64) * 0.5);
        assert_eq!(s.ycen, (ymin as f64 + ymax as f64) * 0.5);
    }
}

#[test]
fn select_single_segment_copies_it() {
    let data = [10u8, 10, 20, 20];
    let sgm = segment_u8(&data, 4, 1, 0.0);
    let one = sgm.select(&[1]).expect("select");
    assert_eq!(one.len(), 1);
    assert_eq!(one.image_width(), 4);
    let s = one.segments()[0];
    let src = sgm.segments()[1];
    assert_eq!(s.first, 0, "copied segment starts its own buffer");
    assert_eq!((s.count, s.xmin, s.xmax), (src.count, src.xmin, src.xmax));
    assert_eq!(one.segment_points(0).unwrap(), sgm.segment_points(1).unwrap());
}

#[test]
fn select_all_in_order_is_equivalent() {
    let w = 8;
    let h = 6;
    let data: Vec<u8> = (0..w * h).map(|i| ((i * 3 + 1) % 4) as u8).collect();
    let sgm = segment_u8(&data, w, h, 0.0);
    let all: Vec<usize> = (0..sgm.len()).collect();
    let copy = sgm.select(&all).expect("select all");
    assert_eq!(copy.points(), sgm.points());
    assert_eq!(copy.segments(), sgm.segments());
}

#[test]
fn select_permits_duplicates_and_reordering() {
    let data = [10u8, 10, 20, 20];
    let sgm = segment_u8(&data, 4, 1, 0.0);
    let sel = sgm.select(&[1, 0, 1]).expect("select");
    assert_eq!(sel.len(), 3);
    assert_eq!(sel.segments()[0].xmin, 2);
    assert_eq!(sel.segments()[1].xmin, 0);
    assert_eq!(sel.segments()[2].xmin, 2);
    assert_eq!(sel.points().len(), 6);
}

#[test]
fn select_rejects_bad_index_lists() {
    let data = [1u8, 2];
    let sgm = segment_u8(&data, 2, 1, 0.0);
    assert!(
        matches!(sgm.select(&[]), Err(Error::InvalidArgument(_))),
        "empty list must be rejected"
    );
    assert!(
        matches!(sgm.select(&[2]), Err(Error::InvalidArgument(_))),
        "out-of-range index must be rejected"
    );
}

#[test]
fn from_raw_dispatches_numeric_and_rejects_colour() {
    let data = [1.5f64, 1.5, 8.0, 8.0];
    let buf = PixelBuffer::F64(&data);
    let sgm = Segmentation::from_raw(&buf, 0, 4, 1, 4, 0.0).expect("f64 path");
    assert_eq!(sgm.len(), 2);

    let rgb = [[0u8; 3]; 4];
    let err = Segmentation::from_raw(&PixelBuffer::Rgb(&rgb), 0, 4, 1, 4, 0.0);
    assert!(err.is_err(), "colour buffers must be rejected");
}

#[test]
fn from_raw_respects_offset_and_stride() {
    // 2x2 view carved out of a 4-wide buffer starting at (1,1).
    #[rustfmt::skip]
    let data = [
        9u8, 9, 9, 9,
        9, 5, 5, 9,
        9, 5, 5, 9,
    ];
    let buf = PixelBuffer::U8(&data);
    let sgm = Segmentation::from_raw(&buf, 5, 2, 2, 4, 0.0).expect("offset view");
    assert_eq!(sgm.len(), 1);
    assert_eq!(sgm.segments()[0].count, 4);
}
