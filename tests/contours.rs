use image::{GrayImage, Luma};
use occupancy_mapper::contours::{detect_objects, find_external_contours, BoundingBox};

fn fill(mask: &mut GrayImage, x0: u32, y0: u32, x1: u32, y1: u32, value: u8) {
    for y in y0..=y1 {
        for x in x0..=x1 {
            mask.put_pixel(x, y, Luma([value]));
        }
    }
}

#[test]
fn empty_mask_has_no_objects() {
    let mask = GrayImage::new(32, 32);
    assert!(find_external_contours(&mask).is_empty());
    assert!(detect_objects(&mask, 0).is_empty());
}

#[test]
fn bounding_box_is_inclusive() {
    let mut mask = GrayImage::new(640, 480);
    fill(&mut mask, 300, 200, 340, 240, 255);
    let boxes = detect_objects(&mask, 0);
    assert_eq!(
        boxes,
        vec![BoundingBox {
            x: 300,
            y: 200,
            width: 41,
            height: 41
        }]
    );
    assert_eq!(boxes[0].center(), (320, 220));
}

#[test]
fn separate_blobs_give_separate_boxes() {
    let mut mask = GrayImage::new(40, 40);
    fill(&mut mask, 2, 2, 5, 5, 255);
    fill(&mut mask, 20, 25, 30, 28, 255);
    let mut boxes = detect_objects(&mask, 0);
    boxes.sort_by_key(|b| (b.x, b.y));
    assert_eq!(boxes.len(), 2);
    assert_eq!(boxes[1].width, 11);
    assert_eq!(boxes[1].height, 4);
}

#[test]
fn objects_inside_holes_are_not_external() {
    let mut mask = GrayImage::new(30, 30);
    fill(&mut mask, 5, 5, 24, 24, 255);
    fill(&mut mask, 8, 8, 21, 21, 0);
    fill(&mut mask, 14, 14, 15, 15, 255);
    let contours = find_external_contours(&mask);
    assert_eq!(contours.len(), 1);
    let bbox = contours[0].bounding_box().unwrap();
    assert_eq!((bbox.x, bbox.y, bbox.width, bbox.height), (5, 5, 20, 20));
}

#[test]
fn min_area_drops_small_boxes() {
    let mut mask = GrayImage::new(40, 40);
    fill(&mut mask, 1, 1, 1, 1, 255);
    fill(&mut mask, 10, 10, 19, 19, 255);
    let boxes = detect_objects(&mask, 4);
    assert_eq!(boxes.len(), 1);
    assert_eq!(boxes[0].area(), 100);
}

#[test]
fn center_rounds_down() {
    let bbox = BoundingBox {
        x: 3,
        y: 7,
        width: 5,
        height: 2,
    };
    assert_eq!(bbox.center(), (5, 8));
    assert_eq!(BoundingBox::from_points(Vec::new()), None);
}
