use occupancy_mapper::config::GridConfig;
use occupancy_mapper::projection::Projection;
use occupancy_mapper::{Cell, OccupancyGrid};

#[test]
fn projection_scales_image_onto_room() {
    let grid = OccupancyGrid::new(&GridConfig::default());
    let projection = Projection::new(640, 480, &GridConfig::default());
    assert_eq!(projection.to_room(0, 0), (0.0, 0.0));
    assert_eq!(projection.to_room(320, 240), (5.0, 5.0));
    assert_eq!(
        projection.cell_for(&grid, 639, 479),
        Some(Cell { row: 99, col: 99 })
    );
    assert_eq!(projection.cell_for(&grid, 640, 0), None);
}

#[test]
fn boundary_pixels_start_their_own_cell() {
    let grid = OccupancyGrid::new(&GridConfig::default());
    let projection = Projection::new(100, 100, &GridConfig::default());
    assert_eq!(projection.cell_for(&grid, 43, 0), Some(Cell { row: 0, col: 43 }));
    assert_eq!(projection.cell_for(&grid, 0, 43), Some(Cell { row: 43, col: 0 }));
}

#[test]
fn every_pixel_maps_monotonically() {
    let cfg = GridConfig::default();
    let grid = OccupancyGrid::new(&cfg);
    for width in [100u32, 1000] {
        let projection = Projection::new(width, width, &cfg);
        let mut previous = 0;
        for px in 0..width {
            let cell = projection.cell_for(&grid, px, 0).unwrap();
            let expected = px as usize * grid.cols() / width as usize;
            assert_eq!(cell.col, expected, "width {width}, pixel {px}");
            assert!(cell.col >= previous);
            previous = cell.col;
        }
        assert_eq!(previous, grid.cols() - 1);
    }
}

#[test]
fn every_cell_is_reachable_at_one_pixel_per_cell() {
    let grid = OccupancyGrid::new(&GridConfig::default());
    let projection = Projection::new(100, 100, &GridConfig::default());
    for px in 0..100 {
        let cell = projection.cell_for(&grid, px, px).unwrap();
        assert_eq!((cell.row, cell.col), (px as usize, px as usize));
    }
}
