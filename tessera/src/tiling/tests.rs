use crate::common::test_utils::solid_rgba;
use crate::common::Error;
use crate::tiling::{compute_grid, generate_tiles, Grid, TileCoord, TileRect, TileSet, TileSize};

const TILE: TileSize = TileSize {
    width: 100,
    height: 100,
};

// =============================================================================
// Grid derivation
// =============================================================================

#[test]
fn grid_for_600x400() {
    let grid = compute_grid(600, 400, TILE).unwrap();
    assert_eq!(grid, Grid { rows: 4, cols: 6 });
    assert_eq!(grid.tile_count(), 24);
}

#[test]
fn remainder_strip_is_dropped() {
    let grid = compute_grid(150, 100, TILE).unwrap();
    assert_eq!(grid, Grid { rows: 1, cols: 1 });

    let tiles = generate_tiles(grid, TILE).unwrap();
    assert_eq!(
        tiles.rects(),
        &[TileRect {
            row: 0,
            col: 0,
            left: 0,
            upper: 0,
            right: 100,
            lower: 100,
        }]
    );
}

#[test]
fn image_smaller_than_one_tile_is_too_small() {
    let err = compute_grid(90, 90, TILE).unwrap_err();
    assert!(matches!(
        err,
        Error::TooSmall {
            width: 90,
            height: 90,
            tile_width: 100,
            tile_height: 100,
        }
    ));
}

#[test]
fn too_small_in_one_dimension_is_enough_to_fail() {
    assert!(matches!(
        compute_grid(1000, 99, TILE),
        Err(Error::TooSmall { .. })
    ));
    assert!(matches!(
        compute_grid(99, 1000, TILE),
        Err(Error::TooSmall { .. })
    ));
    assert!(matches!(
        compute_grid(0, 0, TILE),
        Err(Error::TooSmall { .. })
    ));
}

#[test]
fn zero_tile_size_is_rejected() {
    assert!(matches!(
        compute_grid(100, 100, TileSize::new(0, 10)),
        Err(Error::InvalidTileSize { .. })
    ));
    assert!(matches!(
        generate_tiles(Grid { rows: 1, cols: 1 }, TileSize::new(10, 0)),
        Err(Error::InvalidTileSize { .. })
    ));
}

#[test]
fn grid_is_floor_division_for_non_square_tiles() {
    for (w, h, tw, th) in [
        (100, 100, 100, 100),
        (101, 399, 50, 40),
        (640, 480, 64, 48),
        (37, 1000, 7, 333),
        (1, 1, 1, 1),
    ] {
        let grid = compute_grid(w, h, TileSize::new(tw, th)).unwrap();
        assert_eq!(grid.cols, w / tw, "cols for {}x{} / {}x{}", w, h, tw, th);
        assert_eq!(grid.rows, h / th, "rows for {}x{} / {}x{}", w, h, tw, th);
    }
}

// =============================================================================
// Tile layout
// =============================================================================

#[test]
fn tiles_are_row_major_and_cover_disjoint_rects() {
    let size = TileSize::new(30, 20);
    let grid = compute_grid(100, 65, size).unwrap();
    let tiles = generate_tiles(grid, size).unwrap();

    assert_eq!(tiles.len(), (grid.rows * grid.cols) as usize);

    let coords: Vec<TileCoord> = tiles.iter().map(TileRect::coord).collect();
    let mut sorted = coords.clone();
    sorted.sort();
    assert_eq!(coords, sorted);

    for (i, a) in tiles.iter().enumerate() {
        assert_eq!(a.width(), 30);
        assert_eq!(a.height(), 20);
        assert!(a.right <= 100 && a.lower <= 65);
        for b in tiles.rects()[i + 1..].iter() {
            let overlap_x = a.left < b.right && b.left < a.right;
            let overlap_y = a.upper < b.lower && b.upper < a.lower;
            assert!(!(overlap_x && overlap_y), "{:?} overlaps {:?}", a, b);
        }
    }
}

#[test]
fn keys_for_600x400_span_0_0_to_3_5() {
    let tiles = TileSet::for_image(&solid_rgba(600, 400, [0, 0, 0, 255]), TILE).unwrap();
    let keys: Vec<String> = tiles.iter().map(|r| r.coord().to_string()).collect();

    assert_eq!(keys.len(), 24);
    assert_eq!(keys.first().map(String::as_str), Some("0,0"));
    assert_eq!(keys.last().map(String::as_str), Some("3,5"));
    assert_eq!(keys[6], "1,0");
}

#[test]
fn crop_yields_exact_tile_size() {
    let image = solid_rgba(250, 120, [10, 20, 30, 255]);
    let tiles = TileSet::for_image(&image, TILE).unwrap();

    for rect in &tiles {
        let tile = tiles.crop(&image, rect).unwrap();
        assert_eq!((tile.width(), tile.height()), (100, 100));
    }
}

#[test]
fn crop_outside_the_image_is_a_tile_extraction_error() {
    let image = solid_rgba(100, 100, [0, 0, 0, 255]);
    let tiles = generate_tiles(Grid { rows: 1, cols: 2 }, TILE).unwrap();

    let err = tiles.crop(&image, &tiles.rects()[1]).unwrap_err();
    assert!(matches!(err, Error::TileExtraction { row: 0, col: 1 }));
}

#[test]
fn grid_wider_than_u32_coordinates_is_rejected() {
    let err = generate_tiles(
        Grid {
            rows: 1,
            cols: 5_000_000,
        },
        TileSize::new(1000, 100),
    )
    .unwrap_err();

    assert!(matches!(
        err,
        Error::GridOverflow {
            rows: 1,
            cols: 5_000_000,
            tile_width: 1000,
            tile_height: 100,
        }
    ));
}

#[test]
fn grid_reaching_the_coordinate_limit_exactly_is_laid_out() {
    let size = TileSize::new(u32::MAX / 3, 1);
    let tiles = generate_tiles(Grid { rows: 1, cols: 3 }, size).unwrap();

    assert_eq!(tiles.rects()[2].right, u32::MAX);
}
