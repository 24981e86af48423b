use std::io;
use std::path::{Path, PathBuf};

use crate::common::test_utils::{png_data_url, rgba_from_fn, solid_rgba};
use crate::common::{Error, Result, StatusClass};
use crate::gray::FALLBACK_GRAY;
use crate::image::Image;
use crate::pipeline::{reduce_in_memory, Pipeline};
use crate::storage::{FsTileStore, StorageLayout, SubmissionIds, TileStore};
use crate::tiling::{Grid, TileCoord, TileSet, TileSize};

fn fs_pipeline(root: &Path) -> Pipeline {
    Pipeline::open(StorageLayout::new(root), TileSize::default()).unwrap()
}

/// Delegates to the filesystem but fails on selected paths.
struct FaultyStore {
    fail_load: Option<PathBuf>,
    fail_store: Option<PathBuf>,
}

impl TileStore for FaultyStore {
    fn store(&self, image: &Image, path: &Path) -> Result<()> {
        if self.fail_store.as_deref() == Some(path) {
            return Err(io::Error::other("disk full").into());
        }
        FsTileStore.store(image, path)
    }

    fn load(&self, path: &Path) -> Result<Image> {
        if self.fail_load.as_deref() == Some(path) {
            return Err(io::Error::other("corrupt tile").into());
        }
        FsTileStore.load(path)
    }

    fn create_dir(&self, path: &Path) -> Result<()> {
        FsTileStore.create_dir(path)
    }
}

fn faulty_pipeline(root: &Path, store: FaultyStore) -> Pipeline<FaultyStore> {
    Pipeline::with_store(
        StorageLayout::new(root),
        TileSize::default(),
        SubmissionIds::starting_at(0),
        store,
    )
}

/// Left half black, right half white, split on a tile boundary.
fn half_black_half_white(width: u32, height: u32) -> Image {
    rgba_from_fn(width, height, |x, _| {
        if x < width / 2 {
            [0, 0, 0, 255]
        } else {
            [255, 255, 255, 255]
        }
    })
}

// =============================================================================
// Happy path
// =============================================================================

#[test]
fn processes_600x400_into_24_tiles() {
    let root = tempfile::tempdir().unwrap();
    let pipeline = fs_pipeline(root.path());

    let report = pipeline
        .process_image(&half_black_half_white(600, 400))
        .unwrap();

    assert_eq!(report.image_id, 0);
    assert_eq!(report.grid, Grid { rows: 4, cols: 6 });
    assert_eq!(report.tile_gray_averages.len(), 24);
    assert_eq!(report.message, "Successfully processed image into 24 tiles");

    for row in 0..4 {
        for col in 0..6 {
            let expected = if col < 3 { 0 } else { 255 };
            assert_eq!(
                report.tile_gray_averages.get(TileCoord::new(row, col)),
                Some(expected)
            );
            assert!(pipeline
                .layout()
                .tile_path(0, TileCoord::new(row, col))
                .is_file());
        }
    }
    assert!(report.full_image_path.is_file());
    assert_eq!(report.tile_dir, root.path().join("tiles").join("img0"));
}

#[test]
fn remainder_strip_is_not_persisted() {
    let root = tempfile::tempdir().unwrap();
    let pipeline = fs_pipeline(root.path());

    let report = pipeline
        .process_image(&solid_rgba(150, 100, [60, 60, 60, 255]))
        .unwrap();

    assert_eq!(report.grid, Grid { rows: 1, cols: 1 });
    assert_eq!(report.tile_gray_averages.get(TileCoord::new(0, 0)), Some(60));

    let files = std::fs::read_dir(&report.tile_dir).unwrap().count();
    assert_eq!(files, 1);

    let tile = Image::read_file(pipeline.layout().tile_path(0, TileCoord::new(0, 0))).unwrap();
    assert_eq!((tile.width(), tile.height()), (100, 100));
}

#[test]
fn successive_submissions_get_new_ids() {
    let root = tempfile::tempdir().unwrap();
    let pipeline = fs_pipeline(root.path());
    let image = solid_rgba(100, 100, [0, 0, 0, 255]);

    assert_eq!(pipeline.process_image(&image).unwrap().image_id, 0);
    assert_eq!(pipeline.process_image(&image).unwrap().image_id, 1);

    // A restarted pipeline continues numbering after what is on disk.
    let reopened = fs_pipeline(root.path());
    assert_eq!(reopened.process_image(&image).unwrap().image_id, 2);
}

#[test]
fn identical_input_gives_identical_values() {
    let root = tempfile::tempdir().unwrap();
    let pipeline = fs_pipeline(root.path());
    let image = rgba_from_fn(320, 210, |x, y| {
        [(x * 7 % 256) as u8, (y * 3 % 256) as u8, ((x + y) % 256) as u8, 255]
    });
    let body = serde_json::to_vec(&serde_json::json!({ "drawing": png_data_url(&image) })).unwrap();

    let first = pipeline.process_request(&body).unwrap();
    let second = pipeline.process_request(&body).unwrap();

    assert_ne!(first.image_id, second.image_id);
    assert_ne!(first.tile_dir, second.tile_dir);
    assert_eq!(first.tile_gray_averages, second.tile_gray_averages);

    let tiles = TileSet::for_image(&image, TileSize::default()).unwrap();
    assert_eq!(
        reduce_in_memory(&image, &tiles).unwrap(),
        first.tile_gray_averages
    );
}

#[test]
fn report_serializes_like_the_http_response() {
    let root = tempfile::tempdir().unwrap();
    let pipeline = fs_pipeline(root.path());

    let report = pipeline
        .process_image(&solid_rgba(200, 100, [255, 255, 255, 255]))
        .unwrap();
    let json = serde_json::to_value(&report).unwrap();

    assert_eq!(json["image_id"], 0);
    assert_eq!(json["tile_size"], serde_json::json!({"width": 100, "height": 100}));
    assert_eq!(json["image_size"], serde_json::json!({"width": 200, "height": 100}));
    assert_eq!(json["grid"], serde_json::json!({"rows": 1, "cols": 2}));
    assert_eq!(
        json["tile_gray_averages"],
        serde_json::json!({"0,0": 255, "0,1": 255})
    );
    assert!(json["full_image_path"]
        .as_str()
        .unwrap()
        .ends_with("drawing_0.png"));
}

// =============================================================================
// Failures
// =============================================================================

#[test]
fn too_small_image_persists_nothing() {
    let root = tempfile::tempdir().unwrap();
    let pipeline = fs_pipeline(root.path());

    let err = pipeline
        .process_image(&solid_rgba(90, 90, [0, 0, 0, 255]))
        .unwrap_err();

    assert!(matches!(
        err,
        Error::TooSmall {
            width: 90,
            height: 90,
            tile_width: 100,
            tile_height: 100,
        }
    ));
    assert_eq!(err.status(), StatusClass::Client);
    assert_eq!(std::fs::read_dir(root.path()).unwrap().count(), 0);
}

#[test]
fn invalid_request_never_reaches_storage() {
    let root = tempfile::tempdir().unwrap();
    let pipeline = fs_pipeline(root.path());

    let err = pipeline.process_request(b"{\"drawing\": \"nope\"}").unwrap_err();

    assert!(matches!(err, Error::Validation(_)));
    assert_eq!(std::fs::read_dir(root.path()).unwrap().count(), 0);
}

#[test]
fn failed_reduction_falls_back_to_mid_gray() {
    let root = tempfile::tempdir().unwrap();
    let layout = StorageLayout::new(root.path());
    let broken = layout.tile_path(0, TileCoord::new(1, 2));
    let pipeline = faulty_pipeline(
        root.path(),
        FaultyStore {
            fail_load: Some(broken),
            fail_store: None,
        },
    );

    let report = pipeline
        .process_image(&solid_rgba(300, 200, [0, 0, 0, 255]))
        .unwrap();

    assert_eq!(report.tile_gray_averages.len(), 6);
    for (coord, value) in report.tile_gray_averages.iter() {
        if coord == TileCoord::new(1, 2) {
            assert_eq!(value, FALLBACK_GRAY);
        } else {
            assert_eq!(value, 0);
        }
    }
}

#[test]
fn failed_tile_write_aborts_the_submission() {
    let root = tempfile::tempdir().unwrap();
    let layout = StorageLayout::new(root.path());
    let pipeline = faulty_pipeline(
        root.path(),
        FaultyStore {
            fail_load: None,
            fail_store: Some(layout.tile_path(0, TileCoord::new(0, 1))),
        },
    );

    let err = pipeline
        .process_image(&solid_rgba(300, 100, [0, 0, 0, 255]))
        .unwrap_err();

    assert_eq!(err.to_string(), "Failed to create tile at position (0,1)");
    assert_eq!(err.status(), StatusClass::Server);
    assert!(!layout.tile_path(0, TileCoord::new(0, 2)).exists());
}

#[test]
fn failed_full_image_write_is_a_storage_error() {
    let root = tempfile::tempdir().unwrap();
    let layout = StorageLayout::new(root.path());
    let pipeline = faulty_pipeline(
        root.path(),
        FaultyStore {
            fail_load: None,
            fail_store: Some(layout.full_image_path(0)),
        },
    );

    let err = pipeline
        .process_image(&solid_rgba(100, 100, [0, 0, 0, 255]))
        .unwrap_err();

    assert_eq!(err.to_string(), "Failed to save image");
    assert!(!layout.tile_path(0, TileCoord::new(0, 0)).exists());
}
