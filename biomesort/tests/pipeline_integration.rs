//! End-to-end sorting against Anvil worlds on disk.

mod common;

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use biomesort::pipeline::{sort_screenshots, PipelineConfig, SortError};
use biomesort::resolver::{Classification, Resolver};
use biomesort::session::{SessionConfig, SessionError, WorldSession};
use biomesort::store::{AnvilOpener, Dimension};
use common::{touch, write_world, Chunk, DESERT, FOREST, NETHER, PLAINS};
use tempfile::TempDir;

struct Layout {
    temp: TempDir,
}

impl Layout {
    fn new() -> Self {
        Self {
            temp: TempDir::new().unwrap(),
        }
    }

    fn world(&self) -> PathBuf {
        self.temp.path().join("world")
    }

    fn src(&self) -> PathBuf {
        self.temp.path().join("src")
    }

    fn out(&self) -> PathBuf {
        self.temp.path().join("out")
    }
}

fn mtimes(root: &Path) -> BTreeMap<PathBuf, SystemTime> {
    let mut times = BTreeMap::new();
    let mut stack = vec![root.to_path_buf()];
    while let Some(dir) = stack.pop() {
        for entry in fs::read_dir(&dir).unwrap() {
            let entry = entry.unwrap();
            let meta = entry.metadata().unwrap();
            if meta.is_dir() {
                stack.push(entry.path());
            } else {
                times.insert(entry.path(), meta.modified().unwrap());
            }
        }
    }
    times
}

#[test]
fn test_sorts_screenshots_by_biome() {
    let layout = Layout::new();
    // chunk (6, 6) covers x, z in 96..112
    write_world(&layout.world(), "region", &[Chunk::uniform(6, 6, PLAINS)]);
    touch(&layout.src(), "100_100_1.png");
    touch(&layout.src(), "9999999_9999999_2.png");
    touch(&layout.src(), "notvalid.png");

    let summary = sort_screenshots(
        &layout.world(),
        &SessionConfig::default(),
        PipelineConfig::new(layout.src(), layout.out()),
        &AnvilOpener,
        None,
    )
    .unwrap();

    assert_eq!(summary.moved, 1);
    assert_eq!(summary.skipped_name, 1);
    assert_eq!(summary.skipped_no_data, 1);
    assert_eq!(summary.failed_placement, 0);
    assert_eq!(summary.lookup_failures, 0);
    assert!(layout.out().join("plains/1.png").is_file());
    assert!(!layout.src().join("100_100_1.png").exists());
    assert!(layout.src().join("9999999_9999999_2.png").is_file());
    assert!(layout.src().join("notvalid.png").is_file());
}

#[test]
fn test_negative_coordinates_use_floor_cells() {
    let layout = Layout::new();
    write_world(
        &layout.world(),
        "region",
        &[
            Chunk::uniform(-1, -1, DESERT),
            Chunk::uniform(0, 0, PLAINS),
            // region r.-2.-2
            Chunk::uniform(-33, -40, FOREST),
        ],
    );
    touch(&layout.src(), "-1_-1_a.png");
    touch(&layout.src(), "0_0_b.png");
    touch(&layout.src(), "-520_-630_c.png");

    let summary = sort_screenshots(
        &layout.world(),
        &SessionConfig::default().with_snapshot(false),
        PipelineConfig::new(layout.src(), layout.out()),
        &AnvilOpener,
        None,
    )
    .unwrap();

    assert_eq!(summary.moved, 3);
    assert!(layout.out().join("desert/a.png").is_file());
    assert!(layout.out().join("plains/b.png").is_file());
    assert!(layout.out().join("forest/c.png").is_file());
}

#[test]
fn test_existing_names_are_never_overwritten() {
    let layout = Layout::new();
    write_world(&layout.world(), "region", &[Chunk::uniform(0, 0, PLAINS)]);
    fs::create_dir_all(layout.out().join("plains")).unwrap();
    fs::write(layout.out().join("plains/42.png"), b"keep me").unwrap();
    touch(&layout.src(), "1_1_42.png");
    touch(&layout.src(), "2_2_42.png");

    let summary = sort_screenshots(
        &layout.world(),
        &SessionConfig::default(),
        PipelineConfig::new(layout.src(), layout.out()),
        &AnvilOpener,
        None,
    )
    .unwrap();

    assert_eq!(summary.moved, 2);
    assert_eq!(
        fs::read(layout.out().join("plains/42.png")).unwrap(),
        b"keep me"
    );
    assert!(layout.out().join("plains/42_1.png").is_file());
    assert!(layout.out().join("plains/42_2.png").is_file());
}

#[test]
fn test_dry_run_reports_without_moving() {
    let layout = Layout::new();
    write_world(&layout.world(), "region", &[Chunk::uniform(0, 0, PLAINS)]);
    touch(&layout.src(), "1_1_7.png");
    touch(&layout.src(), "2_2_7.png");

    let summary = sort_screenshots(
        &layout.world(),
        &SessionConfig::default(),
        PipelineConfig::new(layout.src(), layout.out()).with_dry_run(true),
        &AnvilOpener,
        None,
    )
    .unwrap();

    assert_eq!(summary.dry_run, 2);
    assert_eq!(summary.moved, 0);
    assert!(!layout.out().exists());
    assert!(layout.src().join("1_1_7.png").is_file());
    assert!(layout.src().join("2_2_7.png").is_file());
}

#[test]
fn test_snapshot_leaves_world_untouched_and_is_removed() {
    let layout = Layout::new();
    write_world(&layout.world(), "region", &[Chunk::uniform(0, 0, PLAINS)]);
    let before = mtimes(&layout.world());

    let session =
        WorldSession::open(&layout.world(), &SessionConfig::default(), &AnvilOpener).unwrap();
    let copy = session.world_path().to_path_buf();
    assert_ne!(copy, layout.world());
    assert_eq!(
        Resolver::new(&session).resolve(3, 3),
        Classification::Named("minecraft:plains".to_string())
    );
    session.close().unwrap();

    assert!(!copy.exists());
    assert_eq!(mtimes(&layout.world()), before);
}

#[test]
fn test_quarter_resolution_chunks_resolve() {
    let layout = Layout::new();
    // 1.15 volumetric layout: the bottom 4x4 layer comes first
    let mut biomes = vec![PLAINS; 1024];
    biomes[3] = DESERT; // quarter (3, 0): x offsets 12..16, z offsets 0..4
    write_world(&layout.world(), "region", &[Chunk { x: 0, z: 0, biomes }]);

    let config = SessionConfig::default().with_snapshot(false);
    let session = WorldSession::open(&layout.world(), &config, &AnvilOpener).unwrap();
    let resolver = Resolver::new(&session);

    assert_eq!(resolver.resolve(13, 2).name(), Some("minecraft:desert"));
    assert_eq!(resolver.resolve(11, 2).name(), Some("minecraft:plains"));
    assert_eq!(resolver.resolve(13, 4).name(), Some("minecraft:plains"));
}

#[test]
fn test_nether_dimension_reads_its_own_regions() {
    let layout = Layout::new();
    write_world(&layout.world(), "region", &[Chunk::uniform(0, 0, PLAINS)]);
    write_world(
        &layout.world(),
        "DIM-1/region",
        &[Chunk::uniform(0, 0, NETHER)],
    );
    touch(&layout.src(), "5_5_n.png");

    let summary = sort_screenshots(
        &layout.world(),
        &SessionConfig::default().with_dimension(Dimension::Nether),
        PipelineConfig::new(layout.src(), layout.out()),
        &AnvilOpener,
        None,
    )
    .unwrap();

    assert_eq!(summary.moved, 1);
    assert!(layout.out().join("nether/n.png").is_file());
}

#[test]
fn test_world_without_level_dat_fails_to_open() {
    let layout = Layout::new();
    fs::create_dir_all(layout.world().join("region")).unwrap();

    let err = sort_screenshots(
        &layout.world(),
        &SessionConfig::default(),
        PipelineConfig::new(layout.src(), layout.out()),
        &AnvilOpener,
        None,
    )
    .unwrap_err();

    assert!(matches!(err, SortError::Session(SessionError::Open(_))));
}

#[test]
fn test_cache_disabled_gives_same_results() {
    let layout = Layout::new();
    write_world(
        &layout.world(),
        "region",
        &[Chunk::uniform(0, 0, PLAINS), Chunk::uniform(1, 0, DESERT)],
    );
    for (i, x) in [1, 17, 2, 18, 3].iter().enumerate() {
        touch(&layout.src(), &format!("{}_1_{}.png", x, i));
    }

    let summary = sort_screenshots(
        &layout.world(),
        &SessionConfig::default()
            .with_cache_capacity(0)
            .with_snapshot(false),
        PipelineConfig::new(layout.src(), layout.out()),
        &AnvilOpener,
        None,
    )
    .unwrap();

    assert_eq!(summary.moved, 5);
    assert_eq!(fs::read_dir(layout.out().join("plains")).unwrap().count(), 3);
    assert_eq!(fs::read_dir(layout.out().join("desert")).unwrap().count(), 2);
}
