//! Integration tests for searching worlds stored as chunk files.
//!
//! Run with: `cargo test --test directory_world_integration`

use std::fs::{self, File};
use std::io::Write;
use std::path::Path;

use flate2::write::GzEncoder;
use flate2::Compression;
use tempfile::TempDir;

use blockseek::block::{BlockPattern, TargetVersion};
use blockseek::palette::PaletteScope;
use blockseek::scan::{BlockMatch, BlockSearch, ScanConfig, ScanMode};
use blockseek::translate::PassthroughTranslator;
use blockseek::world::{BlockVolume, ChunkPos, DirectoryWorld, DirectoryWorldConfig, WorldSource};

// ============================================================================
// Helper Functions
// ============================================================================

const HEIGHT: usize = 4;

/// Chunk JSON with `palette`, every voxel set to `fill` except the given
/// `(x, y, z, palette index)` voxels.
fn chunk_json(palette: &str, fill: u32, voxels: &[(usize, usize, usize, u32)]) -> String {
    let mut volume = BlockVolume::filled(HEIGHT, fill);
    for &(x, y, z, id) in voxels {
        volume.set(x, y, z, id);
    }
    let blocks: Vec<String> = volume.as_slice().iter().map(u32::to_string).collect();
    format!(
        r#"{{"height": {}, "palette": {}, "blocks": [{}]}}"#,
        HEIGHT,
        palette,
        blocks.join(",")
    )
}

fn write_plain(dir: &Path, name: &str, json: &str) {
    fs::create_dir_all(dir).unwrap();
    fs::write(dir.join(name), json).unwrap();
}

fn write_gzip(dir: &Path, name: &str, json: &str) {
    fs::create_dir_all(dir).unwrap();
    let mut encoder = GzEncoder::new(File::create(dir.join(name)).unwrap(), Compression::fast());
    encoder.write_all(json.as_bytes()).unwrap();
    encoder.finish().unwrap();
}

/// Overworld of three chunks whose local palettes list the same blocks in
/// different orders, plus a nether chunk and a corrupt chunk.
fn build_world(root: &Path) {
    let overworld = root.join("overworld");
    write_plain(
        &overworld,
        "c.0.0.json",
        &chunk_json(
            r#"[{"name": "air"}, {"name": "minecraft:furnace", "properties": {"lit": false, "facing": "north"}}]"#,
            0,
            &[(1, 2, 3, 1)],
        ),
    );
    write_gzip(
        &overworld,
        "c.1.0.json.gz",
        &chunk_json(
            r#"[{"name": "minecraft:furnace", "properties": {"lit": true, "facing": "east"}}, {"name": "air"}]"#,
            1,
            &[(0, 0, 0, 0)],
        ),
    );
    write_plain(
        &overworld,
        "c.-1.-1.json",
        &chunk_json(
            r#"[{"name": "air"}, {"name": "stone"}, {"name": "furnace", "properties": {"lit": false, "facing": "north"}}]"#,
            0,
            &[(15, 3, 15, 2), (0, 0, 0, 1)],
        ),
    );
    write_plain(&overworld, "c.7.7.json", "{ truncated");
    write_plain(
        &root.join("the_nether"),
        "c.0.0.json",
        &chunk_json(
            r#"[{"name": "netherrack"}, {"name": "furnace", "properties": {"lit": true, "facing": "south"}}]"#,
            0,
            &[(4, 1, 9, 1)],
        ),
    );
}

fn search(root: &Path, text: &str, config: ScanConfig) -> (Vec<BlockMatch>, DirectoryWorld) {
    let mut world = DirectoryWorld::open(root, DirectoryWorldConfig::default()).unwrap();
    let pattern = BlockPattern::parse(text, TargetVersion::universal()).unwrap();
    let mut search = BlockSearch::new(&mut world, &PassthroughTranslator, pattern, config).unwrap();
    for step in search.by_ref() {
        step.unwrap();
    }
    let matches = search.into_matches().unwrap();
    (matches, world)
}

// ============================================================================
// Integration Tests
// ============================================================================

#[test]
fn test_finds_furnaces_across_chunk_files() {
    let temp = TempDir::new().unwrap();
    build_world(temp.path());

    let (matches, world) = search(temp.path(), "furnace[lit=*,facing=*]", ScanConfig::default());

    // chunk files are visited in (cx, cz) order per dimension
    assert_eq!(
        matches,
        vec![
            BlockMatch::new(-1, 3, -1, "overworld"),
            BlockMatch::new(1, 2, 3, "overworld"),
            BlockMatch::new(16, 0, 0, "overworld"),
            BlockMatch::new(4, 1, 9, "the_nether"),
        ]
    );
    assert_eq!(world.palette().scope(), &PaletteScope::World);
}

#[test]
fn test_typed_properties_match_canonical_values() {
    let temp = TempDir::new().unwrap();
    build_world(temp.path());

    let (lit, _) = search(temp.path(), "furnace[lit=true]", ScanConfig::default());
    assert_eq!(
        lit,
        vec![
            BlockMatch::new(16, 0, 0, "overworld"),
            BlockMatch::new(4, 1, 9, "the_nether"),
        ]
    );

    let (unlit_north, _) = search(
        temp.path(),
        "minecraft:furnace[lit=false,facing=north]",
        ScanConfig::default(),
    );
    assert_eq!(unlit_north.len(), 2);
}

#[test]
fn test_world_palette_grows_while_scanning() {
    let temp = TempDir::new().unwrap();
    build_world(temp.path());

    let (_, world) = search(temp.path(), "stone", ScanConfig::default());
    // air, stone, unlit north furnace, lit east furnace, netherrack, lit south furnace
    assert_eq!(world.palette().len(), 6);
}

#[test]
fn test_cache_release_keeps_results_stable() {
    let temp = TempDir::new().unwrap();
    build_world(temp.path());

    let (kept, _) = search(temp.path(), "furnace", ScanConfig::default().with_release_interval(0));
    let (released, _) = search(temp.path(), "furnace", ScanConfig::default().with_release_interval(1));
    let (brute, _) = search(
        temp.path(),
        "furnace",
        ScanConfig::default().with_mode(ScanMode::BruteForce),
    );

    assert_eq!(kept, released);
    assert_eq!(kept, brute);
}

#[test]
fn test_corrupt_chunk_is_skipped() {
    let temp = TempDir::new().unwrap();
    build_world(temp.path());

    let mut world = DirectoryWorld::open(temp.path(), DirectoryWorldConfig::default()).unwrap();
    let pattern = BlockPattern::parse("stone", TargetVersion::universal()).unwrap();
    let steps = BlockSearch::new(&mut world, &PassthroughTranslator, pattern, ScanConfig::default()).unwrap();

    let done: Vec<usize> = steps.map(|step| step.unwrap().chunks_done).collect();
    assert_eq!(done, vec![1, 2, 3, 4, 5]);
    assert!(world
        .all_chunk_coords("overworld")
        .unwrap()
        .contains(&ChunkPos::new(7, 7)));
}

#[test]
fn test_oversized_chunk_height_counts_as_empty() {
    let temp = TempDir::new().unwrap();
    let overworld = temp.path().join("overworld");
    write_plain(
        &overworld,
        "c.0.0.json",
        r#"{"height": 1000000000000000, "palette": [{"name": "air"}], "blocks": [0]}"#,
    );
    write_plain(
        &overworld,
        "c.1.0.json",
        &chunk_json(r#"[{"name": "air"}, {"name": "stone"}]"#, 0, &[(2, 3, 4, 1)]),
    );

    let (matches, world) = search(temp.path(), "stone", ScanConfig::default());
    assert_eq!(matches, vec![BlockMatch::new(18, 3, 4, "overworld")]);
    assert_eq!(world.all_chunk_coords("overworld").unwrap().len(), 2);
}

#[test]
fn test_far_chunk_file_is_skipped() {
    let temp = TempDir::new().unwrap();
    let overworld = temp.path().join("overworld");
    let stone = chunk_json(r#"[{"name": "air"}, {"name": "stone"}]"#, 0, &[(0, 0, 0, 1)]);
    write_plain(&overworld, "c.200000000.0.json", &stone);
    write_plain(&overworld, "c.0.0.json", &stone);

    let (matches, world) = search(temp.path(), "stone", ScanConfig::default());
    assert_eq!(matches, vec![BlockMatch::new(0, 0, 0, "overworld")]);
    assert_eq!(
        world.all_chunk_coords("overworld").unwrap(),
        vec![ChunkPos::new(0, 0)]
    );
}
