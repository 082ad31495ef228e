// tests/load_tests.rs

use anyhow::Context;
use cmft_field::{load_map, write_map, Map, MapError, ZoneProps, MAP_VERSION};
use std::fs;
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

fn temp_dir() -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("clock went backwards")
        .as_nanos();
    let dir = std::env::temp_dir().join(format!("cmft_load_{nanos}"));
    fs::create_dir_all(&dir).expect("failed to create temp dir");
    dir
}

fn field_map() -> Map {
    let mut map = Map::new(5, 3, 2, 3).expect("map");
    map.set_layer_tag(1, 1).expect("tag");
    map.set_layer_tag(2, 2).expect("tag");
    for y in 0..3 {
        for x in 0..5 {
            map.set_tile_value(0, x, y, 1 + (x + y) as u16 % 4).expect("ground");
            map.set_tile_zone(0, x, y, if x == 4 { 3 } else { 0 }).expect("zone");
        }
    }
    map.set_tile_value(2, 1, 2, 17).expect("roof");
    map.set_zone_properties(3, ZoneProps(ZoneProps::BLOCK_EAST | ZoneProps::BLOCK_WEST))
        .expect("props");
    map
}

#[test]
fn round_trip_through_a_file() -> anyhow::Result<()> {
    let dir = temp_dir();
    let path = dir.join("field.cmft");
    let map = field_map();

    let mut file = fs::File::create(&path)?;
    write_map(&map, &mut file).context("writing map")?;
    drop(file);

    let back = load_map(&path).context("loading map")?;
    assert_eq!(back.width(), map.width());
    assert_eq!(back.height(), map.height());
    for (a, b) in back.layers().iter().zip(map.layers()) {
        assert_eq!(a.tag(), b.tag());
        assert_eq!(a.values(), b.values());
        assert_eq!(a.zones(), b.zones());
    }
    for zone in 0..map.num_zones() {
        assert_eq!(back.zone_properties(zone), map.zone_properties(zone));
    }
    assert_eq!(back.tile_value(2, 1, 2), Some(17));
    assert_eq!(back.max_tag(), 2);

    fs::remove_dir_all(&dir)?;
    Ok(())
}

#[test]
fn version_mismatch_from_disk_is_fatal() {
    let dir = temp_dir();
    let path = dir.join("future.cmft");
    let mut bytes = cmft_field::encode_map(&field_map());
    let vers = bytes
        .windows(4)
        .position(|w| w == b"VERS")
        .expect("VERS present");
    bytes[vers + 8..vers + 10].copy_from_slice(&(MAP_VERSION + 1).to_be_bytes());
    fs::write(&path, bytes).expect("write");

    match load_map(&path) {
        Err(MapError::UnsupportedVersion { found, expected }) => {
            assert_eq!(found, MAP_VERSION + 1);
            assert_eq!(expected, MAP_VERSION);
        }
        other => panic!("expected UnsupportedVersion, got {:?}", other),
    }
    fs::remove_dir_all(&dir).expect("cleanup");
}

#[test]
fn non_iff_file_is_rejected() {
    let dir = temp_dir();
    let path = dir.join("map.json");
    fs::write(&path, br#"{ "width": 1 }"#).expect("write");

    let err = load_map(&path).unwrap_err();
    assert!(matches!(err, MapError::BadMagic { expected: "FORM", .. }));
    assert!(err.to_string().contains("FORM"));
    fs::remove_dir_all(&dir).expect("cleanup");
}
