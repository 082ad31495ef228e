// Writes a small sample field map for the `field` demo.
//
//   cargo run --example make_map -- assets/field.cmft

use anyhow::Context;
use cmft_field::{load_map, write_map, Map, ZoneProps};
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;
use tracing::info;
use tracing_subscriber::EnvFilter;

const WIDTH: u16 = 30;
const HEIGHT: u16 = 20;

fn build() -> anyhow::Result<Map> {
    // layer 0: ground (tag 1, sprites walk on it)
    // layer 1: tree tops drawn over sprites
    let mut map = Map::new(WIDTH, HEIGHT, 1, 1)?;
    map.set_layer_tag(0, 1)?;
    map.set_zone_properties(
        1,
        ZoneProps(
            ZoneProps::BLOCK_NORTH
                | ZoneProps::BLOCK_EAST
                | ZoneProps::BLOCK_SOUTH
                | ZoneProps::BLOCK_WEST,
        ),
    )?;

    for y in 0..HEIGHT as usize {
        for x in 0..WIDTH as usize {
            let edge = x == 0 || y == 0 || x == WIDTH as usize - 1 || y == HEIGHT as usize - 1;
            map.set_tile_value(0, x, y, if edge { 2 } else { 1 + ((x * 7 + y * 3) % 3) as u16 })?;
            if edge {
                map.set_tile_zone(0, x, y, 1)?;
                map.set_tile_value(1, x, y, 5)?;
            }
        }
    }
    Ok(map)
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,cmft_field=debug")),
        )
        .init();

    let out = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "assets/field.cmft".to_owned());
    let out = Path::new(&out);
    if let Some(dir) = out.parent().filter(|d| !d.as_os_str().is_empty()) {
        fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;
    }

    let map = build()?;
    let file = File::create(out).with_context(|| format!("creating {}", out.display()))?;
    let mut w = BufWriter::new(file);
    write_map(&map, &mut w).context("writing map")?;
    w.flush()?;

    // read it back so a broken encoder shows up here, not in the demo
    let back = load_map(out)?;
    anyhow::ensure!(back == map, "map read back differs from the one written");
    info!(path = %out.display(), width = WIDTH, height = HEIGHT, "map written");
    Ok(())
}
