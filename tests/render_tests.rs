// tests/render_tests.rs

use cmft_field::backend::recording::{GfxCall, RecordingGraphics};
use cmft_field::{Graphics, Map, MapView, ObjectImage, ObjectRegistry, RenderSettings};

fn two_by_two() -> Map {
    let mut map = Map::new(2, 2, 0, 0).expect("map");
    map.set_layer_tag(0, 1).expect("tag");
    map.set_tile_value(0, 0, 0, 1).expect("value");
    map.set_tile_value(0, 1, 1, 1).expect("value");
    map
}

fn sprite(filename: &str, y: i32, height: u16) -> ObjectImage {
    ObjectImage {
        filename: filename.into(),
        image_x: 0,
        image_y: 0,
        map_x: 0,
        map_y: y,
        width: 32,
        height,
    }
}

#[test]
fn two_tiles_one_sprite() {
    let map = two_by_two();
    assert_eq!(map.layer(0).expect("layer").values(), &[1, 0, 0, 1]);

    let mut view = MapView::new(map, RenderSettings::default()).expect("view");
    let mut objects = ObjectRegistry::new();
    let (backend, log) = RecordingGraphics::new();
    let mut gfx = Graphics::new(Box::new(backend));

    let hero = objects.add("hero", "hero.py").expect("add");
    objects.set_image(hero, sprite("hero.png", 0, 32)).expect("image");
    objects.set_tag(hero, 1).expect("tag");

    let stats = view.render_map(&mut objects, &mut gfx);

    assert_eq!(stats.tiles, 2);
    assert_eq!(stats.sprites, 1);
    assert_eq!(view.queued(1), 0);
    assert_eq!(view.dirty_len(), 0);
    assert!(!objects.get(hero).expect("hero").is_dirty());

    let draws = log.draws();
    let names: Vec<&str> = draws.iter().map(|(n, _)| n.as_str()).collect();
    assert_eq!(names, vec!["tiles.png", "tiles.png", "hero.png"]);
    assert_eq!((draws[1].1.dst_x, draws[1].1.dst_y), (32, 32));
    assert_eq!(log.count(|c| matches!(c, GfxCall::UpdateRect { .. })), 1);
}

#[test]
fn lower_sprites_paint_later() {
    let mut view = MapView::new(two_by_two(), RenderSettings::default()).expect("view");
    let mut objects = ObjectRegistry::new();
    let (backend, log) = RecordingGraphics::new();
    let mut gfx = Graphics::new(Box::new(backend));

    // Registered back-to-front so arena order cannot explain the result.
    let back = objects.add("back", "b.py").expect("add");
    objects.set_image(back, sprite("back.png", 10, 10)).expect("image");
    objects.set_tag(back, 1).expect("tag");
    let front = objects.add("front", "f.py").expect("add");
    objects.set_image(front, sprite("front.png", 4, 6)).expect("image");
    objects.set_tag(front, 1).expect("tag");

    view.render_map(&mut objects, &mut gfx);

    let sprites: Vec<String> = log
        .draws()
        .into_iter()
        .map(|(n, _)| n)
        .filter(|n| n != "tiles.png")
        .collect();
    assert_eq!(sprites, vec!["front.png", "back.png"]);
}

#[test]
fn sprites_sit_between_their_layer_and_the_next() {
    let mut map = Map::new(1, 1, 1, 0).expect("map");
    map.set_layer_tag(0, 1).expect("tag");
    map.set_tile_value(0, 0, 0, 1).expect("ground");
    map.set_tile_value(1, 0, 0, 2).expect("roof");

    let mut view = MapView::new(map, RenderSettings::default()).expect("view");
    let mut objects = ObjectRegistry::new();
    let (backend, log) = RecordingGraphics::new();
    let mut gfx = Graphics::new(Box::new(backend));

    let id = objects.add("hero", "hero.py").expect("add");
    objects.set_image(id, sprite("hero.png", 0, 32)).expect("image");
    objects.set_tag(id, 1).expect("tag");

    view.render_map(&mut objects, &mut gfx);

    let draws = log.draws();
    let order: Vec<(&str, i16)> = draws.iter().map(|(n, b)| (n.as_str(), b.src_x)).collect();
    assert_eq!(order, vec![("tiles.png", 32), ("hero.png", 0), ("tiles.png", 64)]);
}

#[test]
fn objects_outside_damage_are_left_alone() {
    let mut map = Map::new(4, 4, 0, 0).expect("map");
    map.set_layer_tag(0, 1).expect("tag");
    let mut view = MapView::new(map, RenderSettings::default()).expect("view");
    let mut objects = ObjectRegistry::new();
    let (backend, log) = RecordingGraphics::new();
    let mut gfx = Graphics::new(Box::new(backend));

    let id = objects.add("far", "far.py").expect("add");
    let mut img = sprite("far.png", 96, 32);
    img.map_x = 96;
    objects.set_image(id, img).expect("image");
    objects.set_tag(id, 1).expect("tag");
    view.render_map(&mut objects, &mut gfx);
    log.clear();

    view.mark_dirty_rect(0, 0, 32, 32).expect("mark");
    let stats = view.render_map(&mut objects, &mut gfx);
    assert_eq!(stats.sprites, 0);
    assert!(log.draws().iter().all(|(n, _)| n != "far.png"));
}
