use anyhow::Context;
use cmft_field::backend::macroquad_gfx::MacroquadGraphics;
use cmft_field::backend::null::NullEvents;
use cmft_field::{load_map, Engine, EngineConfig, Frame, MapView, ModuleSet, ObjectImage, Reference};
use macroquad::prelude::*;
use std::path::Path;
use tracing_subscriber::EnvFilter;

fn window_conf() -> Conf {
    Conf {
        window_title: "CMFT Field".into(),
        window_width: 640,
        window_height: 480,
        ..Default::default()
    }
}

#[macroquad::main(window_conf)]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,cmft_field=debug")),
        )
        .init();

    if let Err(e) = run().await {
        tracing::error!("{:#}", e);
        std::process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    let args: Vec<String> = std::env::args().collect();
    let map_path = args.get(1).map(String::as_str).unwrap_or("assets/field.cmft");
    let mut config = match args.get(2) {
        Some(path) => EngineConfig::load(path).context("reading engine config")?,
        None => EngineConfig::default(),
    };
    // next_frame() already paces the loop
    config.frame_delay_ms = 0;

    let asset_root = Path::new(map_path).parent().unwrap_or(Path::new("."));
    let mut modules = ModuleSet::with_dylibs(config.module_path.clone());
    modules.bind_graphics(Box::new(MacroquadGraphics::new(asset_root)))?;
    modules.bind_events(Box::new(NullEvents::default()))?;

    let mut engine = Engine::with_modules(config, modules);
    engine.start().context("starting engine")?;

    let map = load_map(map_path).with_context(|| format!("loading {}", map_path))?;
    let mut view = MapView::new(map, engine.render_settings()).context("building map view")?;

    let hero = engine.objects_mut().add("hero", "hero.py")?;
    engine.objects_mut().set_image(
        hero,
        ObjectImage {
            filename: "hero.png".into(),
            width: 32,
            height: 32,
            ..Default::default()
        },
    )?;
    engine.objects_mut().set_tag(hero, 1)?;
    engine
        .objects_mut()
        .set_coordinates(hero, 96, 127, Reference::BottomLeft)?;
    view.focus_on_object(engine.objects(), hero)?;

    loop {
        let frame = engine.step(&mut view, |engine, view| {
            if is_key_pressed(KeyCode::Escape) {
                engine.request_quit();
                return;
            }

            let mut step = (0, 0);
            if is_key_down(KeyCode::Left) {
                step.0 -= 2;
            }
            if is_key_down(KeyCode::Right) {
                step.0 += 2;
            }
            if is_key_down(KeyCode::Up) {
                step.1 -= 2;
            }
            if is_key_down(KeyCode::Down) {
                step.1 += 2;
            }
            if step != (0, 0) {
                if let Err(e) = view.move_object(engine.objects_mut(), hero, step.0, step.1) {
                    tracing::warn!(error = %e, "hero cannot move");
                }
            }

            let mut pan = (0, 0);
            if is_key_down(KeyCode::A) {
                pan.0 -= 4;
            }
            if is_key_down(KeyCode::D) {
                pan.0 += 4;
            }
            if is_key_down(KeyCode::W) {
                pan.1 -= 4;
            }
            if is_key_down(KeyCode::S) {
                pan.1 += 4;
            }
            if pan != (0, 0) {
                if let Err(e) = engine.scroll(view, pan.0, pan.1) {
                    tracing::warn!(error = %e, "scroll failed");
                }
            }
        })?;

        if frame == Frame::Quit {
            break;
        }
        next_frame().await;
    }

    engine.shutdown();
    Ok(())
}
