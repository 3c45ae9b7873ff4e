use std::{
    env,
    io::{self, BufWriter, Write},
};

use anyhow::{bail, Context};
use catoptric::*;
use catoptric_mirrors::*;
use catoptric_random::{rand, random_scene};
use serde::Serialize;
use tracing::info;

const RANDOM_MIRRORS: usize = 12;
const RANDOM_EMITTERS: usize = 4;

/// One line of output: every segment of an emitter's light paths.
#[derive(Serialize)]
struct EmitterRecord<'a> {
    state: &'a str,
    emitter: usize,
    kind: &'static str,
    segments: Vec<Segment>,
}

fn v(x: Float, y: Float) -> Vector2 {
    Vector2::new(x, y)
}

/// A box of four plane mirrors with two rays bouncing inside, next to a concave
/// and a convex arc lit by a beam.
fn demo_scene(config: TraceConfig) -> anyhow::Result<Scene<SceneMirror>> {
    let mirrors: [SceneMirror; 6] = [
        PlaneMirror::try_new(v(50.0, 400.0), v(550.0, 400.0))?.into(),
        PlaneMirror::try_new(v(550.0, 100.0), v(50.0, 100.0))?.into(),
        PlaneMirror::try_new(v(100.0, 200.0), v(100.0, 400.0))?.into(),
        PlaneMirror::try_new(v(350.0, 200.0), v(500.0, 400.0))?.into(),
        SphericalMirror::try_new(
            v(700.0, 150.0),
            v(760.0, 250.0),
            v(700.0, 350.0),
            false,
        )?
        .into(),
        SphericalMirror::try_new(
            v(650.0, 500.0),
            v(700.0, 460.0),
            v(750.0, 500.0),
            true,
        )?
        .into(),
    ];

    let emitters: [Emitter; 3] = [
        Ray::try_new(v(300.0, 300.0), v(-13.0, 50.0))?.into(),
        Ray::try_new(v(550.0, 300.0), v(-100.0, -20.0))?.into(),
        Beam::try_new(v(600.0, 250.0), v(1.0, 0.0), 5, 60.0)?.into(),
    ];

    Ok(Scene::with_contents(config, mirrors, emitters)?)
}

fn write_records(
    out: &mut impl Write,
    state: &str,
    view: &SceneView<'_, SceneMirror>,
) -> anyhow::Result<()> {
    for (id, emitter) in view.emitters() {
        let record = EmitterRecord {
            state,
            emitter: id.0,
            kind: match emitter {
                Emitter::Ray(_) => "ray",
                Emitter::Beam(_) => "beam",
            },
            segments: emitter.segments().collect(),
        };
        serde_json::to_writer(&mut *out, &record)?;
        writeln!(out)?;
    }
    Ok(())
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .init();

    let mut args = env::args().skip(1);

    let mode = args.next().unwrap_or_else(|| "demo".into());

    let config = match args.next() {
        Some(path) => TraceConfig::from_path(&path)
            .with_context(|| format!("failed to load config from {path}"))?,
        None => TraceConfig::default(),
    };

    let mut scene = match mode.as_str() {
        "demo" => demo_scene(config)?,
        "random" => {
            let mut rng = rand::thread_rng();
            random_scene(&mut rng, RANDOM_MIRRORS, RANDOM_EMITTERS, config)?
        }
        other => bail!("unknown scene {other:?}, expected `demo` or `random`"),
    };

    info!(
        %mode,
        mirrors = scene.mirrors().len(),
        emitters = scene.emitter_count(),
        "scene ready"
    );

    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());

    write_records(&mut out, "initial", &scene.view())?;

    // what dragging the mouse does: turn a mirror, then aim the first ray at the cursor
    let mut dirty = Dirty::CLEAN;
    if let Some(last) = scene.mirrors().len().checked_sub(1) {
        dirty |= scene.rotate_mirror(MirrorId(last), 0.25)?;
    }
    dirty |= scene
        .update_emitter_direction(EmitterId(0), &v(400.0, 250.0))
        .context("failed to re-aim the first ray")?;

    let recast = scene.update();
    info!(recast, changed = dirty.is_dirty(), "scene mutated");

    write_records(&mut out, "mutated", &scene.view())?;

    out.flush()?;
    Ok(())
}
