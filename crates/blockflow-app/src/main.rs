//! BlockFlow headless driver.
//!
//! Loads a block-type library, builds a small diagram by replaying
//! pointer gestures through the interaction engine, mirrors lifecycle
//! events to the instance bridge, and writes the rendered SVG scene.
//!
//! Usage: `blockflow [library.json] [out.svg]`. Without arguments the
//! built-in library is used and the scene goes to stdout.

use blockflow_core::{
    bridge, Action, BlockLibrary, CanvasState, GestureController, InstanceBridge, Modifiers,
    MouseButton, NullBridge, PressTarget, RenameEditor, Viewport,
};
use blockflow_render::{render_scene, SceneContext, Signal};
use kurbo::Point;
use log::info;
use std::env;
use std::error::Error;
use std::fs;
use std::io::Write;

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let library = match args.get(1) {
        Some(path) => {
            info!("loading block library from {path}");
            BlockLibrary::load(path)?
        }
        None => BlockLibrary::builtin(),
    };

    let mut state = CanvasState::new();
    let mut gestures = GestureController::default();
    let mut backend = NullBridge;
    let mut viewport = Viewport::new();
    viewport.mount(1600.0, 1200.0);
    state.apply(Action::SetConfigReady(true));

    build_demo(&mut state, &mut gestures, &mut backend, &library, &viewport);

    let signals = [
        Signal::new("constant", "gain"),
        Signal::new("gain", "scope"),
        Signal::new("amp", "scope"),
    ];
    let scene = render_scene(
        &SceneContext::new(&state, &library, &viewport)
            .with_signals(&signals)
            .with_ghost_previews(gestures.ghost_previews()),
    );

    match args.get(2) {
        Some(path) => {
            fs::write(path, scene)?;
            info!("scene written to {path}");
        }
        None => {
            std::io::stdout().write_all(scene.as_bytes())?;
        }
    }
    Ok(())
}

/// Assemble a small demo diagram the same way an interactive session
/// would: pointer gestures for everything a pointer can do, direct
/// actions for block creation.
fn build_demo(
    state: &mut CanvasState,
    gestures: &mut GestureController,
    backend: &mut dyn InstanceBridge,
    library: &BlockLibrary,
    viewport: &Viewport,
) {
    let mut clock = 0.0;
    let mut now = move || {
        clock += 500.0;
        clock
    };

    for (block_type, x, y) in [
        ("constant", 100.0, 200.0),
        ("gain", 350.0, 200.0),
        ("scope", 600.0, 200.0),
    ] {
        let block = library.instantiate(block_type, block_type, Point::new(x, y));
        bridge::notify(backend.create_instance(&block.id, &block.block_type));
        state.apply(Action::AddBlock(block));
    }

    // Drag the gain block; pointer positions arrive in screen space.
    let grab = viewport.canvas_to_screen(Point::new(400.0, 230.0));
    let drop = viewport.canvas_to_screen(Point::new(423.0, 337.0));
    let t = now();
    gestures.block_down(
        state,
        "gain",
        PressTarget::Body,
        viewport.screen_to_canvas(grab),
        MouseButton::Left,
        Modifiers::default(),
        t,
    );
    gestures.pointer_move(state, viewport.screen_to_canvas(drop), now());
    gestures.pointer_up(state, viewport.screen_to_canvas(drop), now());

    // Right-drag the constant to duplicate it, then rename the copy.
    let t = now();
    gestures.block_down(
        state,
        "constant",
        PressTarget::Body,
        Point::new(150.0, 230.0),
        MouseButton::Right,
        Modifiers::default(),
        t,
    );
    gestures.pointer_move(state, Point::new(150.0, 430.0), now());
    gestures.pointer_up(state, Point::new(150.0, 430.0), now());
    gestures.tick(state, now());

    if let Some(copy) = state.block("constant1") {
        bridge::notify(backend.create_instance(&copy.id, &copy.block_type));
        let editor = {
            let mut editor = RenameEditor::begin(copy);
            editor.set_text("amp");
            editor
        };
        if editor.commit(state) {
            bridge::notify(backend.update_block_id("constant1", "amp"));
        }
    }

    // Marquee-select the left column.
    let t = now();
    gestures.background_down(state, Point::new(50.0, 150.0), Modifiers::default(), t);
    gestures.pointer_move(state, Point::new(250.0, 500.0), now());
    gestures.pointer_up(state, Point::new(250.0, 500.0), now());

    info!(
        "demo canvas ready: {} blocks, {} selected",
        state.blocks.len(),
        state.selection.len()
    );
}
