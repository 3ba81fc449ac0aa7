//! Wok Star headless entry point
//!
//! Cooks one ticket end to end without a window: drops ingredients, holds
//! the burner, tosses with a scripted pointer and serves. Pass a settings
//! JSON path as the first argument to override the defaults.

#[cfg(not(target_arch = "wasm32"))]
use wok_star::audio::{AudioSink, SoundEffect};
#[cfg(not(target_arch = "wasm32"))]
use wok_star::consts::RENDER_DT;
#[cfg(not(target_arch = "wasm32"))]
use wok_star::sim::{PointerSample, ServeOutcome, SimEvent};
#[cfg(not(target_arch = "wasm32"))]
use wok_star::{Catalog, Settings, SimulationSession, view};

#[cfg(not(target_arch = "wasm32"))]
const MAX_TOSS_ROUNDS: u32 = 40;

/// Logs every cue instead of playing it
#[cfg(not(target_arch = "wasm32"))]
struct LogAudio;

#[cfg(not(target_arch = "wasm32"))]
impl AudioSink for LogAudio {
    fn play(&mut self, effect: SoundEffect) {
        log::debug!("cue {:?}", effect);
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn load_settings() -> Settings {
    let Some(path) = std::env::args().nth(1) else {
        return Settings::default();
    };
    match Settings::load(std::path::Path::new(&path)) {
        Ok(settings) => settings,
        Err(e) => {
            log::warn!("Could not load settings from {}: {}", path, e);
            Settings::default()
        }
    }
}

/// Run `frames` render frames with an optional scripted toss
#[cfg(not(target_arch = "wasm32"))]
fn run_frames(session: &mut SimulationSession, frames: u32, tossing: bool) {
    for frame in 0..frames {
        if tossing {
            let phase = frame as f32 * 0.35;
            let t = session.clock();
            session.pointer(PointerSample::new(phase.sin() * 0.9, phase.cos().abs() * -0.9, t));
        }
        session.advance(RENDER_DT);
        for event in session.drain_events() {
            match event {
                SimEvent::Sound(_) | SimEvent::TossTick => {}
                other => log::info!("{:?}", other),
            }
        }
        session.sync_audio(&mut LogAudio);
    }
    if tossing {
        session.release_pointer();
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Wok Star (headless) starting...");

    let settings = load_settings();
    log::info!(
        "Mode {:?}, difficulty {}, quality {}, seed {}",
        settings.mode,
        settings.difficulty.as_str(),
        settings.quality.as_str(),
        settings.seed
    );
    let mut session = SimulationSession::new(Catalog::standard(), settings);

    let Some(ticket) = session.orders().orders().first().cloned() else {
        log::warn!("No ticket on the rail");
        return;
    };
    log::info!("Cooking ticket #{} ({})", ticket.id, ticket.recipe_id);

    session.set_oiling(true);
    run_frames(&mut session, 40, false);
    session.set_oiling(false);
    session.set_heat(85.0);

    for (id, count) in &ticket.required {
        for _ in 0..*count {
            if let Err(e) = session.add_ingredient(id.as_str()) {
                log::warn!("Could not add {}: {}", id, e.message());
            }
            run_frames(&mut session, 10, false);
        }
    }

    // Toss in bursts until the dish is done or starts to scorch
    for _ in 0..MAX_TOSS_ROUNDS {
        if session.snapshot().cook >= 90.0 || session.snapshot().burn >= 30.0 {
            break;
        }
        run_frames(&mut session, 60, true);
        run_frames(&mut session, 20, false);
        let shake = view::camera_shake(&session, &mut rand::rng());
        let sprites = view::build_frame(&session, shake);
        log::debug!("{} sprites ({} bytes)", sprites.len(), view::as_bytes(&sprites).len());
        let snap = session.snapshot();
        log::info!(
            "cook {:.0} burn {:.0} wok hei {:.0} oil {:.0}",
            snap.cook,
            snap.burn,
            snap.wok_hei,
            snap.oil
        );
    }

    match session.serve() {
        ServeOutcome::Served(report) => log::info!(
            "Served #{} {}: profit ${:.2} ({})",
            report.order_id,
            report.recipe_id,
            report.profit,
            report.quality.label()
        ),
        other => log::info!("Serve did not land: {:?}", other),
    }
    run_frames(&mut session, 120, false);

    let wallet = session.wallet();
    log::info!(
        "Shift over: cash ${:.2}, score {:.0}, combo {}",
        wallet.cash,
        wallet.score,
        wallet.combo
    );
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // Browser hosts drive the library directly
}
