//! Browser bindings
//!
//! The page drives a [`WasmGame`] from `requestAnimationFrame` and forwards
//! keyboard events; rendering reads the state and layout snapshots.

use serde::Serialize;
use wasm_bindgen::prelude::*;

use crate::game::{Command, Game};
use crate::input::KeyTracker;
use crate::settings::Settings;

#[wasm_bindgen(start)]
pub fn wasm_main() {
    console_error_panic_hook::set_once();
    if console_log::init_with_level(log::Level::Info).is_err() {
        // Already initialised by an earlier module instance
        return;
    }
    log::info!("Binary Bots starting...");
}

/// Game instance owned by the page
#[wasm_bindgen]
pub struct WasmGame {
    game: Game,
    keys: KeyTracker,
}

#[wasm_bindgen]
impl WasmGame {
    /// Create a game, optionally from settings JSON
    #[wasm_bindgen(constructor)]
    pub fn new(settings_json: Option<String>) -> Result<WasmGame, JsError> {
        let settings = match settings_json {
            Some(json) => Settings::from_json(&json)?,
            None => Settings::load(),
        };
        let seed = settings.seed.unwrap_or_else(|| js_sys::Date::now() as u64);
        Ok(Self {
            game: Game::new(settings, seed)?,
            keys: KeyTracker::new(),
        })
    }

    /// Advance one animation frame at `now_ms` (the rAF timestamp)
    pub fn frame(&mut self, now_ms: f64) {
        let input = self.keys.input_state();
        self.game.frame(now_ms, &input);
    }

    /// Returns true when the key triggered a command, so the page can
    /// suppress the browser default (Tab focus, Enter form submit)
    pub fn key_down(&mut self, key: &str) -> bool {
        let terminal_open = self.game.state().terminal.open;
        match self.keys.key_down(key, terminal_open) {
            Some(command) => {
                self.game.command(command);
                true
            }
            None => false,
        }
    }

    pub fn key_up(&mut self, key: &str) {
        self.keys.key_up(key);
    }

    /// Window lost focus; release every held key
    pub fn blur(&mut self) {
        self.keys.clear();
    }

    pub fn set_terminal_input(&mut self, raw: String) {
        self.game.command(Command::Input(raw));
    }

    pub fn submit(&mut self) {
        self.game.command(Command::Submit);
    }

    pub fn cancel(&mut self) {
        self.game.command(Command::Cancel);
    }

    pub fn restart(&mut self) {
        self.game.command(Command::Restart);
    }

    pub fn next_level(&mut self) {
        self.game.command(Command::NextLevel);
    }

    pub fn play_again(&mut self) {
        self.game.command(Command::PlayAgain);
    }

    /// Current state for the renderer
    pub fn state(&self) -> Result<JsValue, JsError> {
        to_js(self.game.state())
    }

    /// Static entity layout
    pub fn world(&self) -> Result<JsValue, JsError> {
        to_js(self.game.world())
    }

    pub fn snapshot(&self) -> Result<String, JsError> {
        Ok(self.game.snapshot_json()?)
    }

    pub fn restore(&mut self, json: &str) -> Result<(), JsError> {
        Ok(self.game.restore(json)?)
    }
}

fn to_js<T: Serialize>(value: &T) -> Result<JsValue, JsError> {
    // The RNG state holds full-range u64s
    let serializer = serde_wasm_bindgen::Serializer::new().serialize_large_number_types_as_bigints(true);
    Ok(value.serialize(&serializer)?)
}
