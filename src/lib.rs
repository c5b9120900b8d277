use serde_wasm_bindgen::{from_value, to_value};
use wasm_bindgen::prelude::*;

pub mod grid;
pub mod input;
pub mod piece;
pub mod randomizer;
pub mod session;
pub mod settings;
pub mod versus;

pub use grid::Grid;
pub use input::{KeyBindings, KeyEventKind};
pub use piece::{Piece, Point, Tetromino};
pub use randomizer::{PieceQueue, PieceSource, RandomizerKind};
pub use session::{DropSpeed, Lock, PieceSession};
pub use settings::GameSettings;
pub use versus::{FrameView, Versus};

#[wasm_bindgen(start)]
pub fn bootstrap() {
    console_error_panic_hook::set_once();
}

#[cfg(target_arch = "wasm32")]
pub(crate) fn log(msg: &str) {
    web_sys::console::log_1(&JsValue::from_str(msg));
}

#[cfg(not(target_arch = "wasm32"))]
pub(crate) fn log(msg: &str) {
    eprintln!("{msg}");
}

fn settings_from(value: JsValue) -> Result<GameSettings, JsValue> {
    if value.is_undefined() || value.is_null() {
        return Ok(GameSettings::default());
    }
    Ok(from_value(value)?)
}

/// Browser entry point: one match, driven by `requestAnimationFrame` and
/// keyboard events from the page.
#[wasm_bindgen]
pub struct GameClient {
    versus: Versus,
}

#[wasm_bindgen]
impl GameClient {
    #[wasm_bindgen(constructor)]
    pub fn new(settings: JsValue) -> Result<GameClient, JsValue> {
        let settings = settings_from(settings)?;
        let versus = Versus::new(&settings).map_err(|e| JsValue::from_str(&e))?;
        log(&format!(
            "[tetri] {} players on {}x{}",
            settings.players, settings.width, settings.height
        ));
        Ok(Self { versus })
    }

    #[wasm_bindgen(js_name = tick)]
    pub fn tick(&mut self, dt_ms: f32) -> Result<JsValue, JsValue> {
        self.versus.tick(dt_ms);
        self.frame()
    }

    #[wasm_bindgen(js_name = keyDown)]
    pub fn key_down(&mut self, code: &str) {
        self.versus.key_event(code, KeyEventKind::Down);
    }

    #[wasm_bindgen(js_name = keyUp)]
    pub fn key_up(&mut self, code: &str) {
        self.versus.key_event(code, KeyEventKind::Up);
    }

    #[wasm_bindgen(js_name = setBindings)]
    pub fn set_bindings(&mut self, player: usize, bindings: JsValue) -> Result<(), JsValue> {
        let parsed: KeyBindings = from_value(bindings)?;
        self.versus
            .set_bindings(player, parsed)
            .map_err(|e| JsValue::from_str(&e))
    }

    #[wasm_bindgen(js_name = setRandomizer)]
    pub fn set_randomizer(&mut self, kind: JsValue) -> Result<(), JsValue> {
        let parsed: RandomizerKind = from_value(kind)?;
        self.versus.set_randomizer(&parsed);
        Ok(())
    }

    /// Registers `callback(player, score)`, called after every lock.
    #[wasm_bindgen(js_name = onScore)]
    pub fn on_score(&mut self, callback: js_sys::Function) {
        self.versus.on_score(Box::new(move |player, score| {
            let result = callback.call2(
                &JsValue::NULL,
                &JsValue::from(player as u32),
                &JsValue::from(score),
            );
            if let Err(e) = result {
                log(&format!("[tetri] score callback failed: {e:?}"));
            }
        }));
    }

    #[wasm_bindgen(js_name = players)]
    pub fn players(&self) -> usize {
        self.versus.players()
    }

    #[wasm_bindgen(js_name = frame)]
    pub fn frame(&self) -> Result<JsValue, JsValue> {
        to_value(&self.versus.snapshot()).map_err(|e| e.into())
    }

    #[wasm_bindgen(js_name = frameJson)]
    pub fn frame_json(&self) -> Result<String, JsValue> {
        serde_json::to_string(&self.versus.snapshot()).map_err(|e| JsValue::from_str(&e.to_string()))
    }
}
