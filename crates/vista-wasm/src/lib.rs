//! Vista WASM - Browser binding for the Vista slideshow player
//!
//! Drives an existing `<video>` and `<img>` pair inside a container element:
//! - Scene navigation with poster/video source selection
//! - Buffering notifications from media events
//! - Cover-fit crop of poster and video on resize
//!
//! ## Usage
//!
//! ```javascript
//! import init, { VistaPlayer } from '@vista/wasm';
//!
//! await init();
//! const player = new VistaPlayer({ container_id: 'stage', json_url: 'scenes.json', autoplay: true });
//! document.getElementById('stage').addEventListener('scene_loaded', (e) => console.log(e.detail));
//! ```

use wasm_bindgen::prelude::*;

mod dom;
mod logging;
mod player;

pub use player::VistaPlayer;

/// Initialize the WASM module
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
    logging::init();
    vista_core::init();
}

/// Library version
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}
