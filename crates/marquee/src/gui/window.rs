use crate::gui::curve::LoopState;
use gtk4 as gtk;
use gtk4_layer_shell::{Edge, KeyboardMode, Layer, LayerShell};

pub const DEFAULT_WIDTH: i32 = 1440;

/// Tall enough to show the whole curve edge to edge at the default width.
pub fn banner_height(state: &LoopState) -> i32 {
    state.preferred_height(f64::from(DEFAULT_WIDTH)).ceil() as i32
}

/// Pins the window to the top edge as a banner when the compositor speaks
/// the layer-shell protocol; elsewhere it stays a plain toplevel.
pub fn init_layer_shell(window: &gtk::ApplicationWindow) {
    if !gtk4_layer_shell::is_supported() {
        log::info!("Layer shell unsupported, using a regular window");
        return;
    }

    window.init_layer_shell();
    window.set_layer(Layer::Top);
    window.set_namespace(Some("marquee"));
    window.set_exclusive_zone(-1);
    for edge in [Edge::Left, Edge::Right, Edge::Top] {
        window.set_anchor(edge, true);
    }
    window.set_keyboard_mode(KeyboardMode::OnDemand);
}
