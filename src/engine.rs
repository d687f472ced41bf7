use imgui::{Condition, StyleColor, StyleVar};

use crate::viewer::ViewerState;

const CLOSE_LABEL: &str = "CLOSE PC";

pub fn update(state: &mut ViewerState, ui: &imgui::Ui) -> anyhow::Result<()> {
    state.update();

    if state.controller.close_control_visible() && close_button(ui) {
        state.close_focused_view();
    }

    Ok(())
}

/// Draws the close control centered at three quarters of the window height.
/// Returns true on the frame it is clicked.
fn close_button(ui: &imgui::Ui) -> bool {
    let [width, height] = ui.io().display_size;

    let _rounding = ui.push_style_var(StyleVar::FrameRounding(20.0));
    let _padding = ui.push_style_var(StyleVar::FramePadding([30.0, 15.0]));
    let _border = ui.push_style_var(StyleVar::WindowBorderSize(0.0));
    let _button = ui.push_style_color(StyleColor::Button, [1.0, 1.0, 1.0, 1.0]);
    let _hovered = ui.push_style_color(StyleColor::ButtonHovered, [0.93, 0.93, 0.93, 1.0]);
    let _active = ui.push_style_color(StyleColor::ButtonActive, [0.87, 0.87, 0.87, 1.0]);
    let _text = ui.push_style_color(StyleColor::Text, [0.1, 0.1, 0.1, 1.0]);

    ui.window("##close_control")
        .position([width * 0.5, height * 0.75], Condition::Always)
        .position_pivot([0.5, 0.5])
        .no_decoration()
        .always_auto_resize(true)
        .bg_alpha(0.0)
        .build(|| ui.button(CLOSE_LABEL))
        .unwrap_or(false)
}
