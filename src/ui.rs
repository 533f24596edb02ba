use egui::Context;

use crate::controller::AppContext;
use crate::model::{Avatar, Camera};

/// The name form shown before the avatar exists
pub struct StartScreen {
    pub name_input: String,
}

impl StartScreen {
    pub fn new(default_name: &str) -> Self {
        Self {
            name_input: default_name.to_string(),
        }
    }
}

/// Build the complete UI and return egui output. Pressing Start hands the
/// typed name to the app.
pub fn build_ui(
    egui_ctx: &Context,
    raw_input: egui::RawInput,
    app: &mut AppContext,
    fps: f32,
) -> egui::FullOutput {
    egui_ctx.run(raw_input, |ctx| {
        if let Some(screen) = app.start_screen.as_mut() {
            if let Some(name) = draw_start_screen(ctx, screen) {
                app.start_game(&name);
            }
        }

        if let Some(avatar) = app.avatar.as_ref() {
            draw_name_label(ctx, &app.camera, avatar);
            draw_debug_window(ctx, avatar, app.world.len(), fps);
        }
    })
}

/// Returns the submitted name when Start is pressed
fn draw_start_screen(ctx: &Context, screen: &mut StartScreen) -> Option<String> {
    let mut submitted = None;
    egui::Area::new(egui::Id::new("start_screen"))
        .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
        .show(ctx, |ui| {
            egui::Frame::popup(ui.style()).inner_margin(12.0).show(ui, |ui| {
                ui.vertical_centered(|ui| {
                    ui.add(
                        egui::TextEdit::singleline(&mut screen.name_input)
                            .hint_text("Enter your username")
                            .font(egui::TextStyle::Heading)
                            .desired_width(220.0),
                    );
                    ui.add_space(8.0);
                    if ui.button(egui::RichText::new("Start").size(18.0)).clicked() {
                        submitted = Some(screen.name_input.clone());
                    }
                });
            });
        });
    submitted
}

/// Paint the name above the avatar's head. The text is laid out in screen
/// space so it always faces the viewer; its size follows the label's world
/// height.
fn draw_name_label(ctx: &Context, camera: &Camera, avatar: &Avatar) {
    let label = avatar.label();
    let anchor = avatar.label_position();
    let Some(ndc) = camera.project(anchor) else {
        return;
    };
    if ndc.z > 1.0 {
        return;
    }

    let screen = ctx.available_rect();
    let pos = egui::pos2(
        screen.left() + (ndc.x * 0.5 + 0.5) * screen.width(),
        screen.top() + (-ndc.y * 0.5 + 0.5) * screen.height(),
    );

    // world height -> points at this depth
    let distance = (anchor - camera.eye).length().max(camera.z_near);
    let world_to_screen = screen.height() / (2.0 * (camera.fov_y * 0.5).tan() * distance);
    let font_size = (label.size.y * 0.8 * world_to_screen).clamp(6.0, 96.0);

    let painter = ctx.layer_painter(egui::LayerId::new(
        egui::Order::Background,
        egui::Id::new("name_labels"),
    ));
    painter.text(
        pos,
        egui::Align2::CENTER_CENTER,
        &label.text,
        egui::FontId::proportional(font_size),
        egui::Color32::WHITE,
    );
}

fn draw_debug_window(ctx: &Context, avatar: &Avatar, block_count: usize, fps: f32) {
    let pos = avatar.position;
    egui::Window::new("Debug")
        .default_pos([8.0, 8.0])
        .show(ctx, |ui| {
            ui.label(egui::RichText::new(format!("FPS: {:.0}", fps)).small());
            ui.label(egui::RichText::new(format!("Name: {}", avatar.name())).small());
            ui.label(egui::RichText::new(format!("Pos: x: {:.2} y: {:.2} z: {:.2}", pos.x, pos.y, pos.z)).small());
            ui.label(egui::RichText::new(format!("Grounded: {}", avatar.grounded)).small());
            ui.label(egui::RichText::new(format!("Blocks: {}", block_count)).small());
            ui.separator();
            ui.label(egui::RichText::new("Controls:").small());
            ui.label(egui::RichText::new("WASD - Move").small());
            ui.label(egui::RichText::new("Space - Jump").small());
            ui.label(egui::RichText::new("Left click - Place block").small());
            ui.label(egui::RichText::new("Right click - Remove block").small());
        });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DemoConfig;

    #[test]
    fn test_start_screen_defaults_to_player() {
        let screen = StartScreen::new(&DemoConfig::default().default_username);
        assert_eq!(screen.name_input, "Player");
    }

    #[test]
    fn test_ui_runs_headless_before_and_after_start() {
        let ctx = Context::default();
        let mut app = AppContext::new(DemoConfig::default(), 800, 600);

        let _ = build_ui(&ctx, egui::RawInput::default(), &mut app, 60.0);
        assert!(!app.is_started());

        app.start_game("Alex");
        let _ = build_ui(&ctx, egui::RawInput::default(), &mut app, 60.0);
        assert!(app.start_screen.is_none());
    }
}
