// widgets.rs — egui 覆盖层:等待提示、场景标题、照片内嵌查看器、
// 退出确认、全屏按钮、版本标签、热点标记
//
// 所有控件只读取当前帧状态,交互结果统一以 NavigationIntent 返回,
// 与指针/键盘事件走同一个分发点。

use egui::{Align2, Color32, Pos2, Rect, RichText, Stroke, TextureHandle, Vec2};

use crate::hotspot::HotspotKind;
use crate::input::NavigationIntent;

/// Screen-space hotspot marker, projected by the camera each frame.
#[derive(Debug, Clone, Copy)]
pub struct Marker {
    pub x: f32,
    pub y: f32,
    pub kind: HotspotKind,
    pub hovered: bool,
}

/// Per-frame inputs for the overlay.
pub struct FrameState<'a> {
    pub loading: bool,
    pub failed: bool,
    pub scene_title: &'a str,
    pub markers: &'a [Marker],
    pub hover_tooltip: Option<&'a str>,
    pub cursor: (f32, f32),
    pub show_exit: bool,
    pub is_fullscreen: bool,
}

struct PhotoView {
    title: String,
    texture: Option<TextureHandle>,
}

pub struct Widgets {
    photo: Option<PhotoView>,
    portal_texture: Option<TextureHandle>,
    exit_dialog_open: bool,
}

const MARKER_RADIUS: f32 = 14.0;
const HOVER_COLOR: Color32 = Color32::from_rgb(0xff, 0x00, 0x00); // 与悬停材质一致:红色
const NORMAL_COLOR: Color32 = Color32::WHITE;

impl Widgets {
    pub fn new() -> Self {
        Self {
            photo: None,
            portal_texture: None,
            exit_dialog_open: false,
        }
    }

    /// Custom portal marker image; a painted disc is the fallback.
    pub fn set_portal_texture(&mut self, texture: TextureHandle) {
        self.portal_texture = Some(texture);
    }

    pub fn show_photo(&mut self, title: String) {
        self.photo = Some(PhotoView { title, texture: None });
    }

    /// The decoded photo arrives a little later than the open request.
    pub fn set_photo_texture(&mut self, texture: TextureHandle) {
        if let Some(photo) = self.photo.as_mut() {
            photo.texture = Some(texture);
        }
    }

    pub fn hide_photo(&mut self) {
        self.photo = None;
    }

    pub fn is_photo_visible(&self) -> bool {
        self.photo.is_some()
    }

    pub fn draw(&mut self, ctx: &egui::Context, state: &FrameState) -> Vec<NavigationIntent> {
        let mut intents = Vec::new();

        self.draw_markers(ctx, state);

        // 场景标题(置顶信息条)
        if !state.scene_title.is_empty() && !state.loading {
            egui::Area::new("scene_title")
                .anchor(Align2::CENTER_TOP, Vec2::new(0.0, 8.0))
                .show(ctx, |ui| {
                    ui.label(
                        RichText::new(state.scene_title)
                            .color(Color32::WHITE)
                            .background_color(Color32::from_black_alpha(120))
                            .size(18.0),
                    )
                    .on_hover_text(crate::i18n::tr("tooltip.scene"));
                });
        }

        // 等待/失败提示
        if state.loading || state.failed {
            let (key, color) = if state.loading {
                ("waiter.loading", Color32::YELLOW)
            } else {
                ("scene.load_failed", Color32::LIGHT_RED)
            };
            egui::Area::new("waiter")
                .anchor(Align2::CENTER_CENTER, Vec2::ZERO)
                .show(ctx, |ui| {
                    ui.label(RichText::new(crate::i18n::tr(key)).color(color).size(24.0));
                });
        }

        // 版本标签
        egui::Area::new("version_label")
            .anchor(Align2::LEFT_BOTTOM, Vec2::new(6.0, -6.0))
            .show(ctx, |ui| {
                ui.label(
                    RichText::new(format!("vtour {}", env!("CARGO_PKG_VERSION")))
                        .color(Color32::from_white_alpha(140))
                        .size(12.0),
                )
                .on_hover_text(crate::i18n::tr("tooltip.version"));
            });

        // 全屏切换
        egui::Area::new("fullscreen_button")
            .anchor(Align2::RIGHT_TOP, Vec2::new(-6.0, 6.0))
            .show(ctx, |ui| {
                let label = if state.is_fullscreen { "🗗" } else { "🗖" };
                if ui
                    .button(label)
                    .on_hover_text(crate::i18n::tr("tooltip.fullscreen"))
                    .clicked()
                {
                    intents.push(NavigationIntent::ToggleFullscreen);
                }
            });

        // 退出按钮(仅当配置了 exitUrl)
        if state.show_exit {
            egui::Area::new("exit_button")
                .anchor(Align2::LEFT_TOP, Vec2::new(6.0, 6.0))
                .show(ctx, |ui| {
                    if ui
                        .button(crate::i18n::tr("tooltip.exit"))
                        .clicked()
                    {
                        self.exit_dialog_open = true;
                    }
                });
        }

        if self.exit_dialog_open {
            egui::Window::new(crate::i18n::tr("tooltip.exit"))
                .collapsible(false)
                .resizable(false)
                .anchor(Align2::CENTER_CENTER, Vec2::ZERO)
                .show(ctx, |ui| {
                    ui.label(crate::i18n::tr("exit.question"));
                    ui.horizontal(|ui| {
                        if ui.button(crate::i18n::tr("exit.yes")).clicked() {
                            intents.push(NavigationIntent::ExitRequested);
                        }
                        if ui.button(crate::i18n::tr("exit.no")).clicked() {
                            self.exit_dialog_open = false;
                        }
                    });
                });
        }

        if self.photo.is_some() {
            intents.extend(self.draw_photo(ctx));
        }

        intents
    }

    // 热点标记:门户画圆环(或配置的贴图),照片点画方框;悬停为红色
    fn draw_markers(&self, ctx: &egui::Context, state: &FrameState) {
        let painter = ctx.layer_painter(egui::LayerId::new(
            egui::Order::Background,
            egui::Id::new("hotspot_markers"),
        ));

        for marker in state.markers {
            let pos = Pos2::new(marker.x, marker.y);
            let color = if marker.hovered { HOVER_COLOR } else { NORMAL_COLOR };

            match marker.kind {
                HotspotKind::Portal => {
                    if let Some(texture) = &self.portal_texture {
                        let half = Vec2::splat(MARKER_RADIUS * 1.2);
                        painter.image(
                            texture.id(),
                            Rect::from_min_max(pos - half, pos + half),
                            Rect::from_min_max(Pos2::ZERO, Pos2::new(1.0, 1.0)),
                            color,
                        );
                    } else {
                        painter.circle_filled(pos, MARKER_RADIUS * 0.4, color);
                        painter.circle_stroke(pos, MARKER_RADIUS, Stroke::new(2.0, color));
                    }
                }
                HotspotKind::Photo => {
                    let half = Vec2::splat(MARKER_RADIUS * 0.8);
                    painter.rect_stroke(
                        Rect::from_min_max(pos - half, pos + half),
                        2.0,
                        Stroke::new(2.0, color),
                    );
                }
            }
        }

        if let Some(text) = state.hover_tooltip {
            let (cx, cy) = state.cursor;
            painter.text(
                Pos2::new(cx + 14.0, cy + 18.0),
                Align2::LEFT_TOP,
                text,
                egui::FontId::proportional(14.0),
                Color32::WHITE,
            );
        }
    }

    // 照片内嵌查看器:半透明遮罩 + contain 适配 + 右上角关闭
    fn draw_photo(&self, ctx: &egui::Context) -> Vec<NavigationIntent> {
        let mut intents = Vec::new();
        let Some(photo) = self.photo.as_ref() else {
            return intents;
        };

        let screen = ctx.screen_rect();
        let painter = ctx.layer_painter(egui::LayerId::new(
            egui::Order::Middle,
            egui::Id::new("photo_overlay"),
        ));
        painter.rect_filled(screen, 0.0, Color32::from_black_alpha(190));

        match &photo.texture {
            Some(texture) => {
                let size = texture.size_vec2();
                let scale = (screen.width() / size.x)
                    .min(screen.height() / size.y)
                    .min(1.0);
                let fitted = size * scale;
                let rect = Rect::from_center_size(screen.center(), fitted);
                painter.image(
                    texture.id(),
                    rect,
                    Rect::from_min_max(Pos2::ZERO, Pos2::new(1.0, 1.0)),
                    Color32::WHITE,
                );
            }
            None => {
                painter.text(
                    screen.center(),
                    Align2::CENTER_CENTER,
                    crate::i18n::tr("waiter.loading"),
                    egui::FontId::proportional(20.0),
                    Color32::WHITE,
                );
            }
        }

        if !photo.title.is_empty() {
            painter.text(
                Pos2::new(screen.center().x, screen.top() + 12.0),
                Align2::CENTER_TOP,
                &photo.title,
                egui::FontId::proportional(16.0),
                Color32::WHITE,
            );
        }

        egui::Area::new("photo_close")
            .anchor(Align2::RIGHT_TOP, Vec2::new(-10.0, 5.0))
            .order(egui::Order::Foreground)
            .show(ctx, |ui| {
                if ui
                    .button(RichText::new("X").size(18.0))
                    .on_hover_text(crate::i18n::tr("photo.close"))
                    .clicked()
                {
                    intents.push(NavigationIntent::CloseOverlay);
                }
            });

        intents
    }
}
