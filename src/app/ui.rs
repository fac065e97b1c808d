use super::{style, MascotApp};
use crate::config::Alignment;
use crate::drag::{DragOutcome, MARGIN_RIGHT};
use crate::menu::{MenuAction, MenuCommand};
use crate::widget::{MenuEffect, Phase, Position};
use eframe::egui::{
    self, pos2, vec2, Align2, FontId, Pos2, Rect, Rounding, Sense, Stroke, Vec2,
};
use log::warn;
use std::time::Instant;

impl MascotApp {
    pub(super) fn draw(&mut self, ctx: &egui::Context, now: Instant) {
        egui::CentralPanel::default()
            .frame(egui::Frame::none())
            .show(ctx, |ui| {
                let screen = ctx.screen_rect();
                match self.controller.phase() {
                    Phase::Hidden => self.draw_wake(ui, ctx, screen, now),
                    Phase::Shown => self.draw_widget(ui, ctx, screen, now),
                }
            });
    }

    fn origin_for(&self, screen: Rect, size: Vec2) -> Pos2 {
        match self.controller.position() {
            Position::Free(p) => p,
            Position::Docked => docked_origin(screen, self.controller.alignment(), size),
        }
    }

    fn draw_wake(&mut self, ui: &mut egui::Ui, ctx: &egui::Context, screen: Rect, now: Instant) {
        let size = Vec2::splat(style::WAKE_DIAMETER);
        let origin = self.origin_for(screen, size);
        let rect = Rect::from_min_size(origin, size);

        let painter = ui.painter();
        painter.circle_filled(rect.center(), size.x / 2.0, self.theme.wake_bg);
        painter.circle_stroke(
            rect.center(),
            size.x / 2.0 - 2.0,
            Stroke::new(1.5, self.theme.wake_ring),
        );
        painter.text(
            rect.center(),
            Align2::CENTER_CENTER,
            "zZ",
            FontId::proportional(14.0),
            self.theme.menu_text,
        );

        let resp = ui.interact(rect, egui::Id::new("mascot-wake"), Sense::drag());
        // A no-move release wakes the widget; the controller handles that
        // inside end_drag.
        self.route_gesture(ctx, &resp, origin, size, now);
    }

    fn draw_widget(&mut self, ui: &mut egui::Ui, ctx: &egui::Context, screen: Rect, now: Instant) {
        let size = vec2(style::WIDGET_WIDTH, style::WIDGET_HEIGHT);
        let origin = self.origin_for(screen, size);
        let rect = Rect::from_min_size(origin, size);

        self.draw_character(ui, rect);

        let resp = ui.interact(rect, egui::Id::new("mascot-body"), Sense::click_and_drag());
        let outcome = self.route_gesture(ctx, &resp, origin, size, now);
        // An in-place tap never opens a drag session (egui only starts drags
        // once the pointer is decidedly dragging), so the response's click is
        // the signal for taps; a decided drag never reports clicked().
        let clicked = outcome == Some(DragOutcome::Click) || resp.clicked();
        if clicked {
            let pointer = ctx
                .input(|i| i.pointer.interact_pos())
                .unwrap_or_else(|| rect.center());
            let rel = pointer - rect.min;
            let model_point = match self.controller.model() {
                Some(model) => {
                    let intrinsic = model.size();
                    vec2(
                        rel.x / rect.width() * intrinsic.x,
                        rel.y / rect.height() * intrinsic.y,
                    )
                }
                None => rel,
            };
            self.controller.character_clicked(model_point, now);
        }

        if self.controller.menu_enabled() {
            self.draw_menu(ui, rect, screen, now);
        }
        self.draw_bubble(ui, rect, screen);
    }

    /// Shared press/move/release routing for one gesture. Returns the
    /// outcome on the release frame.
    fn route_gesture(
        &mut self,
        ctx: &egui::Context,
        resp: &egui::Response,
        origin: Pos2,
        size: Vec2,
        now: Instant,
    ) -> Option<DragOutcome> {
        if resp.drag_started_by(egui::PointerButton::Primary) {
            if let Some(pointer) = ctx.input(|i| i.pointer.interact_pos()) {
                let touch = touch_gesture(ctx);
                self.controller.begin_drag(pointer, origin, touch);
            }
        }

        if !self.controller.drag_active() {
            return None;
        }

        // Only a real pointer move counts as movement; a press-and-release
        // in place must stay a click.
        if ctx.input(|i| i.pointer.delta()) != Vec2::ZERO {
            if let Some(pointer) = ctx.input(|i| i.pointer.interact_pos()) {
                self.controller
                    .drag_to(pointer, ctx.screen_rect().size(), size);
            }
        }

        if ctx.input(|i| i.pointer.any_released()) {
            return self.controller.end_drag(now);
        }
        None
    }

    fn draw_character(&self, ui: &egui::Ui, rect: Rect) {
        let painter = ui.painter();
        let tint = if self.controller.has_model() {
            self.controller
                .current_model_name()
                .map(style::model_tint)
                .unwrap_or(self.theme.loading)
        } else {
            self.theme.loading
        };

        // Shadow, body, head. Simple vector stand-in for the render surface.
        painter.circle_filled(
            pos2(rect.center().x, rect.bottom() - 4.0),
            rect.width() * 0.38,
            egui::Color32::from_rgba_premultiplied(0, 0, 0, 40),
        );
        let body = Rect::from_min_max(
            pos2(rect.left() + rect.width() * 0.18, rect.top() + rect.height() * 0.32),
            pos2(rect.right() - rect.width() * 0.18, rect.bottom() - 6.0),
        );
        painter.rect_filled(body, Rounding::same(26.0), tint);
        painter.rect_stroke(body, Rounding::same(26.0), Stroke::new(1.5, self.theme.outline));

        let head_center = pos2(rect.center().x, rect.top() + rect.height() * 0.20);
        let head_radius = rect.width() * 0.30;
        painter.circle_filled(head_center, head_radius, tint);
        painter.circle_stroke(head_center, head_radius, Stroke::new(1.5, self.theme.outline));

        if self.controller.has_model() {
            let eye_dx = head_radius * 0.42;
            painter.circle_filled(head_center + vec2(-eye_dx, 0.0), 2.6, self.theme.face);
            painter.circle_filled(head_center + vec2(eye_dx, 0.0), 2.6, self.theme.face);
            if self.controller.model().is_some_and(|m| m.is_motion_playing()) {
                painter.text(
                    head_center + vec2(head_radius + 8.0, -head_radius),
                    Align2::CENTER_CENTER,
                    "~",
                    FontId::proportional(16.0),
                    self.theme.face,
                );
            }
        } else {
            painter.text(
                rect.center(),
                Align2::CENTER_CENTER,
                "...",
                FontId::proportional(14.0),
                self.theme.face,
            );
        }
    }

    fn draw_menu(&mut self, ui: &mut egui::Ui, widget_rect: Rect, screen: Rect, now: Instant) {
        let commands: Vec<MenuCommand> = self.controller.menu().to_vec();
        let button = style::MENU_BUTTON_SIZE;

        // The strip sits on the widget's inner side so it never leaves the
        // viewport while docked.
        let x = match self.controller.alignment() {
            Alignment::Right => widget_rect.left() - button - style::MENU_GAP,
            Alignment::Left => widget_rect.right() + style::MENU_GAP,
        };
        let mut y = widget_rect.top();
        let mut hovered_now = None;

        for command in &commands {
            let rect = Rect::from_min_size(pos2(x, y), Vec2::splat(button));
            let resp = ui.interact(
                rect,
                egui::Id::new(("mascot-menu", command.glyph)),
                Sense::click(),
            );
            let bg = if resp.hovered() {
                self.theme.menu_hover
            } else {
                self.theme.menu_bg
            };
            ui.painter().rect_filled(rect, Rounding::same(6.0), bg);
            ui.painter().text(
                rect.center(),
                Align2::CENTER_CENTER,
                command.glyph,
                FontId::proportional(12.0),
                self.theme.menu_text,
            );

            if resp.hovered() {
                hovered_now = Some(command.action);
            }
            if resp.clicked() {
                let effect =
                    self.controller
                        .activate(command.action, now, screen.size(), widget_rect);
                if let MenuEffect::OpenUrl(url) = effect {
                    if let Err(err) = open::that(url) {
                        warn!("failed to open link: {err}");
                    }
                }
                if command.action == MenuAction::Close {
                    // The widget just transitioned to Hidden.
                    self.hovered_action = None;
                    return;
                }
            }
            y += button + style::MENU_GAP;
        }

        // Hover previews fire on entry, not on every frame spent hovering.
        if hovered_now != self.hovered_action {
            if let Some(action) = hovered_now {
                self.controller.preview(action, now);
            }
            self.hovered_action = hovered_now;
        }
    }

    fn draw_bubble(&self, ui: &egui::Ui, widget_rect: Rect, screen: Rect) {
        let Some(text) = self.controller.dialog().visible_text() else {
            return;
        };

        let painter = ui.painter();
        let galley = painter.layout(
            text.to_string(),
            FontId::proportional(13.0),
            self.theme.bubble_text,
            style::BUBBLE_WIDTH - 2.0 * style::BUBBLE_PADDING,
        );
        let bubble_size = galley.size() + Vec2::splat(2.0 * style::BUBBLE_PADDING);
        let mut bubble_min = pos2(
            widget_rect.center().x - bubble_size.x / 2.0,
            widget_rect.top() - bubble_size.y - 8.0,
        );
        bubble_min.x = bubble_min
            .x
            .min(screen.right() - bubble_size.x + MARGIN_RIGHT)
            .max(screen.left());
        bubble_min.y = bubble_min.y.max(screen.top());
        let bubble = Rect::from_min_size(bubble_min, bubble_size);

        painter.rect_filled(bubble, Rounding::same(10.0), self.theme.bubble_bg);
        painter.rect_stroke(
            bubble,
            Rounding::same(10.0),
            Stroke::new(1.0, self.theme.bubble_border),
        );
        painter.galley(
            bubble.min + Vec2::splat(style::BUBBLE_PADDING),
            galley,
            self.theme.bubble_text,
        );
    }
}

/// Whether the gesture in flight comes from a touch screen. Mouse drags are
/// never gated by the touch-drag preference, only real touches are.
fn touch_gesture(ctx: &egui::Context) -> bool {
    ctx.input(|i| i.any_touches())
}

fn docked_origin(screen: Rect, alignment: Alignment, size: Vec2) -> Pos2 {
    let x = match alignment {
        Alignment::Left => screen.left(),
        Alignment::Right => screen.right() - size.x + MARGIN_RIGHT,
    };
    pos2(x, screen.bottom() - size.y)
}
