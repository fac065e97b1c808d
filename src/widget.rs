use crate::branding::SURFACE_ID;
use crate::config::{Alignment, RunMode, TouchReaction, WidgetConfig};
use crate::dialog::{DialogScheduler, DialogText, Priority};
use crate::drag::{DragBounds, DragController, DragOutcome, MARGIN_RIGHT};
use crate::engine::ModelHandle;
use crate::events::{LoadRequest, ModelResult};
use crate::menu::{self, MenuAction, MenuCommand};
use crate::prefs::{PrefStore, KEY_ALIGNMENT, KEY_MODEL, KEY_TOUCH_DRAG, KEY_VISIBLE};
use eframe::egui::{pos2, Pos2, Rect, Vec2};
use log::{error, info, warn};
use std::time::Instant;
use url::Url;

const DEFAULT_WELCOME: &str = "Welcome! Poke the menu to look around~";
const DEFAULT_REFERRER_WELCOME: &str = "Welcome, friend from \u{201c}%t\u{201d}!";
const DEFAULT_SKIN_DONE: &str = "The new outfit looks great~";
const FLIP_CONFIRMATION: &str = "Look, I came over! \u{30fe}(\u{2267}\u{25bd}\u{2266})\u{309d}";
const TOUCH_DRAG_ON: &str = "Touch drag is on\nyou can move me around now~";
const TOUCH_DRAG_OFF: &str = "Touch drag is off\nno more moving me~";
const TOUCH_DRAG_ON_HOVER: &str = "Touch drag: on\ntap to turn it off";
const TOUCH_DRAG_OFF_HOVER: &str = "Touch drag: off\ntap to turn it on";

const DEFAULT_TOUCH_TEXTS: [&str; 4] = [
    "What are you doing?",
    "Poke me again and see what happens!",
    "Hey, that tickles!",
    "Don't bully me like that!",
];

/// Capabilities and signals supplied by the host at construction. The
/// dark-mode toggle is an injected function value, never interpreted text.
#[derive(Default)]
pub struct HostContext {
    pub narrow_viewport: bool,
    pub referrer: Option<String>,
    pub night_toggle: Option<Box<dyn FnMut()>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Hidden,
    Shown,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Position {
    /// Corner-anchored default, derived from alignment by the shell.
    Docked,
    /// Manually dragged absolute top-left.
    Free(Pos2),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MenuEffect {
    None,
    OpenUrl(String),
}

/// Owns all widget state; every observable mutation goes through the
/// operations below so the alignment and model-index invariants hold at
/// every boundary.
pub struct WidgetController {
    config: WidgetConfig,
    host: HostContext,
    prefs: PrefStore,
    dialog: DialogScheduler,
    drag: DragController,
    menu: Vec<MenuCommand>,
    phase: Phase,
    alignment: Alignment,
    model_index: usize,
    touch_drag_enabled: bool,
    position: Position,
    model: Option<Box<dyn ModelHandle>>,
    interactions: Vec<TouchReaction>,
    pending_load: Option<usize>,
    confirm_next_load: bool,
    outbox: Vec<LoadRequest>,
}

impl WidgetController {
    pub fn new(config: WidgetConfig, host: HostContext, prefs: PrefStore, now: Instant) -> Self {
        let menu = menu::build_menu(
            &config.content,
            config.models.len(),
            host.night_toggle.is_some(),
            host.narrow_viewport,
        );
        let interactions = default_interactions(&config);
        let alignment = config.default_alignment;

        let mut controller = Self {
            config,
            host,
            prefs,
            dialog: DialogScheduler::new(),
            drag: DragController::new(),
            menu,
            phase: Phase::Hidden,
            alignment,
            model_index: 0,
            touch_drag_enabled: false,
            position: Position::Docked,
            model: None,
            interactions,
            pending_load: None,
            confirm_next_load: false,
            outbox: Vec::new(),
        };

        // Absent visibility is the first-run condition: force hidden and
        // persist it, so the next visit reads a definite answer.
        let visible = controller.prefs.get(KEY_VISIBLE, |v| v == "0" || v == "1", "0") == "1";
        if visible {
            controller.enter_shown(now);
        } else {
            controller.enter_hidden();
        }
        controller
    }

    pub fn tick(&mut self, now: Instant) {
        self.dialog.tick(now);
    }

    // -- lifecycle ---------------------------------------------------------

    fn enter_hidden(&mut self) {
        self.phase = Phase::Hidden;
        self.dialog.dismiss();
        self.alignment = self.read_alignment();
        self.position = Position::Docked;
        self.model = None;
        self.pending_load = None;
        self.confirm_next_load = false;
    }

    fn enter_shown(&mut self, now: Instant) {
        // The store is the single source of truth for these two fields;
        // re-validate them before anything else.
        self.alignment = self.read_alignment();
        self.model_index = self.read_model_index();
        self.touch_drag_enabled = self.read_touch_drag();
        self.phase = Phase::Shown;
        self.dialog.show(self.welcome_request(), Priority::Forced, now);
        self.request_load();
    }

    /// A no-move release on the wake affordance.
    pub fn wake(&mut self, now: Instant) {
        if self.phase == Phase::Shown {
            return;
        }
        self.prefs.set(KEY_VISIBLE, "1");
        self.enter_shown(now);
    }

    pub fn close(&mut self) {
        self.prefs.set(KEY_VISIBLE, "0");
        self.enter_hidden();
    }

    fn welcome_request(&self) -> DialogText {
        if let Some(referrer_host) = self.referrer_host() {
            let template = self
                .config
                .content
                .referrer
                .clone()
                .unwrap_or_else(|| DEFAULT_REFERRER_WELCOME.to_string());
            return DialogText::One(template.replace("%t", &referrer_host));
        }
        if self.config.content.welcome.is_empty() {
            DialogText::One(DEFAULT_WELCOME.to_string())
        } else {
            DialogText::OneOf(self.config.content.welcome.clone())
        }
    }

    /// The referring host, only when it differs from our own site's host.
    fn referrer_host(&self) -> Option<String> {
        let referrer = self.host.referrer.as_deref()?;
        let referrer_host = Url::parse(referrer).ok()?.host_str()?.to_string();
        let own_host = Url::parse(&self.config.home_url)
            .ok()
            .and_then(|u| u.host_str().map(str::to_string));
        if own_host.as_deref() == Some(referrer_host.as_str()) {
            None
        } else {
            Some(referrer_host)
        }
    }

    // -- model loading -----------------------------------------------------

    fn request_load(&mut self) {
        let Some(entry) = self.config.models.get(self.model_index) else {
            warn!("model roster is empty, nothing to load");
            return;
        };
        info!("requesting model load: {}", entry.name);
        self.pending_load = Some(self.model_index);
        self.outbox.push(LoadRequest {
            surface: SURFACE_ID.to_string(),
            model_index: self.model_index,
            name: entry.name.clone(),
            asset: entry.asset.clone(),
        });
    }

    pub fn take_load_requests(&mut self) -> Vec<LoadRequest> {
        std::mem::take(&mut self.outbox)
    }

    /// Completion notification from the loader. Failures are logged and the
    /// widget keeps its current visual state.
    pub fn model_ready(&mut self, result: ModelResult, now: Instant) {
        let Some(mut handle) = result.handle else {
            error!("model load failed: {}", result.name);
            if self.pending_load == Some(result.model_index) {
                self.pending_load = None;
            }
            return;
        };
        if self.pending_load != Some(result.model_index) {
            info!("dropping stale model load: {}", result.name);
            return;
        }
        self.pending_load = None;

        let custom = self.config.customization_for(&result.name).cloned();
        if let Some(custom) = &custom {
            if !custom.interactions.is_empty() {
                self.interactions = custom.interactions.clone();
            } else {
                self.interactions = default_interactions(&self.config);
            }
            if let Some(motion) = &custom.on_load_motion {
                handle.play_motion(motion);
            }
        } else {
            self.interactions = default_interactions(&self.config);
        }
        self.model = Some(handle);

        if self.confirm_next_load {
            self.confirm_next_load = false;
            let text = custom
                .and_then(|c| c.confirmation)
                .or_else(|| self.config.content.skin_done.clone())
                .unwrap_or_else(|| DEFAULT_SKIN_DONE.to_string());
            self.dialog.show(text, Priority::Forced, now);
        }
    }

    /// Skin command: advance the roster, persist, detach the old model and
    /// dock again while the new one loads.
    pub fn switch_model(&mut self) {
        if self.config.models.len() < 2 {
            return;
        }
        self.model_index = (self.model_index + 1) % self.config.models.len();
        self.prefs.set(KEY_MODEL, &self.model_index.to_string());
        self.model = None;
        self.position = Position::Docked;
        self.confirm_next_load = true;
        self.request_load();
    }

    // -- alignment and touch drag ------------------------------------------

    /// Toggle docking side and place the widget at the horizontally
    /// symmetric position so the flip reads as continuous.
    pub fn flip_alignment(&mut self, now: Instant, viewport: Vec2, widget_rect: Rect) {
        self.alignment = self.alignment.flipped();
        self.prefs.set(KEY_ALIGNMENT, self.alignment.as_str());

        let left = viewport.x - widget_rect.width() - widget_rect.left() + MARGIN_RIGHT;
        self.position = Position::Free(pos2(left, widget_rect.top()));
        self.dialog.show(FLIP_CONFIRMATION, Priority::Forced, now);
    }

    pub fn toggle_touch_drag(&mut self, now: Instant) {
        self.touch_drag_enabled = !self.touch_drag_enabled;
        self.prefs.set(
            KEY_TOUCH_DRAG,
            if self.touch_drag_enabled { "true" } else { "false" },
        );
        let text = if self.touch_drag_enabled {
            TOUCH_DRAG_ON
        } else {
            TOUCH_DRAG_OFF
        };
        self.dialog.show(text, Priority::Forced, now);
    }

    // -- menu --------------------------------------------------------------

    pub fn menu(&self) -> &[MenuCommand] {
        &self.menu
    }

    pub fn menu_enabled(&self) -> bool {
        self.phase == Phase::Shown
            && matches!(self.config.mode, RunMode::Fixed | RunMode::Draggable)
    }

    pub fn preview(&mut self, action: MenuAction, now: Instant) {
        if !self.menu_enabled() {
            return;
        }
        let text = match action {
            MenuAction::ToggleTouchDrag => {
                if self.touch_drag_enabled {
                    TOUCH_DRAG_ON_HOVER.to_string()
                } else {
                    TOUCH_DRAG_OFF_HOVER.to_string()
                }
            }
            _ => match self.menu.iter().find(|c| c.action == action) {
                Some(command) => command.hover_message.clone(),
                None => return,
            },
        };
        self.dialog.show(text, Priority::Normal, now);
    }

    pub fn activate(
        &mut self,
        action: MenuAction,
        now: Instant,
        viewport: Vec2,
        widget_rect: Rect,
    ) -> MenuEffect {
        if !self.menu_enabled() {
            return MenuEffect::None;
        }
        match action {
            MenuAction::Home => MenuEffect::OpenUrl(self.config.home_url.clone()),
            MenuAction::Info => MenuEffect::OpenUrl(self.config.info_url.clone()),
            MenuAction::Night => {
                if let Some(toggle) = self.host.night_toggle.as_mut() {
                    toggle();
                }
                MenuEffect::None
            }
            MenuAction::SwitchSkin => {
                self.switch_model();
                MenuEffect::None
            }
            MenuAction::FlipAlignment => {
                self.flip_alignment(now, viewport, widget_rect);
                MenuEffect::None
            }
            MenuAction::ToggleTouchDrag => {
                self.toggle_touch_drag(now);
                MenuEffect::None
            }
            MenuAction::Close => {
                self.close();
                MenuEffect::None
            }
        }
    }

    // -- character interaction ---------------------------------------------

    /// A confirmed click (not a drag) on the character. Speaks a random
    /// entry from the active interaction set and plays exactly one motion
    /// per tap: the reaction's own motion when it has one, otherwise the
    /// motion routed from the hit regions under the pointer. Suppressed
    /// while a motion is already playing.
    pub fn character_clicked(&mut self, model_point: Vec2, now: Instant) {
        if self.phase != Phase::Shown {
            return;
        }
        if self.model.as_ref().is_some_and(|m| m.is_motion_playing()) {
            return;
        }

        let reaction = if self.interactions.is_empty() {
            None
        } else {
            let pick = rand::random::<usize>() % self.interactions.len();
            Some(self.interactions[pick].clone())
        };

        let motion = reaction.as_ref().and_then(|r| r.motion.clone()).or_else(|| {
            let model = self.model.as_ref()?;
            let regions = model.hit_regions_at(model_point);
            route_hit(&regions).map(str::to_string)
        });
        if let (Some(motion), Some(model)) = (motion, self.model.as_mut()) {
            model.play_motion(&motion);
        }

        if let Some(reaction) = reaction {
            self.dialog.show(reaction.text, Priority::Normal, now);
        }
    }

    // -- dragging ----------------------------------------------------------

    pub fn drag_allowed(&self, touch: bool) -> bool {
        match self.phase {
            // The wake affordance is drag-enabled in every mode.
            Phase::Hidden => true,
            Phase::Shown => {
                self.config.mode == RunMode::Draggable
                    && (!touch || self.touch_drag_enabled)
            }
        }
    }

    pub fn begin_drag(&mut self, pointer: Pos2, widget_origin: Pos2, touch: bool) {
        if !self.drag_allowed(touch) {
            return;
        }
        self.drag.begin(pointer, widget_origin);
    }

    pub fn drag_to(&mut self, pointer: Pos2, viewport: Vec2, widget_size: Vec2) -> Option<Pos2> {
        let bounds = DragBounds::for_widget(viewport, widget_size);
        let origin = self.drag.update(pointer, bounds)?;
        self.position = Position::Free(origin);
        Some(origin)
    }

    /// Release or cancel. A no-move release while hidden wakes the widget;
    /// a drag must never also fire click semantics.
    pub fn end_drag(&mut self, now: Instant) -> Option<DragOutcome> {
        let outcome = self.drag.end()?;
        if outcome == DragOutcome::Click && self.phase == Phase::Hidden {
            self.wake(now);
        }
        Some(outcome)
    }

    pub fn drag_active(&self) -> bool {
        self.drag.is_active()
    }

    // -- accessors ---------------------------------------------------------

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn alignment(&self) -> Alignment {
        self.alignment
    }

    pub fn model_index(&self) -> usize {
        self.model_index
    }

    pub fn position(&self) -> Position {
        self.position
    }

    pub fn dialog(&self) -> &DialogScheduler {
        &self.dialog
    }

    pub fn current_model_name(&self) -> Option<&str> {
        self.config.models.get(self.model_index).map(|m| m.name.as_str())
    }

    pub fn has_model(&self) -> bool {
        self.model.is_some()
    }

    pub fn model(&self) -> Option<&dyn ModelHandle> {
        self.model.as_deref()
    }

    pub fn prefs(&self) -> &PrefStore {
        &self.prefs
    }

    // -- validated reads ---------------------------------------------------

    fn read_alignment(&mut self) -> Alignment {
        let default = self.config.default_alignment;
        let value = self
            .prefs
            .get(KEY_ALIGNMENT, |v| Alignment::parse(v).is_some(), default.as_str());
        Alignment::parse(&value).unwrap_or(default)
    }

    fn read_model_index(&mut self) -> usize {
        let count = self.config.models.len().max(1);
        let value = self.prefs.get(
            KEY_MODEL,
            |v| v.parse::<usize>().map_or(false, |n| n < count),
            "0",
        );
        value.parse().unwrap_or(0)
    }

    fn read_touch_drag(&mut self) -> bool {
        self.prefs
            .get(KEY_TOUCH_DRAG, |v| v == "true" || v == "false", "false")
            == "true"
    }
}

fn default_interactions(config: &WidgetConfig) -> Vec<TouchReaction> {
    if config.content.touch.is_empty() {
        DEFAULT_TOUCH_TEXTS
            .iter()
            .map(|t| TouchReaction::text_only(*t))
            .collect()
    } else {
        config
            .content
            .touch
            .iter()
            .map(|t| TouchReaction::text_only(t.clone()))
            .collect()
    }
}

fn route_hit(regions: &[String]) -> Option<&'static str> {
    if regions.iter().any(|r| r.eq_ignore_ascii_case("body")) {
        Some("tap_body")
    } else if regions.iter().any(|r| r.eq_ignore_ascii_case("head")) {
        Some("flick_head")
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ModelCustomization, ModelEntry};
    use crate::prefs::MemStore;
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    struct FakeModel {
        motions: Arc<Mutex<Vec<String>>>,
        playing: bool,
    }

    impl FakeModel {
        fn boxed(motions: Arc<Mutex<Vec<String>>>) -> Box<dyn ModelHandle> {
            Box::new(Self {
                motions,
                playing: false,
            })
        }
    }

    impl ModelHandle for FakeModel {
        fn size(&self) -> Vec2 {
            Vec2::new(140.0, 200.0)
        }
        fn set_scale(&mut self, _factor: f32) {}
        fn set_position(&mut self, _x: f32, _y: f32) {}
        fn play_motion(&mut self, name: &str) {
            self.motions.lock().expect("lock").push(name.to_string());
        }
        fn is_motion_playing(&self) -> bool {
            self.playing
        }
        fn hit_regions_at(&self, _point: Vec2) -> Vec<String> {
            vec!["body".to_string()]
        }
    }

    fn roster(count: usize) -> Vec<ModelEntry> {
        (0..count)
            .map(|i| ModelEntry {
                name: format!("model{i}"),
                asset: format!("models/model{i}.json"),
            })
            .collect()
    }

    fn controller_with(
        seed: &[(&str, &str)],
        config: WidgetConfig,
        host: HostContext,
    ) -> WidgetController {
        let prefs = PrefStore::new(Box::new(MemStore::seeded(seed)));
        WidgetController::new(config, host, prefs, Instant::now())
    }

    fn controller(seed: &[(&str, &str)]) -> WidgetController {
        controller_with(seed, WidgetConfig::default(), HostContext::default())
    }

    fn ready(index: usize, name: &str, motions: &Arc<Mutex<Vec<String>>>) -> ModelResult {
        ModelResult {
            model_index: index,
            name: name.to_string(),
            handle: Some(FakeModel::boxed(Arc::clone(motions))),
        }
    }

    fn widget_rect(left: f32, top: f32) -> Rect {
        Rect::from_min_size(pos2(left, top), Vec2::new(140.0, 200.0))
    }

    #[test]
    fn first_visit_constructs_hidden_and_persists_zero() {
        let ctrl = controller(&[]);
        assert_eq!(ctrl.phase(), Phase::Hidden);
        assert_eq!(ctrl.prefs().raw(KEY_VISIBLE).as_deref(), Some("0"));
        assert!(ctrl.dialog().visible_text().is_none());
    }

    #[test]
    fn persisted_state_restores_shown_with_alignment_and_model() {
        let mut ctrl = controller(&[
            (KEY_VISIBLE, "1"),
            (KEY_ALIGNMENT, "right"),
            (KEY_MODEL, "1"),
        ]);
        assert_eq!(ctrl.phase(), Phase::Shown);
        assert_eq!(ctrl.alignment(), Alignment::Right);
        assert_eq!(ctrl.model_index(), 1);

        let requests = ctrl.take_load_requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].model_index, 1);
        assert_eq!(requests[0].name, "model1");
    }

    #[test]
    fn out_of_range_model_index_clamps_to_zero_and_rewrites() {
        let config = WidgetConfig {
            models: roster(5),
            ..WidgetConfig::default()
        };
        let ctrl = controller_with(
            &[(KEY_VISIBLE, "1"), (KEY_MODEL, "99")],
            config,
            HostContext::default(),
        );
        assert_eq!(ctrl.model_index(), 0);
        assert_eq!(ctrl.prefs().raw(KEY_MODEL).as_deref(), Some("0"));
    }

    #[test]
    fn invalid_alignment_self_heals_to_default() {
        let ctrl = controller(&[(KEY_VISIBLE, "1"), (KEY_ALIGNMENT, "sideways")]);
        assert_eq!(ctrl.alignment(), Alignment::Right);
        assert_eq!(ctrl.prefs().raw(KEY_ALIGNMENT).as_deref(), Some("right"));
    }

    #[test]
    fn skin_switch_wraps_modulo_roster_and_persists_each_step() {
        let config = WidgetConfig {
            models: roster(3),
            ..WidgetConfig::default()
        };
        let mut ctrl =
            controller_with(&[(KEY_VISIBLE, "1")], config, HostContext::default());
        for n in 1..=5usize {
            ctrl.switch_model();
            assert_eq!(ctrl.model_index(), n % 3);
            assert_eq!(
                ctrl.prefs().raw(KEY_MODEL).as_deref(),
                Some(format!("{}", n % 3).as_str())
            );
        }
    }

    #[test]
    fn switch_on_single_model_roster_is_a_no_op() {
        let config = WidgetConfig {
            models: roster(1),
            ..WidgetConfig::default()
        };
        let mut ctrl =
            controller_with(&[(KEY_VISIBLE, "1")], config, HostContext::default());
        ctrl.take_load_requests();
        ctrl.switch_model();
        assert_eq!(ctrl.model_index(), 0);
        assert!(ctrl.take_load_requests().is_empty());
    }

    #[test]
    fn flip_from_right_persists_left_and_shows_forced_confirmation() {
        let mut ctrl = controller(&[(KEY_VISIBLE, "1"), (KEY_ALIGNMENT, "right")]);
        let now = Instant::now() + Duration::from_millis(600);
        ctrl.tick(now); // welcome lock has expired by interaction time

        ctrl.flip_alignment(now, Vec2::new(1280.0, 720.0), widget_rect(1150.0, 500.0));
        assert_eq!(ctrl.alignment(), Alignment::Left);
        assert_eq!(ctrl.prefs().raw(KEY_ALIGNMENT).as_deref(), Some("left"));
        assert!(ctrl.dialog().visible_text().is_some());
        assert!(ctrl.dialog().is_locked());

        // Symmetric horizontal position: vw - w - left + right margin.
        match ctrl.position() {
            Position::Free(p) => {
                assert_eq!(p.x, 1280.0 - 140.0 - 1150.0 + MARGIN_RIGHT);
                assert_eq!(p.y, 500.0);
            }
            Position::Docked => panic!("flip must keep the live position continuous"),
        }
    }

    #[test]
    fn welcome_names_a_foreign_referrer_host() {
        let host = HostContext {
            referrer: Some("https://other.example.net/some/page".to_string()),
            ..HostContext::default()
        };
        let ctrl = controller_with(&[(KEY_VISIBLE, "1")], WidgetConfig::default(), host);
        let text = ctrl.dialog().visible_text().expect("welcome shown");
        assert!(text.contains("other.example.net"));
        assert!(ctrl.dialog().is_locked());
    }

    #[test]
    fn welcome_is_generic_for_own_site_referrer() {
        let host = HostContext {
            referrer: Some("https://example.com/inner".to_string()),
            ..HostContext::default()
        };
        let ctrl = controller_with(&[(KEY_VISIBLE, "1")], WidgetConfig::default(), host);
        assert_eq!(ctrl.dialog().visible_text(), Some(DEFAULT_WELCOME));
    }

    #[test]
    fn welcome_fires_once_per_shown_entry() {
        let mut ctrl = controller(&[(KEY_VISIBLE, "1")]);
        assert!(ctrl.dialog().visible_text().is_some());

        let later = Instant::now() + Duration::from_secs(5);
        ctrl.tick(later);
        assert!(ctrl.dialog().visible_text().is_none());

        ctrl.close();
        ctrl.wake(later);
        assert!(ctrl.dialog().visible_text().is_some());
    }

    #[test]
    fn drag_release_wakes_only_without_movement() {
        let mut ctrl = controller(&[]);
        let now = Instant::now();
        assert_eq!(ctrl.phase(), Phase::Hidden);

        ctrl.begin_drag(pos2(20.0, 700.0), pos2(10.0, 690.0), false);
        ctrl.drag_to(pos2(400.0, 300.0), Vec2::new(1280.0, 720.0), Vec2::new(44.0, 44.0));
        assert_eq!(ctrl.end_drag(now), Some(DragOutcome::Drag));
        assert_eq!(ctrl.phase(), Phase::Hidden);

        ctrl.begin_drag(pos2(20.0, 700.0), pos2(10.0, 690.0), false);
        assert_eq!(ctrl.end_drag(now), Some(DragOutcome::Click));
        assert_eq!(ctrl.phase(), Phase::Shown);
        assert_eq!(ctrl.prefs().raw(KEY_VISIBLE).as_deref(), Some("1"));
    }

    #[test]
    fn close_clears_dialog_and_resets_to_docked() {
        let mut ctrl = controller(&[(KEY_VISIBLE, "1")]);
        ctrl.drag_to(pos2(500.0, 300.0), Vec2::new(1280.0, 720.0), Vec2::new(140.0, 200.0));
        ctrl.close();
        assert_eq!(ctrl.phase(), Phase::Hidden);
        assert_eq!(ctrl.prefs().raw(KEY_VISIBLE).as_deref(), Some("0"));
        assert!(ctrl.dialog().visible_text().is_none());
        assert_eq!(ctrl.position(), Position::Docked);
    }

    #[test]
    fn stale_model_ready_is_dropped() {
        let motions = Arc::new(Mutex::new(Vec::new()));
        let config = WidgetConfig {
            models: roster(3),
            customizations: Vec::new(),
            ..WidgetConfig::default()
        };
        let mut ctrl =
            controller_with(&[(KEY_VISIBLE, "1")], config, HostContext::default());
        let now = Instant::now();

        ctrl.switch_model(); // pending load is now index 1
        ctrl.model_ready(ready(0, "model0", &motions), now);
        assert!(!ctrl.has_model());

        ctrl.model_ready(ready(1, "model1", &motions), now);
        assert!(ctrl.has_model());
    }

    #[test]
    fn load_complete_after_switch_plays_motion_and_confirms() {
        let motions = Arc::new(Mutex::new(Vec::new()));
        let config = WidgetConfig {
            models: roster(2),
            customizations: vec![ModelCustomization {
                name: "model1".to_string(),
                confirmation: Some("New look, who dis?".to_string()),
                interactions: Vec::new(),
                on_load_motion: Some("entrance".to_string()),
            }],
            ..WidgetConfig::default()
        };
        let mut ctrl =
            controller_with(&[(KEY_VISIBLE, "1")], config, HostContext::default());
        let later = Instant::now() + Duration::from_secs(1);
        ctrl.tick(later);

        ctrl.switch_model();
        ctrl.model_ready(ready(1, "model1", &motions), later);
        assert_eq!(ctrl.dialog().visible_text(), Some("New look, who dis?"));
        assert_eq!(motions.lock().expect("lock").as_slice(), ["entrance"]);
    }

    #[test]
    fn load_failure_leaves_current_state_untouched() {
        let mut ctrl = controller(&[(KEY_VISIBLE, "1")]);
        let now = Instant::now();
        ctrl.model_ready(
            ModelResult {
                model_index: 0,
                name: "momo".to_string(),
                handle: None,
            },
            now,
        );
        assert_eq!(ctrl.phase(), Phase::Shown);
        assert!(!ctrl.has_model());
    }

    #[test]
    fn touch_drag_toggle_gates_touch_gestures_and_persists() {
        let host = HostContext {
            narrow_viewport: true,
            ..HostContext::default()
        };
        let mut ctrl = controller_with(&[(KEY_VISIBLE, "1")], WidgetConfig::default(), host);
        let later = Instant::now() + Duration::from_secs(1);
        ctrl.tick(later);

        assert!(!ctrl.drag_allowed(true));
        assert!(ctrl.drag_allowed(false));

        ctrl.toggle_touch_drag(later);
        assert!(ctrl.drag_allowed(true));
        assert_eq!(ctrl.prefs().raw(KEY_TOUCH_DRAG).as_deref(), Some("true"));

        ctrl.toggle_touch_drag(later + Duration::from_secs(1));
        assert!(!ctrl.drag_allowed(true));
        assert_eq!(ctrl.prefs().raw(KEY_TOUCH_DRAG).as_deref(), Some("false"));
    }

    #[test]
    fn static_mode_disables_menu_and_drag() {
        let config = WidgetConfig {
            mode: RunMode::Static,
            ..WidgetConfig::default()
        };
        let mut ctrl =
            controller_with(&[(KEY_VISIBLE, "1")], config, HostContext::default());
        assert!(!ctrl.menu_enabled());
        assert!(!ctrl.drag_allowed(false));

        // The welcome still fires; only menu and drag are disabled.
        assert!(ctrl.dialog().visible_text().is_some());

        let later = Instant::now() + Duration::from_secs(5);
        ctrl.tick(later);
        assert!(ctrl.dialog().visible_text().is_none());
        ctrl.preview(MenuAction::Home, later);
        assert!(ctrl.dialog().visible_text().is_none());
    }

    #[test]
    fn fixed_mode_has_menu_but_no_drag() {
        let config = WidgetConfig {
            mode: RunMode::Fixed,
            ..WidgetConfig::default()
        };
        let ctrl = controller_with(&[(KEY_VISIBLE, "1")], config, HostContext::default());
        assert!(ctrl.menu_enabled());
        assert!(!ctrl.drag_allowed(false));
    }

    #[test]
    fn menu_activation_returns_link_effects_and_runs_night_callback() {
        let toggled = Arc::new(Mutex::new(0usize));
        let counter = Arc::clone(&toggled);
        let host = HostContext {
            night_toggle: Some(Box::new(move || {
                *counter.lock().expect("lock") += 1;
            })),
            ..HostContext::default()
        };
        let mut ctrl = controller_with(&[(KEY_VISIBLE, "1")], WidgetConfig::default(), host);
        let now = Instant::now();
        let viewport = Vec2::new(1280.0, 720.0);
        let rect = widget_rect(0.0, 500.0);

        assert_eq!(
            ctrl.activate(MenuAction::Home, now, viewport, rect),
            MenuEffect::OpenUrl("https://example.com/".to_string())
        );
        assert_eq!(
            ctrl.activate(MenuAction::Night, now, viewport, rect),
            MenuEffect::None
        );
        assert_eq!(*toggled.lock().expect("lock"), 1);
    }

    #[test]
    fn hover_preview_is_dropped_while_welcome_lock_holds() {
        let mut ctrl = controller(&[(KEY_VISIBLE, "1")]);
        let now = Instant::now();
        let welcome = ctrl.dialog().visible_text().map(str::to_string);
        ctrl.preview(MenuAction::Home, now);
        assert_eq!(
            ctrl.dialog().visible_text().map(str::to_string),
            welcome
        );
    }

    #[test]
    fn character_click_speaks_and_routes_hit_motion() {
        let motions = Arc::new(Mutex::new(Vec::new()));
        let mut ctrl = controller(&[(KEY_VISIBLE, "1")]);
        let later = Instant::now() + Duration::from_secs(5);
        ctrl.tick(later);
        ctrl.model_ready(ready(0, "plain", &motions), later);

        ctrl.character_clicked(Vec2::new(70.0, 150.0), later);
        assert!(ctrl.dialog().visible_text().is_some());
        assert!(motions
            .lock()
            .expect("lock")
            .iter()
            .any(|m| m == "tap_body"));
    }

    #[test]
    fn reaction_motion_replaces_hit_routing_one_motion_per_tap() {
        let motions = Arc::new(Mutex::new(Vec::new()));
        let config = WidgetConfig {
            models: roster(1),
            customizations: vec![ModelCustomization {
                name: "model0".to_string(),
                confirmation: None,
                interactions: vec![TouchReaction {
                    text: "Eek!".to_string(),
                    motion: Some("shake".to_string()),
                }],
                on_load_motion: None,
            }],
            ..WidgetConfig::default()
        };
        let mut ctrl =
            controller_with(&[(KEY_VISIBLE, "1")], config, HostContext::default());
        let later = Instant::now() + Duration::from_secs(5);
        ctrl.tick(later);
        ctrl.model_ready(ready(0, "model0", &motions), later);

        // The pointer is on the body, but the reaction's motion wins and the
        // hit-routed one is skipped.
        ctrl.character_clicked(Vec2::new(70.0, 150.0), later);
        assert_eq!(motions.lock().expect("lock").as_slice(), ["shake"]);
        assert_eq!(ctrl.dialog().visible_text(), Some("Eek!"));
    }
}
