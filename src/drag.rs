use eframe::egui::{pos2, Pos2, Vec2};

// Boundary margins for the draggable widget. The top strip stays reserved
// for external chrome; the right margin lets the widget tuck slightly past
// the edge, matching its docked look.
pub const MARGIN_TOP: f32 = 30.0;
pub const MARGIN_RIGHT: f32 = -10.0;
pub const MARGIN_BOTTOM: f32 = 0.0;
pub const MARGIN_LEFT: f32 = 0.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragOutcome {
    /// Press and release with zero move events.
    Click,
    /// At least one move event happened; click semantics must not fire.
    Drag,
}

#[derive(Debug, Clone, Copy)]
struct Session {
    pointer_offset: Vec2,
    moved: bool,
}

#[derive(Debug, Clone, Copy)]
pub struct DragBounds {
    min: Pos2,
    max: Pos2,
}

impl DragBounds {
    pub fn for_widget(viewport: Vec2, widget: Vec2) -> Self {
        Self {
            min: pos2(MARGIN_LEFT, MARGIN_TOP),
            max: pos2(
                viewport.x - widget.x + MARGIN_RIGHT,
                viewport.y - widget.y + MARGIN_BOTTOM,
            ),
        }
    }

    // Clamp with the min bound winning when the viewport is smaller than
    // the widget on an axis.
    fn clamp(&self, target: Pos2) -> Pos2 {
        pos2(
            target.x.min(self.max.x).max(self.min.x),
            target.y.min(self.max.y).max(self.min.y),
        )
    }
}

/// One press-to-release gesture at a time. Idle -> Pressed -> (Dragging |
/// ReleasedAsClick) -> Idle; the caller learns which way it went from
/// [`DragController::end`].
#[derive(Debug, Default)]
pub struct DragController {
    session: Option<Session>,
}

impl DragController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Capture the pointer offset relative to the widget's current top-left.
    /// A press while a session is in flight is ignored; sessions never
    /// overlap.
    pub fn begin(&mut self, pointer: Pos2, widget_origin: Pos2) {
        if self.session.is_some() {
            return;
        }
        self.session = Some(Session {
            pointer_offset: pointer - widget_origin,
            moved: false,
        });
    }

    /// A move event: returns the new clamped widget origin, or `None` when no
    /// session is in flight.
    pub fn update(&mut self, pointer: Pos2, bounds: DragBounds) -> Option<Pos2> {
        let session = self.session.as_mut()?;
        session.moved = true;
        Some(bounds.clamp(pointer - session.pointer_offset))
    }

    /// Release or cancel. Runs full cleanup either way; a release without a
    /// matching press is a no-op.
    pub fn end(&mut self) -> Option<DragOutcome> {
        let session = self.session.take()?;
        Some(if session.moved {
            DragOutcome::Drag
        } else {
            DragOutcome::Click
        })
    }

    pub fn is_active(&self) -> bool {
        self.session.is_some()
    }
}
