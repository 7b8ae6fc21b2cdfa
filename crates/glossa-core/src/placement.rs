use glossa_types::{Placement, PopupPosition, Rect, Size};

/// Gap between trigger and popup along the primary axis
pub const MARGIN: f64 = 10.0;
/// Minimum distance between popup and any viewport edge
pub const EDGE_INSET: f64 = 10.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Position {
    pub placement: Placement,
    pub left: f64,
    pub top: f64,
}

/// Room around the trigger inside the viewport
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Space {
    pub above: f64,
    pub below: f64,
    pub left: f64,
    pub right: f64,
}

impl Space {
    pub fn around(trigger: Rect, viewport: Size) -> Self {
        Self {
            above: trigger.top(),
            below: viewport.height - trigger.bottom(),
            left: trigger.left(),
            right: viewport.width - trigger.right(),
        }
    }
}

/// First side with room, in bottom, top, right, left order; bottom otherwise
pub fn choose_placement(trigger: Rect, popup: Size, viewport: Size) -> Placement {
    let space = Space::around(trigger, viewport);

    if popup.height + MARGIN <= space.below {
        Placement::Bottom
    } else if popup.height + MARGIN <= space.above {
        Placement::Top
    } else if popup.width + MARGIN <= space.right {
        Placement::Right
    } else if popup.width + MARGIN <= space.left {
        Placement::Left
    } else {
        Placement::Bottom
    }
}

pub fn resolve_placement(mode: PopupPosition, trigger: Rect, popup: Size, viewport: Size) -> Placement {
    match mode {
        PopupPosition::Auto => choose_placement(trigger, popup, viewport),
        PopupPosition::Top => Placement::Top,
        PopupPosition::Bottom => Placement::Bottom,
        PopupPosition::Left => Placement::Left,
        PopupPosition::Right => Placement::Right,
    }
}

/// Placement plus clamped top-left corner for the popup
pub fn compute_position(mode: PopupPosition, trigger: Rect, popup: Size, viewport: Size) -> Position {
    let placement = resolve_placement(mode, trigger, popup, viewport);

    let centered_left = trigger.left() + (trigger.width - popup.width) / 2.0;
    let centered_top = trigger.top() + (trigger.height - popup.height) / 2.0;

    let (left, top) = match placement {
        Placement::Bottom => (centered_left, trigger.bottom() + MARGIN),
        Placement::Top => (centered_left, trigger.top() - popup.height - MARGIN),
        Placement::Right => (trigger.right() + MARGIN, centered_top),
        Placement::Left => (trigger.left() - popup.width - MARGIN, centered_top),
    };

    Position {
        placement,
        left: clamp_axis(left, popup.width, viewport.width),
        top: clamp_axis(top, popup.height, viewport.height),
    }
}

/// Pulls `start` back inside `[EDGE_INSET, extent - EDGE_INSET]`. When the
/// popup is larger than that range the leading edge wins.
fn clamp_axis(start: f64, length: f64, extent: f64) -> f64 {
    let mut start = start;
    if start + length > extent - EDGE_INSET {
        start = extent - length - EDGE_INSET;
    }
    if start < EDGE_INSET {
        start = EDGE_INSET;
    }
    start
}
