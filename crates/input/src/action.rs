use glam::Vec2;

/// A high-level action produced from raw window input.
///
/// The scene consumes actions, never raw input events.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Action {
    /// Fire a shot through a point in normalized device coordinates.
    Fire { ndc: Vec2 },
    /// Orbit the camera by a pointer delta in pixels.
    Orbit(Vec2),
    /// Zoom by scroll lines; positive moves closer.
    Zoom(f32),
    /// Show or hide the diagnostics overlay.
    ToggleOverlay,
    /// No-op (used for input that isn't bound).
    Noop,
}

impl Action {
    /// Fire straight down the view axis.
    pub const FIRE_CENTRE: Action = Action::Fire { ndc: Vec2::ZERO };

    /// Fire from a cursor position in physical pixels.
    pub fn fire_at_cursor(cursor: Vec2, viewport: Vec2) -> Action {
        let size = viewport.max(Vec2::ONE);
        Action::Fire {
            ndc: Vec2::new(cursor.x / size.x * 2.0 - 1.0, 1.0 - cursor.y / size.y * 2.0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fire_centre_is_origin() {
        assert_eq!(Action::FIRE_CENTRE, Action::Fire { ndc: Vec2::ZERO });
    }

    #[test]
    fn cursor_maps_to_ndc() {
        let viewport = Vec2::new(800.0, 600.0);
        assert_eq!(
            Action::fire_at_cursor(Vec2::new(400.0, 300.0), viewport),
            Action::FIRE_CENTRE
        );
        assert_eq!(
            Action::fire_at_cursor(Vec2::ZERO, viewport),
            Action::Fire { ndc: Vec2::new(-1.0, 1.0) }
        );
        assert_eq!(
            Action::fire_at_cursor(viewport, viewport),
            Action::Fire { ndc: Vec2::new(1.0, -1.0) }
        );
    }

    #[test]
    fn other_actions_are_constructible() {
        assert!(matches!(Action::Orbit(Vec2::X), Action::Orbit(_)));
        assert!(matches!(Action::Zoom(1.0), Action::Zoom(_)));
        assert!(matches!(Action::ToggleOverlay, Action::ToggleOverlay));
        assert!(matches!(Action::Noop, Action::Noop));
    }
}
