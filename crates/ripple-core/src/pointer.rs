use crate::constants::POINTER_SPEED_MAX;
use glam::Vec2;

/// One pointer snapshot consumed by a physics step.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct PointerSample {
    pub position: Vec2,
    pub velocity: Vec2,
}

impl PointerSample {
    /// A sample with no motion; never injects energy.
    pub fn at_rest(position: Vec2) -> Self {
        Self {
            position,
            velocity: Vec2::ZERO,
        }
    }

    #[inline]
    pub fn speed(&self) -> f32 {
        self.velocity.length()
    }
}

/// Current and previous normalised pointer position.
///
/// Pointer events call [`PointerState::record`] as often as they like; the
/// frame loop calls [`PointerState::take_sample`] once per physics step. The
/// velocity of a sample is the motion since the previous sample, so a pointer
/// that stops moving yields zero speed on the next step.
#[derive(Clone, Copy, Debug, Default)]
pub struct PointerState {
    current: Option<Vec2>,
    previous: Option<Vec2>,
}

impl PointerState {
    pub fn record(&mut self, uv: Vec2) {
        self.current = Some(uv.clamp(Vec2::ZERO, Vec2::ONE));
    }

    /// Pointer left the surface. Pending motion is dropped and the next
    /// recorded position starts a new stroke with zero velocity.
    pub fn leave(&mut self) {
        self.current = None;
        self.previous = None;
    }

    pub fn position(&self) -> Option<Vec2> {
        self.current
    }

    pub fn take_sample(&mut self) -> PointerSample {
        let Some(current) = self.current else {
            return PointerSample::at_rest(Vec2::splat(0.5));
        };
        let velocity = match self.previous {
            Some(prev) => (current - prev).clamp_length_max(POINTER_SPEED_MAX),
            None => Vec2::ZERO,
        };
        self.previous = Some(current);
        PointerSample {
            position: current,
            velocity,
        }
    }
}

/// Normalise a client-space point against a bounding rect.
///
/// Returns `None` for points outside the rect or for a degenerate rect.
#[inline]
pub fn normalize_in_rect(client: Vec2, origin: Vec2, size: Vec2) -> Option<Vec2> {
    if !(size.x > 0.0 && size.y > 0.0) {
        return None;
    }
    let uv = (client - origin) / size;
    if uv.x < 0.0 || uv.y < 0.0 || uv.x > 1.0 || uv.y > 1.0 {
        return None;
    }
    Some(uv)
}
