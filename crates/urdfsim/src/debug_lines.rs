//! Trails of debug lines, one per tracked position.
//!
//! Each frame the caller pushes the positions it wants to follow with
//! [`DebugLines::add_position`]; the n-th push of a frame goes to slot n.
//! [`DebugLines::draw`] then emits a segment from each slot's previous
//! position to its new one, so the viewer shows a trail.

use std::time::{Duration, Instant};

/// Default colours, cycled by slot.
pub const PALETTE: [[f64; 3]; 6] = [
    [1.0, 0.0, 0.0],
    [0.0, 1.0, 0.0],
    [0.0, 0.0, 1.0],
    [1.0, 1.0, 0.0],
    [1.0, 0.0, 1.0],
    [0.0, 1.0, 1.0],
];

/// Default line lifetime in the viewer (s).
pub const DEFAULT_DURATION: f64 = 30.0;

/// Line width passed to the viewer.
pub const LINE_WIDTH: f64 = 2.0;

/// Minimum wall-clock time between two draws.
const DRAW_PERIOD: Duration = Duration::from_millis(50);

/// A line segment ready for the viewer.
#[derive(Debug, Clone, PartialEq)]
pub struct DrawnLine {
    /// Start point (m).
    pub from: [f64; 3],
    /// End point (m).
    pub to: [f64; 3],
    /// RGB in `[0, 1]`.
    pub color: [f64; 3],
    /// Line width.
    pub width: f64,
    /// Lifetime in the viewer (s).
    pub duration: f64,
}

#[derive(Debug, Clone)]
struct LineSlot {
    from: Option<[f64; 3]>,
    to: [f64; 3],
    color: [f64; 3],
    duration: f64,
    update: bool,
}

/// Debug line slots and draw throttling.
#[derive(Debug, Clone, Default)]
pub struct DebugLines {
    slots: Vec<LineSlot>,
    current: usize,
    last_draw: Option<Instant>,
}

impl DebugLines {
    /// Create an empty buffer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the next position of the current slot.
    pub fn add_position(&mut self, position: [f64; 3], color: Option<[f64; 3]>, duration: f64) {
        let color = color.unwrap_or(PALETTE[self.current % PALETTE.len()]);

        if self.current >= self.slots.len() {
            self.slots.push(LineSlot {
                from: None,
                to: position,
                color,
                duration,
                update: true,
            });
        }

        let slot = &mut self.slots[self.current];
        slot.to = position;
        slot.color = color;
        slot.duration = duration;
        slot.update = true;

        self.current += 1;
    }

    /// Rewind the slot cursor and, unless the last draw was less than
    /// 50 ms before `now`, return the segments to draw.
    pub fn draw(&mut self, now: Instant) -> Vec<DrawnLine> {
        self.current = 0;

        if let Some(last) = self.last_draw {
            if now.saturating_duration_since(last) <= DRAW_PERIOD {
                return Vec::new();
            }
        }

        let mut lines = Vec::new();
        for slot in &mut self.slots {
            if let Some(from) = slot.from {
                if slot.update {
                    lines.push(DrawnLine {
                        from,
                        to: slot.to,
                        color: slot.color,
                        width: LINE_WIDTH,
                        duration: slot.duration,
                    });
                    slot.update = false;
                }
            }
            slot.from = Some(slot.to);
        }

        self.last_draw = Some(now);
        lines
    }

    /// Drop every slot.
    pub fn clear(&mut self) {
        self.slots.clear();
        self.current = 0;
    }

    /// Number of slots.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Whether there are no slots.
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_draw_only_sets_origin() {
        let mut lines = DebugLines::new();
        lines.add_position([1.0, 0.0, 0.0], None, DEFAULT_DURATION);
        assert!(lines.draw(Instant::now()).is_empty());
        assert_eq!(lines.len(), 1);
    }

    #[test]
    fn test_trail_segment() {
        let mut lines = DebugLines::new();
        let t0 = Instant::now();

        lines.add_position([0.0, 0.0, 0.0], None, DEFAULT_DURATION);
        lines.draw(t0);
        lines.add_position([1.0, 0.0, 0.0], None, 5.0);
        let drawn = lines.draw(t0 + Duration::from_millis(100));

        assert_eq!(
            drawn,
            vec![DrawnLine {
                from: [0.0, 0.0, 0.0],
                to: [1.0, 0.0, 0.0],
                color: PALETTE[0],
                width: LINE_WIDTH,
                duration: 5.0,
            }]
        );
    }

    #[test]
    fn test_draw_throttled() {
        let mut lines = DebugLines::new();
        let t0 = Instant::now();

        lines.add_position([0.0, 0.0, 0.0], None, DEFAULT_DURATION);
        lines.draw(t0);
        lines.add_position([1.0, 0.0, 0.0], None, DEFAULT_DURATION);
        assert!(lines.draw(t0 + Duration::from_millis(10)).is_empty());

        // The update is kept until a draw goes through
        lines.add_position([2.0, 0.0, 0.0], None, DEFAULT_DURATION);
        let drawn = lines.draw(t0 + Duration::from_millis(60));
        assert_eq!(drawn.len(), 1);
        assert_eq!(drawn[0].from, [0.0, 0.0, 0.0]);
        assert_eq!(drawn[0].to, [2.0, 0.0, 0.0]);
    }

    #[test]
    fn test_palette_cycles_by_slot() {
        let mut lines = DebugLines::new();
        for i in 0..7 {
            lines.add_position([i as f64, 0.0, 0.0], None, DEFAULT_DURATION);
        }
        let t0 = Instant::now();
        lines.draw(t0);
        for i in 0..7 {
            lines.add_position([i as f64, 1.0, 0.0], None, DEFAULT_DURATION);
        }
        let drawn = lines.draw(t0 + Duration::from_secs(1));

        assert_eq!(drawn.len(), 7);
        assert_eq!(drawn[1].color, PALETTE[1]);
        assert_eq!(drawn[6].color, PALETTE[0]);
    }

    #[test]
    fn test_explicit_color() {
        let mut lines = DebugLines::new();
        let t0 = Instant::now();
        lines.add_position([0.0; 3], Some([0.5, 0.5, 0.5]), DEFAULT_DURATION);
        lines.draw(t0);
        lines.add_position([0.0, 0.0, 1.0], Some([0.5, 0.5, 0.5]), DEFAULT_DURATION);
        let drawn = lines.draw(t0 + Duration::from_secs(1));
        assert_eq!(drawn[0].color, [0.5, 0.5, 0.5]);
    }

    #[test]
    fn test_stale_slot_not_redrawn() {
        let mut lines = DebugLines::new();
        let t0 = Instant::now();
        lines.add_position([0.0; 3], None, DEFAULT_DURATION);
        lines.draw(t0);
        lines.add_position([1.0, 0.0, 0.0], None, DEFAULT_DURATION);
        assert_eq!(lines.draw(t0 + Duration::from_millis(100)).len(), 1);

        // No new position for the slot: nothing drawn
        assert!(lines.draw(t0 + Duration::from_millis(200)).is_empty());
    }

    #[test]
    fn test_clear() {
        let mut lines = DebugLines::new();
        lines.add_position([0.0; 3], None, DEFAULT_DURATION);
        lines.clear();
        assert!(lines.is_empty());
    }
}
