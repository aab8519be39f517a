//! Marker animation state
//!
//! An animation is a resumable value rather than a chain of frame callbacks:
//! it remembers where and when it started and is sampled with the current
//! time on every display refresh.

use super::events::EventId;
use super::graph::Position;

/// Identifies one on-screen marker
pub type MarkerId = u64;

#[derive(Debug, Clone, PartialEq)]
pub struct MarkerAnimation {
    pub marker: MarkerId,
    pub event_id: EventId,
    pub edge_id: String,
    pub source_node: String,
    pub target_node: String,
    pub from: Position,
    pub to: Position,
    /// Start time (ms)
    pub started_at: f64,
    /// Duration captured at start; later speed changes do not apply
    pub duration_ms: u32,
}

/// One sample of an animation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Frame {
    pub progress: f64,
    pub position: Position,
}

impl Frame {
    pub fn is_final(&self) -> bool {
        self.progress >= 1.0
    }
}

impl MarkerAnimation {
    /// Progress in [0, 1] at `now`
    pub fn progress(&self, now: f64) -> f64 {
        let elapsed = now - self.started_at;
        (elapsed / f64::from(self.duration_ms.max(1))).clamp(0.0, 1.0)
    }

    pub fn sample(&self, now: f64) -> Frame {
        let progress = self.progress(now);
        Frame {
            progress,
            position: self.from.lerp(self.to, progress),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn anim() -> MarkerAnimation {
        MarkerAnimation {
            marker: 1,
            event_id: "ev".into(),
            edge_id: "e1".into(),
            source_node: "A".into(),
            target_node: "B".into(),
            from: Position::new(0.0, 0.0),
            to: Position::new(200.0, 100.0),
            started_at: 1000.0,
            duration_ms: 1000,
        }
    }

    #[test]
    fn test_progress_is_clamped() {
        let a = anim();
        assert_eq!(a.progress(0.0), 0.0);
        assert_eq!(a.progress(1000.0), 0.0);
        assert_eq!(a.progress(1500.0), 0.5);
        assert_eq!(a.progress(9000.0), 1.0);
    }

    #[test]
    fn test_sample_interpolates_linearly() {
        let a = anim();
        let frame = a.sample(1250.0);
        assert_eq!(frame.position, Position::new(50.0, 25.0));
        assert!(!frame.is_final());

        let last = a.sample(2000.0);
        assert_eq!(last.position, a.to);
        assert!(last.is_final());
    }
}
