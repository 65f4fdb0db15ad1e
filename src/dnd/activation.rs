use crate::{config::ActivationConfig, dnd::geometry::Point};
use std::time::Duration;

/// Input device that produced a press
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sensor {
    Mouse,
    Touch,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActivationState {
    /// Still waiting for the constraint to be met
    Pending,
    /// The press is now a drag; the host should emit drag-start
    Activated,
    /// The press will never become a drag (touch moved too far while held)
    Cancelled,
}

/// Decides when a pressed pointer turns into a drag.
///
/// Mouse presses activate once the pointer travels `mouse_distance`. Touch
/// presses activate after `touch_delay_ms` provided the finger stayed within
/// `touch_tolerance` of where it landed; moving further first cancels.
#[derive(Debug, Clone)]
pub struct ActivationTracker {
    sensor: Sensor,
    origin: Point,
    config: ActivationConfig,
    state: ActivationState,
}

impl ActivationTracker {
    pub fn new(sensor: Sensor, origin: Point, config: ActivationConfig) -> Self {
        Self {
            sensor,
            origin,
            config,
            state: ActivationState::Pending,
        }
    }

    pub fn state(&self) -> ActivationState {
        self.state
    }

    /// Feeds the current pointer position and time since the press
    pub fn update(&mut self, pointer: Point, elapsed: Duration) -> ActivationState {
        if self.state != ActivationState::Pending {
            return self.state;
        }

        let moved = self.origin.distance_to(&pointer);
        self.state = match self.sensor {
            Sensor::Mouse if moved >= self.config.mouse_distance => ActivationState::Activated,
            Sensor::Mouse => ActivationState::Pending,
            Sensor::Touch if moved > self.config.touch_tolerance => ActivationState::Cancelled,
            Sensor::Touch if elapsed >= Duration::from_millis(self.config.touch_delay_ms) => {
                ActivationState::Activated
            }
            Sensor::Touch => ActivationState::Pending,
        };
        self.state
    }
}
