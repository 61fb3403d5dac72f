//! Button monitoring
//!
//! Polls the button source at 1 kHz and records an event into the store
//! whenever the pressed set changes. Only edges produce events; a held
//! button generates exactly one.

use embassy_time::Instant;

use super::traits::ButtonInput;
use crate::core::scheduler::{Pacer, TaskMetadata};
use crate::state::{ButtonEvent, ButtonMask, SampleStore};

const BUTTON_TASK: TaskMetadata = TaskMetadata {
    name: "buttons",
    rate_hz: 1000,
    budget_us: 200,
};

/// Edge detector over a [`ButtonInput`]
pub struct ButtonMonitor<B: ButtonInput> {
    input: B,
    last: ButtonMask,
}

impl<B: ButtonInput> ButtonMonitor<B> {
    /// Start with all buttons assumed released
    pub fn new(input: B) -> Self {
        Self {
            input,
            last: ButtonMask::empty(),
        }
    }

    /// Poll once; `Some(event)` when the pressed set changed
    pub fn poll(&mut self, timestamp_ms: u64) -> Option<ButtonEvent> {
        let current = self.input.poll();
        if current == self.last {
            return None;
        }
        self.last = current;
        Some(ButtonEvent {
            timestamp_ms,
            buttons: current,
            dirty: true,
        })
    }
}

/// 1 kHz button polling loop
pub async fn run_button_task<B: ButtonInput>(mut monitor: ButtonMonitor<B>, store: &SampleStore) -> ! {
    let mut pacer = Pacer::new(BUTTON_TASK);

    loop {
        pacer.enter();

        let timestamp_ms = Instant::now().as_millis();
        if let Some(event) = monitor.poll(timestamp_ms) {
            if store.record_buttons(event).await.is_err() {
                crate::log_debug!("button store contended, edge dropped");
            }
        }

        pacer.pace().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::devices::mock::MockButtons;

    #[test]
    fn test_press_and_release_edges() {
        let input = MockButtons::script(&[
            ButtonMask::empty(),
            ButtonMask::PRIMARY,
            ButtonMask::PRIMARY,
            ButtonMask::empty(),
        ]);
        let mut monitor = ButtonMonitor::new(input);

        assert_eq!(monitor.poll(0), None);

        let press = monitor.poll(1).expect("press edge");
        assert_eq!(press.buttons, ButtonMask::PRIMARY);
        assert_eq!(press.timestamp_ms, 1);
        assert!(press.dirty);

        // Held: no new event
        assert_eq!(monitor.poll(2), None);

        let release = monitor.poll(3).expect("release edge");
        assert!(release.buttons.is_empty());
    }

    #[test]
    fn test_simultaneous_buttons_in_one_event() {
        let input = MockButtons::script(&[ButtonMask::PRIMARY | ButtonMask::SECONDARY]);
        let mut monitor = ButtonMonitor::new(input);

        let event = monitor.poll(7).expect("edge");
        assert_eq!(event.buttons, ButtonMask::PRIMARY | ButtonMask::SECONDARY);
    }

    #[test]
    fn test_no_edge_no_event() {
        let input = MockButtons::script(&[]);
        let mut monitor = ButtonMonitor::new(input);
        for ts in 0..10 {
            assert_eq!(monitor.poll(ts), None);
        }
    }
}
