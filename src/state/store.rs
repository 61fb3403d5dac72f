//! Bounded-wait shared sample store
//!
//! Two independent mutexes guard the latest IMU sample and the latest button
//! event. Every accessor is bounded: the async paths give up after
//! [`LOCK_TIMEOUT`] and the `try_` paths never wait at all. A caller that
//! loses the race skips the operation for that cycle — a stalled consumer
//! must never stall the producer. No lock is ever held across a send.

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::mutex::Mutex;
use embassy_time::{with_timeout, Duration};

use super::{ButtonEvent, ImuSample};

/// Longest a task will wait for either lock before skipping its cycle
pub const LOCK_TIMEOUT: Duration = Duration::from_millis(1000);

/// Store access failure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "pico2_w", derive(defmt::Format))]
pub enum StoreError {
    /// The lock could not be acquired within the bound; skip this cycle
    Contended,
}

/// Mutex-guarded holder of the latest IMU sample and button event
///
/// The two slots are deliberately separate locks: sampling and button
/// monitoring never contend with each other, and no ordering across the two
/// slots is guaranteed or needed.
pub struct SampleStore {
    imu: Mutex<CriticalSectionRawMutex, Option<ImuSample>>,
    button: Mutex<CriticalSectionRawMutex, ButtonEvent>,
}

impl SampleStore {
    /// Empty store: no sample yet, button slot idle
    pub const fn new() -> Self {
        Self {
            imu: Mutex::new(None),
            button: Mutex::new(ButtonEvent::idle()),
        }
    }

    /// Replace the stored IMU sample (bounded wait)
    pub async fn publish_imu(&self, sample: ImuSample) -> Result<(), StoreError> {
        let mut guard = with_timeout(LOCK_TIMEOUT, self.imu.lock())
            .await
            .map_err(|_| StoreError::Contended)?;
        *guard = Some(sample);
        Ok(())
    }

    /// Copy out the latest IMU sample, `None` until the first publish
    /// (bounded wait)
    pub async fn latest_imu(&self) -> Result<Option<ImuSample>, StoreError> {
        let guard = with_timeout(LOCK_TIMEOUT, self.imu.lock())
            .await
            .map_err(|_| StoreError::Contended)?;
        Ok(*guard)
    }

    /// Overwrite the button event and mark it dirty (bounded wait)
    pub async fn record_buttons(&self, event: ButtonEvent) -> Result<(), StoreError> {
        let mut guard = with_timeout(LOCK_TIMEOUT, self.button.lock())
            .await
            .map_err(|_| StoreError::Contended)?;
        *guard = event;
        Ok(())
    }

    /// Consume the button event if it carries untransmitted data
    ///
    /// Returns `Some(event)` and clears the dirty flag when one is pending;
    /// `None` when the slot holds nothing new (bounded wait).
    pub async fn take_buttons(&self) -> Result<Option<ButtonEvent>, StoreError> {
        let mut guard = with_timeout(LOCK_TIMEOUT, self.button.lock())
            .await
            .map_err(|_| StoreError::Contended)?;
        if guard.dirty {
            let event = *guard;
            guard.dirty = false;
            Ok(Some(event))
        } else {
            Ok(None)
        }
    }

    /// Non-blocking variant of [`Self::publish_imu`]
    pub fn try_publish_imu(&self, sample: ImuSample) -> Result<(), StoreError> {
        let mut guard = self.imu.try_lock().map_err(|_| StoreError::Contended)?;
        *guard = Some(sample);
        Ok(())
    }

    /// Non-blocking variant of [`Self::latest_imu`]
    pub fn try_latest_imu(&self) -> Result<Option<ImuSample>, StoreError> {
        let guard = self.imu.try_lock().map_err(|_| StoreError::Contended)?;
        Ok(*guard)
    }

    /// Non-blocking variant of [`Self::record_buttons`]
    pub fn try_record_buttons(&self, event: ButtonEvent) -> Result<(), StoreError> {
        let mut guard = self.button.try_lock().map_err(|_| StoreError::Contended)?;
        *guard = event;
        Ok(())
    }

    /// Non-blocking variant of [`Self::take_buttons`]
    pub fn try_take_buttons(&self) -> Result<Option<ButtonEvent>, StoreError> {
        let mut guard = self.button.try_lock().map_err(|_| StoreError::Contended)?;
        if guard.dirty {
            let event = *guard;
            guard.dirty = false;
            Ok(Some(event))
        } else {
            Ok(None)
        }
    }
}

impl Default for SampleStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::ButtonMask;
    use embassy_futures::block_on;
    use nalgebra::{Quaternion, Vector3};

    fn sample(ts: u64) -> ImuSample {
        ImuSample {
            gyro: Vector3::new(0.1, 0.2, 0.3),
            accel: Vector3::new(0.0, 0.0, 1.0),
            quat: Quaternion::new(1.0, 0.0, 0.0, 0.0),
            timestamp_ms: ts,
        }
    }

    fn press(ts: u64) -> ButtonEvent {
        ButtonEvent {
            timestamp_ms: ts,
            buttons: ButtonMask::PRIMARY,
            dirty: true,
        }
    }

    #[test]
    fn test_empty_store_has_no_sample() {
        let store = SampleStore::new();
        assert_eq!(store.try_latest_imu().unwrap(), None);
        assert_eq!(store.try_take_buttons().unwrap(), None);
    }

    #[test]
    fn test_publish_then_read() {
        let store = SampleStore::new();
        store.try_publish_imu(sample(42)).unwrap();

        let read = store.try_latest_imu().unwrap().unwrap();
        assert_eq!(read.timestamp_ms, 42);

        // Reads do not consume the sample
        assert!(store.try_latest_imu().unwrap().is_some());
    }

    #[test]
    fn test_button_event_consumed_once() {
        let store = SampleStore::new();
        store.try_record_buttons(press(10)).unwrap();

        let taken = store.try_take_buttons().unwrap().unwrap();
        assert_eq!(taken.buttons, ButtonMask::PRIMARY);
        assert_eq!(taken.timestamp_ms, 10);

        // Dirty flag cleared: nothing further to transmit
        assert_eq!(store.try_take_buttons().unwrap(), None);
    }

    #[test]
    fn test_newer_event_overwrites_older() {
        let store = SampleStore::new();
        store.try_record_buttons(press(10)).unwrap();
        store
            .try_record_buttons(ButtonEvent {
                timestamp_ms: 20,
                buttons: ButtonMask::SECONDARY,
                dirty: true,
            })
            .unwrap();

        let taken = store.try_take_buttons().unwrap().unwrap();
        assert_eq!(taken.timestamp_ms, 20);
        assert_eq!(taken.buttons, ButtonMask::SECONDARY);
    }

    #[test]
    fn test_contended_imu_lock_skips_without_blocking() {
        let store = SampleStore::new();
        store.try_publish_imu(sample(1)).unwrap();

        // Simulate a stalled reader holding the IMU lock
        let held = store.imu.try_lock().unwrap();

        for _ in 0..100 {
            assert_eq!(store.try_publish_imu(sample(2)), Err(StoreError::Contended));
            assert_eq!(store.try_latest_imu(), Err(StoreError::Contended));
        }

        // The button lock is independent and stays usable
        store.try_record_buttons(press(5)).unwrap();
        assert!(store.try_take_buttons().unwrap().is_some());

        drop(held);

        // The previous sample survived the contention untouched
        let read = store.try_latest_imu().unwrap().unwrap();
        assert_eq!(read.timestamp_ms, 1);
    }

    #[test]
    fn test_bounded_wait_times_out_under_contention() {
        let store = SampleStore::new();
        let held = store.button.try_lock().unwrap();

        let result = block_on(store.take_buttons());
        assert_eq!(result, Err(StoreError::Contended));

        drop(held);
        assert_eq!(block_on(store.take_buttons()), Ok(None));
    }

    #[test]
    fn test_async_paths_round_trip() {
        let store = SampleStore::new();
        block_on(store.publish_imu(sample(7))).unwrap();
        let read = block_on(store.latest_imu()).unwrap().unwrap();
        assert_eq!(read.timestamp_ms, 7);

        block_on(store.record_buttons(press(9))).unwrap();
        let taken = block_on(store.take_buttons()).unwrap().unwrap();
        assert_eq!(taken.timestamp_ms, 9);
    }
}
