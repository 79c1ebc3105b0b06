//! Sensor registry
//!
//! A fixed-capacity table of named slots. Each slot tracks the latest value,
//! the value last pushed to the subscriber and the reporting policy that
//! decides when the next push is due.
//!
//! Slots are addressed by their single-character name. Positions in the table
//! are an implementation detail shared with the subscription engine only.
//!
//! # Example
//!
//! ```
//! use meshnode_core::registry::{Registry, SensorSlot};
//!
//! let mut registry: Registry<'_, 4> = Registry::new();
//! registry.register(SensorSlot::writable('r')).unwrap();
//! registry.register(SensorSlot::read_only('t')).unwrap();
//!
//! registry.set_value('t', 21, false).unwrap();
//! assert_eq!(registry.get_value('t'), Ok(21));
//! assert!(registry.is_read_only('t'));
//! ```

use heapless::Vec;
use meshnode_hal::SensorActuator;

use crate::error::SensorError;

/// Report interval for slots that were never configured by a subscription
pub const DEFAULT_REPORT_INTERVAL_MS: u32 = 10_000;

/// One named sensor or actuator channel
pub struct SensorSlot<'a> {
    name: char,
    current_value: i64,
    last_reported_value: i64,
    reportable_change: u64,
    report_interval_ms: u32,
    interval_pinned: bool,
    last_reported_at: u32,
    read_only: bool,
    initialized: bool,
    reporting_enabled: bool,
    actuator: Option<&'a mut dyn SensorActuator>,
}

impl<'a> SensorSlot<'a> {
    fn new(name: char, read_only: bool) -> Self {
        Self {
            name,
            current_value: 0,
            last_reported_value: 0,
            reportable_change: 0,
            report_interval_ms: DEFAULT_REPORT_INTERVAL_MS,
            interval_pinned: false,
            last_reported_at: 0,
            read_only,
            initialized: false,
            reporting_enabled: false,
            actuator: None,
        }
    }

    /// Slot that peers may write with `set`
    pub fn writable(name: char) -> Self {
        Self::new(name, false)
    }

    /// Slot only hardware may update
    pub fn read_only(name: char) -> Self {
        Self::new(name, true)
    }

    /// Drive `actuator` whenever a peer writes this slot
    pub fn with_actuator(mut self, actuator: &'a mut dyn SensorActuator) -> Self {
        self.actuator = Some(actuator);
        self
    }

    /// Fixed report interval; the node-wide default no longer applies
    pub fn with_report_interval(mut self, interval_ms: u32) -> Self {
        self.report_interval_ms = interval_ms;
        self.interval_pinned = true;
        self
    }

    pub fn name(&self) -> char {
        self.name
    }

    pub fn current_value(&self) -> i64 {
        self.current_value
    }

    pub fn last_reported_value(&self) -> i64 {
        self.last_reported_value
    }

    pub fn reportable_change(&self) -> u64 {
        self.reportable_change
    }

    pub fn report_interval_ms(&self) -> u32 {
        self.report_interval_ms
    }

    pub fn last_reported_at(&self) -> u32 {
        self.last_reported_at
    }

    pub fn is_read_only(&self) -> bool {
        self.read_only
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    pub fn reporting_enabled(&self) -> bool {
        self.reporting_enabled
    }

    /// Whether a report is due at `now`
    ///
    /// Due when the slot has been silent longer than its interval, or the
    /// value moved further than the dead-band from the last reported value
    /// in either direction. Enablement and initialization are checked by the
    /// caller.
    pub fn is_due(&self, now: u32) -> bool {
        if now.wrapping_sub(self.last_reported_at) > self.report_interval_ms {
            return true;
        }
        self.current_value.abs_diff(self.last_reported_value) > self.reportable_change
    }

    pub(crate) fn mark_reported(&mut self, now: u32) {
        self.last_reported_at = now;
        self.last_reported_value = self.current_value;
    }

    pub(crate) fn set_report_interval(&mut self, interval_ms: u32) {
        self.report_interval_ms = interval_ms;
    }

    pub(crate) fn set_reportable_change(&mut self, change: u64) {
        self.reportable_change = change;
    }

    pub(crate) fn enable_reporting(&mut self) {
        self.reporting_enabled = true;
    }
}

/// Table of sensor slots with room for `N` entries
pub struct Registry<'a, const N: usize> {
    slots: Vec<SensorSlot<'a>, N>,
}

impl<'a, const N: usize> Registry<'a, N> {
    pub fn new() -> Self {
        Self { slots: Vec::new() }
    }

    /// Add a slot
    ///
    /// Names must be unique; registration order is the order used in info
    /// maps and reports.
    pub fn register(&mut self, slot: SensorSlot<'a>) -> Result<(), SensorError> {
        if self.find_index(slot.name).is_some() {
            return Err(SensorError::DuplicateName);
        }
        self.slots
            .push(slot)
            .map_err(|_| SensorError::CapacityExceeded)
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Slot names in table order
    pub fn names(&self) -> Names<'_, 'a> {
        Names {
            slots: self.slots.iter(),
        }
    }

    pub fn slot(&self, name: char) -> Option<&SensorSlot<'a>> {
        self.slots.iter().find(|slot| slot.name == name)
    }

    pub fn find_index(&self, name: char) -> Option<usize> {
        self.slots.iter().position(|slot| slot.name == name)
    }

    /// Store a new value
    ///
    /// External writes come from a peer: the reported value is moved along
    /// with the current value so the write does not trigger a report of its
    /// own, and the slot's actuator is driven. Internal writes come from
    /// hardware and only touch the current value.
    ///
    /// Read-only slots are not protected here; the `set` handler enforces
    /// that before calling in.
    pub fn set_value(&mut self, name: char, value: i64, external: bool) -> Result<(), SensorError> {
        let slot = self
            .slots
            .iter_mut()
            .find(|slot| slot.name == name)
            .ok_or(SensorError::NotFound)?;

        slot.initialized = true;
        slot.current_value = value;
        if external {
            slot.last_reported_value = value;
            if let Some(actuator) = slot.actuator.as_mut() {
                if let Err(e) = actuator.on_external_set(name, value) {
                    warn!("Actuator for '{}' failed: {}", name, e);
                }
            }
        }
        Ok(())
    }

    /// Current value of an initialized slot
    pub fn get_value(&self, name: char) -> Result<i64, SensorError> {
        let slot = self.slot(name).ok_or(SensorError::NotFound)?;
        if !slot.initialized {
            return Err(SensorError::NotInitialized);
        }
        Ok(slot.current_value)
    }

    /// Unknown names count as read-only
    pub fn is_read_only(&self, name: char) -> bool {
        self.slot(name).map_or(true, |slot| slot.read_only)
    }

    /// Classify whether a peer may write `name`
    pub fn check_writable(&self, name: char) -> Result<(), SensorError> {
        match self.slot(name) {
            None => Err(SensorError::NotFound),
            Some(slot) if slot.read_only => Err(SensorError::ReadOnly),
            Some(_) => Ok(()),
        }
    }

    /// Use `interval_ms` for every slot built without its own interval
    pub fn apply_default_report_interval(&mut self, interval_ms: u32) {
        for slot in self.slots.iter_mut().filter(|slot| !slot.interval_pinned) {
            slot.report_interval_ms = interval_ms;
        }
    }

    /// Reset reporting bookkeeping for every slot
    ///
    /// Disables reporting and treats the current value as just reported, so
    /// a new subscriber starts from a clean baseline.
    pub fn rearm(&mut self, now: u32) {
        for slot in self.slots.iter_mut() {
            slot.reporting_enabled = false;
            slot.mark_reported(now);
        }
    }

    pub(crate) fn slot_at_mut(&mut self, index: usize) -> Option<&mut SensorSlot<'a>> {
        self.slots.get_mut(index)
    }

    pub(crate) fn slots_mut(&mut self) -> core::slice::IterMut<'_, SensorSlot<'a>> {
        self.slots.iter_mut()
    }
}

/// Slot names of a [`Registry`], in table order
pub struct Names<'r, 'a> {
    slots: core::slice::Iter<'r, SensorSlot<'a>>,
}

impl Iterator for Names<'_, '_> {
    type Item = char;

    fn next(&mut self) -> Option<char> {
        self.slots.next().map(SensorSlot::name)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.slots.size_hint()
    }
}

impl<const N: usize> Default for Registry<'_, N> {
    fn default() -> Self {
        Self::new()
    }
}
