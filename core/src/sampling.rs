//! Deferred sample queue
//!
//! ADC completion and similar interrupts must not touch the registry. They
//! push `(name, value)` samples into a lock-free single-producer,
//! single-consumer queue instead, and the cooperative task applies them as
//! internal updates on its next pass.
//!
//! ```
//! use meshnode_core::registry::{Registry, SensorSlot};
//! use meshnode_core::sampling::SampleQueue;
//!
//! let mut queue: SampleQueue<4> = SampleQueue::new();
//! let (mut producer, mut drain) = queue.split();
//!
//! let mut registry: Registry<'_, 2> = Registry::new();
//! registry.register(SensorSlot::read_only('v')).unwrap();
//!
//! assert!(producer.push('v', 3012));
//! assert_eq!(drain.drain_into(&mut registry), 1);
//! assert_eq!(registry.get_value('v'), Ok(3012));
//! ```

use heapless::spsc::{Consumer, Producer, Queue};

use crate::registry::Registry;

/// A raw reading from hardware
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Sample {
    pub name: char,
    pub value: i64,
}

/// Backing storage for samples; holds up to `Q - 1` entries
pub struct SampleQueue<const Q: usize> {
    queue: Queue<Sample, Q>,
}

impl<const Q: usize> SampleQueue<Q> {
    pub const fn new() -> Self {
        Self {
            queue: Queue::new(),
        }
    }

    /// Split into the interrupt-side producer and the task-side drain
    pub fn split(&mut self) -> (SampleProducer<'_, Q>, SampleDrain<'_, Q>) {
        let (producer, consumer) = self.queue.split();
        (
            SampleProducer {
                producer,
                dropped: 0,
            },
            SampleDrain { consumer },
        )
    }
}

impl<const Q: usize> Default for SampleQueue<Q> {
    fn default() -> Self {
        Self::new()
    }
}

/// Interrupt-side handle
pub struct SampleProducer<'q, const Q: usize> {
    producer: Producer<'q, Sample, Q>,
    dropped: u32,
}

impl<const Q: usize> SampleProducer<'_, Q> {
    /// Queue a sample; returns `false` and counts a drop when full
    pub fn push(&mut self, name: char, value: i64) -> bool {
        match self.producer.enqueue(Sample { name, value }) {
            Ok(()) => true,
            Err(_) => {
                self.dropped = self.dropped.wrapping_add(1);
                false
            }
        }
    }

    /// Samples lost to a full queue so far
    pub fn dropped(&self) -> u32 {
        self.dropped
    }
}

/// Task-side handle
pub struct SampleDrain<'q, const Q: usize> {
    consumer: Consumer<'q, Sample, Q>,
}

impl<const Q: usize> SampleDrain<'_, Q> {
    /// Apply every queued sample as an internal update
    ///
    /// Returns how many samples landed in a slot. Samples for names the
    /// registry does not know are discarded.
    pub fn drain_into<const N: usize>(&mut self, registry: &mut Registry<'_, N>) -> usize {
        let mut applied = 0;
        while let Some(sample) = self.consumer.dequeue() {
            match registry.set_value(sample.name, sample.value, false) {
                Ok(()) => applied += 1,
                Err(e) => warn!("Discarding sample for '{}': {}", sample.name, e),
            }
        }
        applied
    }

    pub fn is_empty(&self) -> bool {
        !self.consumer.ready()
    }
}
