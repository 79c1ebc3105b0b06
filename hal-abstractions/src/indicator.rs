//! Notification LEDs
//!
//! The node flashes one LED when a request arrives and another when it pushes
//! a message. Two more LEDs show the mesh role. All of them are best-effort:
//! a pin error never affects protocol handling.

use embedded_hal::digital::OutputPin;

use crate::network::DeviceRole;

/// Kind of traffic being signalled
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Activity {
    /// A request or ping was received
    Received,
    /// A broadcast or report was sent
    Sent,
}

/// Brief traffic indication
pub trait ActivityIndicator {
    fn signal(&mut self, activity: Activity);
}

/// Receive/send LED pair
///
/// `signal` lights the LED; the board's one-shot timer calls [`settle`]
/// after the blink period to turn both off again.
///
/// [`settle`]: LedIndicator::settle
pub struct LedIndicator<R, S> {
    recv: R,
    send: S,
}

impl<R: OutputPin, S: OutputPin> LedIndicator<R, S> {
    pub fn new(recv: R, send: S) -> Self {
        Self { recv, send }
    }

    /// Turn both LEDs off
    pub fn settle(&mut self) {
        let _ = self.recv.set_low();
        let _ = self.send.set_low();
    }

    pub fn release(self) -> (R, S) {
        (self.recv, self.send)
    }
}

impl<R: OutputPin, S: OutputPin> ActivityIndicator for LedIndicator<R, S> {
    fn signal(&mut self, activity: Activity) {
        match activity {
            Activity::Received => {
                let _ = self.recv.set_high();
            }
            Activity::Sent => {
                let _ = self.send.set_high();
            }
        }
    }
}

/// Child/router LED pair showing the current mesh role
///
/// | Role | Child LED | Router LED |
/// |---|---|---|
/// | Child | on | off |
/// | Router | off | on |
/// | Leader | on | on |
/// | Detached, Disabled | off | off |
pub struct RoleLeds<C, R> {
    child: C,
    router: R,
}

impl<C: OutputPin, R: OutputPin> RoleLeds<C, R> {
    pub fn new(child: C, router: R) -> Self {
        Self { child, router }
    }

    /// LED states `(child, router)` for a role
    pub fn pattern(role: DeviceRole) -> (bool, bool) {
        match role {
            DeviceRole::Child => (true, false),
            DeviceRole::Router => (false, true),
            DeviceRole::Leader => (true, true),
            DeviceRole::Detached | DeviceRole::Disabled => (false, false),
        }
    }

    /// Update the LEDs after a role change
    pub fn show(&mut self, role: DeviceRole) {
        let (child, router) = Self::pattern(role);
        let _ = self.child.set_state(child.into());
        let _ = self.router.set_state(router.into());
    }

    pub fn release(self) -> (C, R) {
        (self.child, self.router)
    }
}
