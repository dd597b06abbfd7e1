use std::sync::mpsc::{self, Receiver, RecvError, RecvTimeoutError, SyncSender, TryRecvError};
use std::time::Duration;

use super::types::Event;

/// Creates the rendezvous channel carrying events from the OS thread to the caller.
///
/// Capacity is zero: every `emit` blocks until the caller takes the event.
pub fn event_channel() -> (EventBridge, Events) {
    let (tx, rx) = mpsc::sync_channel(0);
    (EventBridge { tx: Some(tx) }, Events { rx })
}

/// OS-thread end of the event channel.
pub struct EventBridge {
    tx: Option<SyncSender<Event>>,
}

impl EventBridge {
    /// Hands `ev` to the caller, blocking until it is accepted.
    ///
    /// Returns `false` when the channel is closed or the caller stopped
    /// listening; the event is dropped in that case.
    pub fn emit(&self, ev: Event) -> bool {
        let Some(tx) = self.tx.as_ref() else {
            return false;
        };
        log::trace!("event {ev}");
        tx.send(ev).is_ok()
    }

    /// Closes the channel. Receivers observe the end of the sequence.
    ///
    /// Returns `true` only for the call that actually closed it.
    pub fn close(&mut self) -> bool {
        self.tx.take().is_some()
    }

    pub fn is_closed(&self) -> bool {
        self.tx.is_none()
    }
}

/// Caller end of the event channel.
pub struct Events {
    rx: Receiver<Event>,
}

impl Events {
    /// Blocks for the next event. `Err` once the window has torn down.
    pub fn recv(&self) -> Result<Event, RecvError> {
        self.rx.recv()
    }

    pub fn try_recv(&self) -> Result<Event, TryRecvError> {
        self.rx.try_recv()
    }

    pub fn recv_timeout(&self, timeout: Duration) -> Result<Event, RecvTimeoutError> {
        self.rx.recv_timeout(timeout)
    }

    /// Blocking iterator that ends when the channel closes.
    pub fn iter(&self) -> mpsc::Iter<'_, Event> {
        self.rx.iter()
    }
}

impl<'a> IntoIterator for &'a Events {
    type Item = Event;
    type IntoIter = mpsc::Iter<'a, Event>;

    fn into_iter(self) -> Self::IntoIter {
        self.rx.iter()
    }
}

#[cfg(test)]
mod tests {
    use std::thread;

    use super::*;
    use crate::input::Key;

    #[test]
    fn events_arrive_in_order_then_close() {
        let (mut bridge, events) = event_channel();
        let producer = thread::spawn(move || {
            assert!(bridge.emit(Event::KeyDown(Key::Left)));
            assert!(bridge.emit(Event::KeyUp(Key::Left)));
            assert!(bridge.close());
            assert!(!bridge.close());
        });

        let got: Vec<Event> = events.iter().collect();
        producer.join().unwrap();
        assert_eq!(got, vec![Event::KeyDown(Key::Left), Event::KeyUp(Key::Left)]);
        assert_eq!(events.try_recv(), Err(TryRecvError::Disconnected));
    }

    #[test]
    fn emit_after_receiver_dropped_reports_false() {
        let (bridge, events) = event_channel();
        drop(events);
        assert!(!bridge.emit(Event::Close));
    }

    #[test]
    fn emit_after_close_is_dropped() {
        let (mut bridge, _events) = event_channel();
        bridge.close();
        assert!(bridge.is_closed());
        assert!(!bridge.emit(Event::Close));
    }

    #[test]
    fn emit_blocks_until_taken() {
        let (bridge, events) = event_channel();
        let producer = thread::spawn(move || bridge.emit(Event::Close));
        thread::sleep(Duration::from_millis(20));
        assert!(!producer.is_finished());
        assert_eq!(events.recv(), Ok(Event::Close));
        assert!(producer.join().unwrap());
    }
}
