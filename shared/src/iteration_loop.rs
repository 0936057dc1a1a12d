use log::trace;

/// A side of the connection (server or client) that drains its transport
/// once per frame and flushes its queued packets once per frame
pub trait NetworkRole {
    fn is_active(&self) -> bool;

    /// Drains every pending inbound event and dispatches it
    fn iterate_incoming(&mut self);

    /// Writes every packet queued during the frame to the transport
    fn iterate_outgoing(&mut self);
}

/// Guarantees each frame index is drained at most once and flushed at most
/// once, no matter how many times the frame driver calls in
#[derive(Default)]
pub struct IterationLoop {
    last_incoming_frame: Option<u64>,
    last_outgoing_frame: Option<u64>,
}

impl IterationLoop {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drains the inbound queue of every active role, in the order given.
    /// Returns false if `frame` was already drained.
    pub fn iterate_incoming(&mut self, frame: u64, roles: &mut [&mut dyn NetworkRole]) -> bool {
        if !Self::claim(&mut self.last_incoming_frame, frame) {
            trace!("incoming already iterated for frame {}", frame);
            return false;
        }

        for role in roles.iter_mut() {
            if role.is_active() {
                role.iterate_incoming();
            }
        }
        true
    }

    /// Flushes the outbound queue of every active role, in the order given.
    /// Returns false if `frame` was already flushed.
    pub fn iterate_outgoing(&mut self, frame: u64, roles: &mut [&mut dyn NetworkRole]) -> bool {
        if !Self::claim(&mut self.last_outgoing_frame, frame) {
            trace!("outgoing already iterated for frame {}", frame);
            return false;
        }

        for role in roles.iter_mut() {
            if role.is_active() {
                role.iterate_outgoing();
            }
        }
        true
    }

    pub fn last_incoming_frame(&self) -> Option<u64> {
        self.last_incoming_frame
    }

    pub fn last_outgoing_frame(&self) -> Option<u64> {
        self.last_outgoing_frame
    }

    fn claim(last: &mut Option<u64>, frame: u64) -> bool {
        if last.is_some_and(|last| frame <= last) {
            return false;
        }
        *last = Some(frame);
        true
    }
}
