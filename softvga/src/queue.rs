//! A bounded FIFO of drawing primitives.
//!
//! The application pushes, and either the application or the vertical sync
//! interrupt pops. The interrupt side only ever *tries* to take the lock, so
//! it cannot deadlock against an application that was interrupted while
//! holding it.

// -----------------------------------------------------------------------------
// Licence Statement
// -----------------------------------------------------------------------------
// Copyright (c) Jonathan 'theJPster' Pallant and the Neotron Developers, 2023
// Copyright (c) The pico-term-rs developers, 2025
//
// This program is free software: you can redistribute it and/or modify it under
// the terms of the GNU General Public License as published by the Free Software
// Foundation, either version 3 of the License, or (at your option) any later
// version.
//
// This program is distributed in the hope that it will be useful, but WITHOUT
// ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS
// FOR A PARTICULAR PURPOSE.  See the GNU General Public License for more
// details.
//
// You should have received a copy of the GNU General Public License along with
// this program.  If not, see <https://www.gnu.org/licenses/>.
// -----------------------------------------------------------------------------

// -----------------------------------------------------------------------------
// Imports
// -----------------------------------------------------------------------------

use alloc::collections::VecDeque;

use spin::Mutex;

use crate::primitive::Primitive;

// -----------------------------------------------------------------------------
// Types
// -----------------------------------------------------------------------------

pub struct PrimitiveQueue<'a> {
    items: Mutex<VecDeque<Primitive<'a>>>,
    capacity: usize,
}

impl<'a> PrimitiveQueue<'a> {
    /// Make an empty queue which holds at most `capacity` primitives.
    ///
    /// A capacity of zero is treated as one.
    pub fn new(capacity: usize) -> PrimitiveQueue<'a> {
        let capacity = capacity.max(1);
        PrimitiveQueue {
            items: Mutex::new(VecDeque::with_capacity(capacity)),
            capacity,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Add a primitive to the back, or hand it back if the queue is full.
    pub fn try_push(&self, primitive: Primitive<'a>) -> Result<(), Primitive<'a>> {
        let mut items = self.items.lock();
        if items.len() >= self.capacity {
            return Err(primitive);
        }
        items.push_back(primitive);
        Ok(())
    }

    /// Take the primitive at the front.
    ///
    /// Returns `None` if the queue is empty, or if someone else holds the
    /// lock right now.
    pub fn try_pop(&self) -> Option<Primitive<'a>> {
        self.items.try_lock()?.pop_front()
    }

    /// Look at the front primitive without taking it.
    pub fn peek(&self) -> Option<Primitive<'a>> {
        self.items.try_lock()?.front().copied()
    }

    pub fn len(&self) -> usize {
        self.items.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.lock().is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.items.lock().len() >= self.capacity
    }

    /// Throw away everything queued.
    pub fn clear(&self) {
        self.items.lock().clear();
    }
}

impl core::fmt::Debug for PrimitiveQueue<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("PrimitiveQueue")
            .field("capacity", &self.capacity)
            .finish_non_exhaustive()
    }
}

// -----------------------------------------------------------------------------
// Tests
// -----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Point;

    #[test]
    fn first_in_first_out() {
        let q = PrimitiveQueue::new(4);
        assert!(q.is_empty());
        for x in 0..3 {
            q.try_push(Primitive::MoveTo(Point::new(x, 0))).unwrap();
        }
        assert_eq!(q.len(), 3);
        for x in 0..3 {
            match q.try_pop() {
                Some(Primitive::MoveTo(p)) => assert_eq!(p.x, x),
                other => panic!("unexpected {:?}", other),
            }
        }
        assert!(q.try_pop().is_none());
    }

    #[test]
    fn full_queue_hands_back() {
        let q = PrimitiveQueue::new(2);
        q.try_push(Primitive::Clear).unwrap();
        q.try_push(Primitive::SwapBuffers).unwrap();
        assert!(q.is_full());
        assert!(matches!(
            q.try_push(Primitive::RefreshSprites),
            Err(Primitive::RefreshSprites)
        ));
        assert!(matches!(q.peek(), Some(Primitive::Clear)));
        q.clear();
        assert!(q.is_empty());
        assert_eq!(PrimitiveQueue::new(0).capacity(), 1);
    }

    #[test]
    fn pop_gives_up_while_locked() {
        let q = PrimitiveQueue::new(2);
        q.try_push(Primitive::Clear).unwrap();
        let guard = q.items.lock();
        assert!(q.try_pop().is_none());
        drop(guard);
        assert!(q.try_pop().is_some());
    }
}

// -----------------------------------------------------------------------------
// End of file
// -----------------------------------------------------------------------------
