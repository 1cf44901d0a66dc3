//! Type aliases for commonly used shared types.
//!
//! The shape engine is single-threaded: everything runs on the UI/event
//! thread, so sharing uses `Rc<RefCell<T>>` rather than `Arc<Mutex<T>>`.
//!
//! ```rust,ignore
//! use shapekit_core::types::*;
//!
//! // Instead of: Rc<RefCell<Vec<Event>>>
//! let log: SharedVec<Event> = shared(Vec::new());
//! ```

use std::cell::RefCell;
use std::rc::Rc;

/// A reference-counted, interior-mutable wrapper for single-threaded sharing.
pub type Shared<T> = Rc<RefCell<T>>;

/// A shared vector for single-threaded collection management.
pub type SharedVec<T> = Rc<RefCell<Vec<T>>>;

/// A listener invoked synchronously with a borrowed payload.
pub type Listener<T> = Rc<dyn Fn(&T)>;

/// Create a new `Shared<T>` from a value.
#[inline]
pub fn shared<T>(value: T) -> Shared<T> {
    Rc::new(RefCell::new(value))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shared() {
        let s: Shared<i32> = shared(42);
        *s.borrow_mut() += 1;
        assert_eq!(*s.borrow(), 43);
    }

    #[test]
    fn test_listener_captures_shared_state() {
        let seen: SharedVec<u32> = shared(Vec::new());
        let sink = seen.clone();
        let listener: Listener<u32> = Rc::new(move |v| sink.borrow_mut().push(*v));
        listener(&7);
        listener(&9);
        assert_eq!(*seen.borrow(), vec![7, 9]);
    }
}
