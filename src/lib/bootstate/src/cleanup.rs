use alloc::{boxed::Box, vec::Vec};
use bitflags::bitflags;
use log::{debug, error};
use util::cb_err::CbErr;

bitflags! {
    /// Events at which registered cleanups may run
    #[derive(Clone, Copy, Debug, Eq, PartialEq)]
    pub struct CleanupType: u32 {
        const ON_REBOOT = 1 << 0;
        const ON_POWER_OFF = 1 << 1;
        const ON_HANDOFF = 1 << 2;
        const ON_LEGACY = 1 << 3;
    }
}

pub type CleanupFn = Box<dyn FnMut(CleanupType) -> Result<(), CbErr>>;

pub struct CleanupFunc {
    name: &'static str,
    types: CleanupType,
    func: CleanupFn,
    done: bool,
}

impl CleanupFunc {
    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn types(&self) -> CleanupType {
        self.types
    }

    /// Whether the callback has already been invoked
    pub fn done(&self) -> bool {
        self.done
    }
}

/// Ordered list of cleanup callbacks.
///
/// Callbacks run in registration order. Each runs at most once; an entry whose
/// types do not match an event is skipped and stays eligible for later events.
#[derive(Default)]
pub struct CleanupList {
    funcs: Vec<CleanupFunc>,
}

impl CleanupList {
    pub const fn new() -> Self {
        Self { funcs: Vec::new() }
    }

    pub fn add(&mut self, name: &'static str, types: CleanupType, func: CleanupFn) {
        debug!("cleanup: registered {} for {:?}", name, types);
        self.funcs.push(CleanupFunc {
            name,
            types,
            func,
            done: false,
        });
    }

    pub fn len(&self) -> usize {
        self.funcs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.funcs.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &CleanupFunc> {
        self.funcs.iter()
    }

    /// Run every pending callback registered for `event`.
    ///
    /// A failing callback does not stop the sweep; the first failure is
    /// returned once all matching callbacks have run.
    pub fn run(&mut self, event: CleanupType) -> Result<(), CbErr> {
        let mut status = Ok(());
        for f in self.funcs.iter_mut() {
            if f.done || !f.types.intersects(event) {
                continue;
            }
            f.done = true;
            debug!("cleanup: running {}", f.name);
            if let Err(e) = (f.func)(event) {
                error!("cleanup: {} failed: {}", f.name, e);
                if status.is_ok() {
                    status = Err(e);
                }
            }
        }
        status
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::{rc::Rc, vec};
    use core::cell::RefCell;

    fn recorder(log: &Rc<RefCell<Vec<&'static str>>>, name: &'static str) -> CleanupFn {
        let log = log.clone();
        Box::new(move |_| {
            log.borrow_mut().push(name);
            Ok(())
        })
    }

    #[test]
    fn runs_matching_entries_in_registration_order() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut list = CleanupList::new();
        list.add("a", CleanupType::ON_HANDOFF, recorder(&log, "a"));
        list.add("b", CleanupType::ON_REBOOT, recorder(&log, "b"));
        list.add("c", CleanupType::ON_HANDOFF | CleanupType::ON_LEGACY, recorder(&log, "c"));

        assert_eq!(list.run(CleanupType::ON_HANDOFF), Ok(()));
        assert_eq!(*log.borrow(), vec!["a", "c"]);
    }

    #[test]
    fn entries_run_at_most_once() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut list = CleanupList::new();
        list.add("a", CleanupType::ON_HANDOFF | CleanupType::ON_LEGACY, recorder(&log, "a"));
        list.add("b", CleanupType::ON_LEGACY, recorder(&log, "b"));

        list.run(CleanupType::ON_HANDOFF).unwrap();
        list.run(CleanupType::ON_HANDOFF).unwrap();
        list.run(CleanupType::ON_LEGACY).unwrap();

        assert_eq!(*log.borrow(), vec!["a", "b"]);
        assert!(list.iter().all(CleanupFunc::done));
    }

    #[test]
    fn skipped_entries_are_not_removed() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut list = CleanupList::new();
        list.add("reboot", CleanupType::ON_REBOOT, recorder(&log, "reboot"));

        list.run(CleanupType::ON_HANDOFF).unwrap();
        assert!(log.borrow().is_empty());
        assert_eq!(list.len(), 1);
        assert!(!list.iter().next().unwrap().done());
    }

    #[test]
    fn failure_does_not_stop_the_sweep() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut list = CleanupList::new();
        list.add("bad", CleanupType::ON_HANDOFF, Box::new(|_| Err(CbErr::ECNotResponding)));
        list.add("good", CleanupType::ON_HANDOFF, recorder(&log, "good"));

        assert_eq!(list.run(CleanupType::ON_HANDOFF), Err(CbErr::ECNotResponding));
        assert_eq!(*log.borrow(), vec!["good"]);
    }
}
