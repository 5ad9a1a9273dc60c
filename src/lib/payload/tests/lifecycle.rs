use std::{cell::RefCell, rc::Rc};

use bootstate::{BootState, CleanupType};
use device::{power::PowerOps, ClassId, ErrorKind, Result};
use payload::{Error, Payload};
use sim::SimPlatform;

type Log = Rc<RefCell<Vec<&'static str>>>;

struct Power(Log);

impl PowerOps for Power {
    fn cold_reboot(&mut self) -> Result<()> {
        self.0.borrow_mut().push("reboot");
        Err(ErrorKind::Timeout)
    }

    fn power_off(&mut self) -> Result<()> {
        self.0.borrow_mut().push("off");
        Err(ErrorKind::Timeout)
    }
}

fn payload() -> Payload {
    Payload::new(SimPlatform::new().platform(Default::default()))
}

fn board(log: &Log) -> impl FnOnce(&mut device::Registry, &device::Platform) -> core::result::Result<(), &'static str> {
    let log = log.clone();
    move |registry, _| {
        registry.set_power(Box::new(Power(log.clone())));
        let on_handoff = log.clone();
        registry.add_cleanup(
            "handoff",
            CleanupType::ON_HANDOFF,
            Box::new(move |_| {
                on_handoff.borrow_mut().push("handoff cleanup");
                Ok(())
            }),
        );
        let on_reboot = log.clone();
        registry.add_cleanup(
            "reboot",
            CleanupType::ON_REBOOT,
            Box::new(move |_| {
                on_reboot.borrow_mut().push("reboot cleanup");
                Ok(())
            }),
        );
        Ok(())
    }
}

#[test]
fn test_setup_then_handoff() -> core::result::Result<(), Error<&'static str>> {
    let log = Log::default();
    let mut payload = payload();
    assert_eq!(payload.state(), BootState::Init);
    assert!(payload.devices().is_none());

    payload.setup_board(board(&log))?;
    assert_eq!(payload.state(), BootState::DevicesReady);
    assert_eq!(payload.devices().map(|r| r.len(ClassId::Cleanup)), Some(2));

    payload.handoff::<&str>()?;
    assert_eq!(*log.borrow(), ["handoff cleanup"]);
    Ok(())
}

#[test]
fn test_board_setup_runs_once() -> core::result::Result<(), Error<&'static str>> {
    let mut payload = payload();
    payload.setup_board(|_, _| Ok::<(), &str>(()))?;
    let again = payload.setup_board(|_, _| -> core::result::Result<(), &str> { panic!("second setup ran") });
    assert_eq!(
        again,
        Err(Error::OutOfOrder {
            from: BootState::DevicesReady,
            to: BootState::BoardSetup,
        })
    );
    Ok(())
}

#[test]
fn test_failed_board_blocks_handoff() {
    let mut payload = payload();
    assert_eq!(payload.setup_board(|_, _| Err("no EC")), Err(Error::Board("no EC")));
    assert_eq!(payload.state(), BootState::BoardSetup);
    assert!(payload.devices().is_none());
    assert_eq!(
        payload.handoff::<&str>(),
        Err(Error::OutOfOrder {
            from: BootState::BoardSetup,
            to: BootState::Handoff,
        })
    );
}

#[test]
fn test_cold_reboot_runs_reboot_cleanups_first() -> core::result::Result<(), Error<&'static str>> {
    let log = Log::default();
    let mut payload = payload();
    payload.setup_board(board(&log))?;

    assert_eq!(payload.cold_reboot::<&str>(), Error::Power(ErrorKind::Timeout));
    assert_eq!(*log.borrow(), ["reboot cleanup", "reboot"]);
    // Reboot cleanups only run once.
    assert_eq!(payload.power_off::<&str>(), Error::Power(ErrorKind::Timeout));
    assert_eq!(*log.borrow(), ["reboot cleanup", "reboot", "off"]);
    Ok(())
}

#[test]
fn test_reset_without_power_ops() {
    let mut payload = payload();
    assert_eq!(payload.power_off::<&str>(), Error::NoPower);
}
