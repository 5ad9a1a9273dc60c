use std::sync::{Arc, Mutex};

use device::{power::PowerOps, ErrorKind, Result};
use drivers::power::{ExynosPower, FchPower, PchPower};
use oreboot_asm::Mmio;
use sim::{FakeMmio, PortBus, PortDevice};

/// A bank of byte registers on the I/O bus
struct Regs(Vec<u8>, u16);

impl PortDevice for Regs {
    fn read(&mut self, port: u16) -> u8 {
        self.0[(port - self.1) as usize]
    }

    fn write(&mut self, port: u16, value: u8) {
        self.0[(port - self.1) as usize] = value;
    }
}

#[test]
fn test_pch_full_reset() -> Result<()> {
    let ports = Arc::new(PortBus::new());
    let mut power = PchPower::new(ports.clone(), 0x1800);
    assert_eq!(power.cold_reboot(), Err(ErrorKind::Timeout));
    assert_eq!(ports.writes(), vec![(0xcf9, 0x0e)]);
    Ok(())
}

#[test]
fn test_pch_enters_s5() -> Result<()> {
    let ports = Arc::new(PortBus::new());
    let pm = Arc::new(Mutex::new(Regs(vec![0; 0x80], 0x1800)));
    pm.lock().unwrap().0[4] = 0x01;
    ports.map(0x1800..0x1880, pm.clone());

    let mut power = PchPower::new(ports.clone(), 0x1800);
    assert_eq!(power.power_off(), Err(ErrorKind::Timeout));

    let regs = &pm.lock().unwrap().0;
    let cnt = u32::from_le_bytes([regs[4], regs[5], regs[6], regs[7]]);
    assert_eq!(cnt, 0x01 | 7 << 10 | 1 << 13);
    assert!(regs[0x70..0x80].iter().all(|b| *b == 0));
    // SLP_EN is set in a second write, after the sleep type.
    let writes = ports.writes();
    let typ = writes.iter().position(|w| *w == (0x1805, 0x1c));
    let en = writes.iter().position(|w| *w == (0x1805, 0x3c));
    assert!(typ.is_some() && en.is_some() && typ < en);
    Ok(())
}

#[test]
fn test_fch_soft_off() -> Result<()> {
    let ports = Arc::new(PortBus::new());
    let pm = Arc::new(Mutex::new(Regs(vec![0; 2], 0x404)));
    ports.map(0x404..0x406, pm.clone());

    let mut power = FchPower::new(ports.clone());
    assert_eq!(power.power_off(), Err(ErrorKind::Timeout));
    let regs = &pm.lock().unwrap().0;
    assert_eq!(u16::from_le_bytes([regs[0], regs[1]]), 0x3c00);

    assert_eq!(power.cold_reboot(), Err(ErrorKind::Timeout));
    assert_eq!(ports.writes().last(), Some(&(0xcf9, 0x0e)));
    Ok(())
}

#[test]
fn test_exynos_ps_hold() -> Result<()> {
    let mmio = Arc::new(FakeMmio::new());
    mmio.set32(0x1004_330c, 0x5300);
    let mut power = ExynosPower::new(mmio.clone());

    assert_eq!(power.power_off(), Err(ErrorKind::Timeout));
    assert_eq!(mmio.read32(0x1004_330c), 0x5200);
    assert_eq!(power.cold_reboot(), Err(ErrorKind::Timeout));
    assert_eq!(mmio.writes().last(), Some(&(0x1004_0400, 1)));
    Ok(())
}
