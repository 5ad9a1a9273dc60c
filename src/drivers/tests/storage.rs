use std::sync::Arc;

use device::{
    block::BlockCtrlr,
    pci::{PciDev, PCI_BASE_ADDRESS_5, PCI_COMMAND},
    ErrorKind, Result,
};
use drivers::storage::{dwmci_clksel, AhciCtrlr, DwmciHost, DwmciWidth, NvmeCtrlr, SdhciHost, SdhciPlatform};
use sim::{FakeMmio, FakePci};

#[test]
fn test_ahci_probes_abar() -> Result<()> {
    let pci = Arc::new(FakePci::new());
    let dev = PciDev::new(0, 0x17, 0);
    pci.add_device(dev, 0x8086, 0x02d3, 0);
    pci.set(dev, PCI_COMMAND, 0);
    pci.set(dev, PCI_BASE_ADDRESS_5, 0xfe10_4000);

    let mut ahci = AhciCtrlr::new(pci.clone(), dev);
    assert_eq!(ahci.name(), "ahci 00:17.0");
    assert!(ahci.need_update());
    ahci.update()?;
    assert!(!ahci.need_update());
    assert_eq!(ahci.abar(), Some(0xfe10_4000));
    assert_eq!(pci.get(dev, PCI_COMMAND), Some(0x6));
    Ok(())
}

#[test]
fn test_empty_nvme_port_stays_pending() {
    let pci = Arc::new(FakePci::new());
    let mut nvme = NvmeCtrlr::new(pci.clone(), PciDev::new(0, 0x1d, 0));
    assert_eq!(nvme.update(), Err(ErrorKind::NoDevice));
    assert!(nvme.need_update());

    let dev = PciDev::new(0, 0x1d, 4);
    pci.add_device(dev, 0x144d, 0xa808, 0);
    let mut nvme = NvmeCtrlr::new(pci, dev);
    assert_eq!(nvme.update(), Err(ErrorKind::NoDevice));
}

#[test]
fn test_sdhci_clock_range_is_validated() {
    let pci = Arc::new(FakePci::new());
    let mmio = Arc::new(FakeMmio::new());
    let dev = PciDev::new(0, 0x14, 7);
    let flags = SdhciPlatform::NO_EMMC_HS200;
    assert!(SdhciHost::new_pci(pci.clone(), mmio.clone(), dev, flags, 0, 200_000_000).is_err());
    assert!(SdhciHost::new_pci(pci, mmio, dev, flags, 400_000, 52_000).is_err());
}

#[test]
fn test_sdhci_reads_host_version() -> Result<()> {
    let pci = Arc::new(FakePci::new());
    let mmio = Arc::new(FakeMmio::new());
    let dev = PciDev::new(0, 0x1e, 4);
    pci.add_device(dev, 0x8086, 0x9d2b, 0xfe20_0000);
    mmio.set8(0xfe20_00fe, 2);

    let flags = SdhciPlatform::NO_EMMC_HS200 | SdhciPlatform::CLEAR_TRANSFER_BEFORE_CMD;
    let mut emmc = SdhciHost::new_pci(pci, mmio, dev, flags, 400_000, 200_000_000)?;
    assert_eq!(emmc.pci_dev(), Some(dev));
    assert_eq!(emmc.clock_range(), (400_000, 200_000_000));
    assert!(!emmc.is_removable());
    emmc.update()?;
    assert!(!emmc.need_update());
    Ok(())
}

#[test]
fn test_dwmci_bus_width() {
    let mmio = Arc::new(FakeMmio::new());
    assert!(DwmciHost::new(mmio.clone(), 0x1220_0000, 100_000_000, 3, false, 0).is_err());
    assert!(DwmciHost::new(mmio, 0x1220_0000, 0, 8, false, 0).is_err());
}

#[test]
fn test_dwmci_programs_clksel() -> Result<()> {
    let mmio = Arc::new(FakeMmio::new());
    let mut sd = DwmciHost::new(mmio.clone(), 0x1222_0000, 100_000_000, 4, true, dwmci_clksel(1, 2, 3))?;
    assert_eq!(sd.width(), DwmciWidth::Four);
    assert!(sd.is_removable());

    assert_eq!(sd.update(), Err(ErrorKind::NoDevice));
    mmio.set32(0x1222_006c, 0x5342_240a);
    sd.update()?;
    assert_eq!(mmio.writes(), vec![(0x1222_009c, 0x0302_0001)]);
    Ok(())
}
