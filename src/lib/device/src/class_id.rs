/// Capability classes tracked by the [`Registry`](crate::Registry)
#[repr(C)]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ClassId {
	/* Multi-instance classes, enumerated in registration order */
	FixedBlk,	/* Non-removable block device controllers */
	RemovableBlk,	/* Removable block device controllers */
	UsbHost,	/* USB host controllers */

	/* Singleton classes, last registration wins */
	Flash,		/* Boot flash */
	Sound,		/* Boot beep / simple sounds */
	Power,		/* Reboot and power off */
	Tpm,		/* Trusted Platform Module */

	/* Indexed tables */
	VbootEc,	/* Verified boot EC callbacks, by device index */
	Flag,		/* Boot flags (lid, recovery, write protect, ...) */
	Cleanup,	/* Handoff cleanup callbacks */
}

impl ClassId {
    pub const fn is_singleton(self) -> bool {
        matches!(self, Self::Flash | Self::Sound | Self::Power | Self::Tpm)
    }
}
