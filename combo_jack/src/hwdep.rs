//! Verb channel over the ALSA HD-audio hwdep device (`/dev/snd/hwC<card>D<codec>`).
//!
//! Needs `CONFIG_SND_HDA_HWDEP` and write access to the device node.

use std::path::Path;

use combo_jack_lib::channel::VerbChannel;

use crate::Error;

pub struct HwdepChannel {
    #[cfg(target_os = "linux")]
    file: std::fs::File,
}

#[cfg(target_os = "linux")]
mod sys {
    use std::fs::OpenOptions;
    use std::os::unix::io::AsRawFd;
    use std::path::Path;

    use super::HwdepChannel;
    use crate::Error;

    const HDA_HWDEP_VERSION: libc::c_int = 1 << 16;
    // _IOR('H', 0x10, int)
    const HDA_IOCTL_PVERSION: libc::c_ulong = 0x8004_4810;
    // _IOWR('H', 0x11, struct hda_verb_ioctl)
    const HDA_IOCTL_VERB_WRITE: libc::c_ulong = 0xc008_4811;

    #[repr(C)]
    struct HdaVerbIoctl {
        verb: u32,
        res: u32,
    }

    pub fn open(path: &Path) -> Result<HwdepChannel, Error> {
        let file = OpenOptions::new().read(true).write(true).open(path)?;

        let mut version: libc::c_int = 0;
        // SAFETY: PVERSION writes a single int through the pointer
        let ret = unsafe {
            libc::ioctl(
                file.as_raw_fd(),
                HDA_IOCTL_PVERSION as _,
                &mut version as *mut libc::c_int,
            )
        };
        if ret < 0 {
            return Err(std::io::Error::last_os_error().into());
        }
        if version < HDA_HWDEP_VERSION {
            return Err(Error::UnsupportedHwdepVersion(version));
        }

        log::debug!("Hwdep - Opened {} (version 0x{:x})", path.display(), version);

        Ok(HwdepChannel { file })
    }

    pub fn send(channel: &mut HwdepChannel, command: u32) -> Result<u32, Error> {
        let mut val = HdaVerbIoctl {
            verb: command,
            res: 0,
        };
        // SAFETY: VERB_WRITE reads and writes one hda_verb_ioctl, which `val` matches
        let ret = unsafe {
            libc::ioctl(
                channel.file.as_raw_fd(),
                HDA_IOCTL_VERB_WRITE as _,
                &mut val as *mut HdaVerbIoctl,
            )
        };
        if ret < 0 {
            return Err(std::io::Error::last_os_error().into());
        }
        Ok(val.res)
    }
}

#[cfg(not(target_os = "linux"))]
mod sys {
    use std::path::Path;

    use super::HwdepChannel;
    use crate::Error;

    pub fn open(path: &Path) -> Result<HwdepChannel, Error> {
        Err(Error::HwdepUnsupported(path.to_owned()))
    }

    pub fn send(_channel: &mut HwdepChannel, _command: u32) -> Result<u32, Error> {
        unreachable!("hwdep channels cannot be opened on this platform")
    }
}

impl HwdepChannel {
    pub fn open(path: &Path) -> Result<Self, Error> {
        sys::open(path)
    }
}

impl VerbChannel for HwdepChannel {
    type Error = Error;

    fn send(&mut self, command: u32) -> Result<u32, Error> {
        sys::send(self, command)
    }
}
