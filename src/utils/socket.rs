use std::io;
use std::os::raw::c_void;

/// Datagram socket used only as an ioctl target. Closed on drop, so every
/// early return from a query releases it.
#[derive(Debug)]
pub struct ControlSocket {
    fd: libc::c_int,
}

impl ControlSocket {
    pub fn open() -> io::Result<Self> {
        // SAFETY: plain socket(2) call; the descriptor is owned by the returned value.
        let fd = unsafe { libc::socket(libc::AF_INET, libc::SOCK_DGRAM, 0) };
        if fd < 0 {
            return Err(io::Error::last_os_error());
        }
        Ok(Self { fd })
    }

    /// Issues `request` with `arg` pointing at a request structure.
    ///
    /// # Safety
    ///
    /// `arg` must point to a live structure of the layout `request` expects.
    pub unsafe fn ioctl(&self, request: u64, arg: *mut c_void) -> io::Result<()> {
        if libc::ioctl(self.fd, request as _, arg) < 0 {
            return Err(io::Error::last_os_error());
        }
        Ok(())
    }
}

impl Drop for ControlSocket {
    fn drop(&mut self) {
        // SAFETY: fd was returned by socket(2) and is closed exactly once.
        unsafe {
            libc::close(self.fd);
        }
    }
}
