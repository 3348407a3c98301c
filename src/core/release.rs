//! Release string of the running kernel
use crate::error::ModinfoError;
use std::ffi::CStr;
use std::io;
use std::mem::MaybeUninit;

/// `uname -r` equivalent
pub fn running_release() -> Result<String, ModinfoError> {
    let mut uts = MaybeUninit::<libc::utsname>::zeroed();
    // SAFETY: uname fills the struct it is given; it is zeroed, so even a partial
    // fill leaves every field NUL-terminated.
    let rc = unsafe { libc::uname(uts.as_mut_ptr()) };
    if rc != 0 {
        return Err(ModinfoError::KernelRelease(io::Error::last_os_error()));
    }
    let uts = unsafe { uts.assume_init() };
    let release = unsafe { CStr::from_ptr(uts.release.as_ptr()) };
    Ok(release.to_string_lossy().into_owned())
}
