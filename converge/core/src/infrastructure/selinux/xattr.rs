// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Raw access to the `security.selinux` extended attribute.
//!
//! Both calls operate on the link itself, never its target.

use std::ffi::CString;
use std::io;
use std::os::unix::ffi::OsStrExt;
use std::path::Path;

const SELINUX_XATTR: &[u8] = b"security.selinux\0";
const INITIAL_LABEL_BUFFER: usize = 256;

fn c_path(path: &Path) -> io::Result<CString> {
    CString::new(path.as_os_str().as_bytes())
        .map_err(|_| io::Error::new(io::ErrorKind::InvalidInput, "path contains null byte"))
}

/// Read the label of `path`, without the trailing NUL the kernel stores.
pub fn get_label(path: &Path) -> io::Result<String> {
    let c_path = c_path(path)?;
    let name = SELINUX_XATTR.as_ptr() as *const libc::c_char;
    let mut buffer = vec![0u8; INITIAL_LABEL_BUFFER];

    loop {
        // SAFETY: path and name are NUL-terminated; buffer length matches allocation.
        let size = unsafe {
            libc::lgetxattr(
                c_path.as_ptr(),
                name,
                buffer.as_mut_ptr() as *mut libc::c_void,
                buffer.len(),
            )
        };

        if size >= 0 {
            buffer.truncate(size as usize);
            break;
        }

        let err = io::Error::last_os_error();
        if err.raw_os_error() != Some(libc::ERANGE) {
            return Err(err);
        }

        // SAFETY: a zero-sized query only returns the attribute length.
        let needed = unsafe { libc::lgetxattr(c_path.as_ptr(), name, std::ptr::null_mut(), 0) };
        if needed < 0 {
            return Err(io::Error::last_os_error());
        }
        buffer = vec![0u8; needed as usize + 1];
    }

    while buffer.last() == Some(&0) {
        buffer.pop();
    }

    String::from_utf8(buffer).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
}

/// Write `label` to `path`.
pub fn set_label(path: &Path, label: &str) -> io::Result<()> {
    let c_path = c_path(path)?;
    let name = SELINUX_XATTR.as_ptr() as *const libc::c_char;
    // The kernel expects the NUL terminator as part of the value.
    let value = CString::new(label)
        .map_err(|_| io::Error::new(io::ErrorKind::InvalidInput, "label contains null byte"))?;
    let bytes = value.as_bytes_with_nul();

    // SAFETY: path and name are NUL-terminated; value length matches the slice.
    let rc = unsafe {
        libc::lsetxattr(
            c_path.as_ptr(),
            name,
            bytes.as_ptr() as *const libc::c_void,
            bytes.len(),
            0,
        )
    };

    if rc == 0 {
        Ok(())
    } else {
        Err(io::Error::last_os_error())
    }
}
