//! Native Windows registry backend.
//!
//! [`WindowsKeyStore`] is a thin unsafe adapter from the [`KeyStore`] port
//! to the Win32 registry API. It is stateless: handles are the OS's own
//! `HKEY` values, access modes are enforced by the OS, and every
//! fresh-truth and name-case property the port promises is the registry's
//! native behavior. Enumeration and named reads run the usual two-step
//! size-then-data dance, retrying on `ERROR_MORE_DATA`.

use winapi::shared::minwindef::{BYTE, DWORD, HKEY};
use winapi::shared::winerror::{
    ERROR_ACCESS_DENIED, ERROR_FILE_NOT_FOUND, ERROR_MORE_DATA, ERROR_NO_MORE_ITEMS,
    ERROR_SUCCESS,
};
use winapi::um::winnt::{KEY_READ, KEY_WRITE, REG_OPTION_NON_VOLATILE};
use winapi::um::winreg::{
    RegCloseKey, RegCreateKeyExW, RegDeleteKeyW, RegDeleteValueW, RegEnumKeyExW, RegEnumValueW,
    RegOpenKeyExW, RegQueryValueExW, RegSetValueExW,
};

use hivetree_types::Hive;

use crate::error::{StoreError, StoreResult};
use crate::handle::KeyHandle;
use crate::traits::{Access, KeyStore, RawValue};

/// The Win32 registry as a [`KeyStore`].
#[derive(Clone, Copy, Debug, Default)]
pub struct WindowsKeyStore;

impl WindowsKeyStore {
    pub fn new() -> Self {
        WindowsKeyStore
    }
}

fn hive_hkey(hive: Hive) -> HKEY {
    // Predefined handles are sign-extended on 64-bit.
    hive.raw() as i32 as isize as HKEY
}

fn to_hkey(handle: KeyHandle) -> HKEY {
    handle.raw() as usize as HKEY
}

fn from_hkey(hkey: HKEY) -> KeyHandle {
    KeyHandle::new(hkey as usize as u64)
}

fn wide(s: &str) -> Vec<u16> {
    s.encode_utf16().chain(std::iter::once(0)).collect()
}

fn check(code: i32, context: &'static str) -> StoreResult<()> {
    if code as DWORD == ERROR_SUCCESS {
        Ok(())
    } else {
        Err(StoreError::Native { code, context })
    }
}

impl KeyStore for WindowsKeyStore {
    fn open(&self, hive: Hive, path: &str, access: Access) -> StoreResult<KeyHandle> {
        let sam = match access {
            Access::Read => KEY_READ,
            Access::Write => KEY_READ | KEY_WRITE,
        };
        let subkey = wide(path);
        let mut hkey: HKEY = std::ptr::null_mut();
        let code = unsafe { RegOpenKeyExW(hive_hkey(hive), subkey.as_ptr(), 0, sam, &mut hkey) };
        if code as DWORD == ERROR_FILE_NOT_FOUND {
            return Err(StoreError::KeyNotFound {
                path: format!("{hive}\\{path}"),
            });
        }
        check(code, "open")?;
        Ok(from_hkey(hkey))
    }

    fn create(&self, hive: Hive, path: &str) -> StoreResult<KeyHandle> {
        let subkey = wide(path);
        let mut hkey: HKEY = std::ptr::null_mut();
        let code = unsafe {
            RegCreateKeyExW(
                hive_hkey(hive),
                subkey.as_ptr(),
                0,
                std::ptr::null_mut(),
                REG_OPTION_NON_VOLATILE,
                KEY_READ | KEY_WRITE,
                std::ptr::null_mut(),
                &mut hkey,
                std::ptr::null_mut(),
            )
        };
        check(code, "create")?;
        Ok(from_hkey(hkey))
    }

    fn close(&self, handle: KeyHandle) -> StoreResult<()> {
        check(unsafe { RegCloseKey(to_hkey(handle)) }, "close")
    }

    fn subkey_name(&self, handle: KeyHandle, index: usize) -> StoreResult<Option<String>> {
        let mut capacity: DWORD = 256;
        loop {
            let mut buf = vec![0u16; capacity as usize];
            let mut len = capacity;
            let code = unsafe {
                RegEnumKeyExW(
                    to_hkey(handle),
                    index as DWORD,
                    buf.as_mut_ptr(),
                    &mut len,
                    std::ptr::null_mut(),
                    std::ptr::null_mut(),
                    std::ptr::null_mut(),
                    std::ptr::null_mut(),
                )
            };
            match code as DWORD {
                ERROR_SUCCESS => {
                    return Ok(Some(String::from_utf16_lossy(&buf[..len as usize])));
                }
                ERROR_NO_MORE_ITEMS => return Ok(None),
                ERROR_MORE_DATA => capacity *= 2,
                ERROR_FILE_NOT_FOUND => {
                    return Err(StoreError::KeyNotFound {
                        path: String::new(),
                    })
                }
                _ => return Err(StoreError::Native { code, context: "enumerate subkeys" }),
            }
        }
    }

    fn value_entry(
        &self,
        handle: KeyHandle,
        index: usize,
    ) -> StoreResult<Option<(String, RawValue)>> {
        let mut name_capacity: DWORD = 256;
        let mut data_capacity: DWORD = 256;
        loop {
            let mut name = vec![0u16; name_capacity as usize];
            let mut name_len = name_capacity;
            let mut data = vec![0u8; data_capacity as usize];
            let mut data_len = data_capacity;
            let mut tag: DWORD = 0;
            let code = unsafe {
                RegEnumValueW(
                    to_hkey(handle),
                    index as DWORD,
                    name.as_mut_ptr(),
                    &mut name_len,
                    std::ptr::null_mut(),
                    &mut tag,
                    data.as_mut_ptr() as *mut BYTE,
                    &mut data_len,
                )
            };
            match code as DWORD {
                ERROR_SUCCESS => {
                    data.truncate(data_len as usize);
                    return Ok(Some((
                        String::from_utf16_lossy(&name[..name_len as usize]),
                        RawValue { tag, data },
                    )));
                }
                ERROR_NO_MORE_ITEMS => return Ok(None),
                ERROR_MORE_DATA => {
                    name_capacity *= 2;
                    data_capacity = data_capacity.max(data_len) * 2;
                }
                _ => return Err(StoreError::Native { code, context: "enumerate values" }),
            }
        }
    }

    fn read_value(&self, handle: KeyHandle, name: &str) -> StoreResult<Option<RawValue>> {
        let name = wide(name);
        let mut tag: DWORD = 0;
        let mut data_len: DWORD = 0;
        // First call sizes the payload, second fetches it.
        let code = unsafe {
            RegQueryValueExW(
                to_hkey(handle),
                name.as_ptr(),
                std::ptr::null_mut(),
                &mut tag,
                std::ptr::null_mut(),
                &mut data_len,
            )
        };
        if code as DWORD == ERROR_FILE_NOT_FOUND {
            return Ok(None);
        }
        check(code, "read value")?;
        loop {
            let mut data = vec![0u8; data_len as usize];
            let code = unsafe {
                RegQueryValueExW(
                    to_hkey(handle),
                    name.as_ptr(),
                    std::ptr::null_mut(),
                    &mut tag,
                    data.as_mut_ptr() as *mut BYTE,
                    &mut data_len,
                )
            };
            match code as DWORD {
                ERROR_SUCCESS => {
                    data.truncate(data_len as usize);
                    return Ok(Some(RawValue { tag, data }));
                }
                // The value grew between the two calls.
                ERROR_MORE_DATA => continue,
                ERROR_FILE_NOT_FOUND => return Ok(None),
                _ => return Err(StoreError::Native { code, context: "read value" }),
            }
        }
    }

    fn write_value(&self, handle: KeyHandle, name: &str, value: &RawValue) -> StoreResult<()> {
        let name = wide(name);
        let code = unsafe {
            RegSetValueExW(
                to_hkey(handle),
                name.as_ptr(),
                0,
                value.tag,
                value.data.as_ptr(),
                value.data.len() as DWORD,
            )
        };
        if code as DWORD == ERROR_ACCESS_DENIED {
            return Err(StoreError::ReadOnlyHandle);
        }
        check(code, "write value")
    }

    fn remove_value(&self, handle: KeyHandle, name: &str) -> StoreResult<bool> {
        let name = wide(name);
        let code = unsafe { RegDeleteValueW(to_hkey(handle), name.as_ptr()) };
        if code as DWORD == ERROR_FILE_NOT_FOUND {
            return Ok(false);
        }
        if code as DWORD == ERROR_ACCESS_DENIED {
            return Err(StoreError::ReadOnlyHandle);
        }
        check(code, "remove value")?;
        Ok(true)
    }

    fn remove_key(&self, hive: Hive, path: &str) -> StoreResult<bool> {
        if path.is_empty() {
            // Hive roots are permanent.
            return Ok(false);
        }
        let subkey = wide(path);
        let code = unsafe { RegDeleteKeyW(hive_hkey(hive), subkey.as_ptr()) };
        match code as DWORD {
            ERROR_SUCCESS => Ok(true),
            ERROR_FILE_NOT_FOUND => Ok(false),
            // The registry reports a subkey-bearing key as access-denied.
            ERROR_ACCESS_DENIED => Err(StoreError::NotEmpty {
                path: format!("{hive}\\{path}"),
            }),
            _ => Err(StoreError::Native { code, context: "remove key" }),
        }
    }
}
