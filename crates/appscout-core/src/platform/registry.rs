/// Read-only access to the Windows registry.
///
/// Keys are wrapped in [`RegistryKey`], which closes the handle on drop so
/// no early return can leak it. All failures surface as `None`; callers are
/// best-effort probes that simply contribute nothing.
use windows::core::{PCWSTR, PWSTR};
use windows::Win32::Foundation::ERROR_SUCCESS;
use windows::Win32::System::Registry::{
    RegCloseKey, RegEnumKeyExW, RegGetValueW, RegOpenKeyExW, HKEY, HKEY_LOCAL_MACHINE, KEY_READ,
    RRF_RT_REG_SZ,
};

/// Registry key names are limited to 255 characters.
const MAX_KEY_NAME_CHARS: usize = 256;

/// Upper bound on subkeys enumerated from one key.
const MAX_SUBKEYS: u32 = 10_000;

fn wide(text: &str) -> Vec<u16> {
    text.encode_utf16().chain(std::iter::once(0)).collect()
}

/// An open registry key, closed on drop.
pub struct RegistryKey(HKEY);

impl RegistryKey {
    /// Open `HKEY_LOCAL_MACHINE\<subkey>` for reading.
    pub fn open_local_machine(subkey: &str) -> Option<Self> {
        Self::open(HKEY_LOCAL_MACHINE, subkey)
    }

    fn open(parent: HKEY, subkey: &str) -> Option<Self> {
        let subkey_w = wide(subkey);
        let mut handle = HKEY::default();
        let status = unsafe {
            RegOpenKeyExW(parent, PCWSTR(subkey_w.as_ptr()), 0, KEY_READ, &mut handle)
        };
        (status == ERROR_SUCCESS).then_some(Self(handle))
    }

    /// Open a direct child of this key.
    pub fn subkey(&self, name: &str) -> Option<Self> {
        Self::open(self.0, name)
    }

    /// Read a `REG_SZ` value of this key.
    pub fn string_value(&self, name: &str) -> Option<String> {
        let name_w = wide(name);
        let mut byte_len: u32 = 0;

        // First call sizes the buffer.
        let status = unsafe {
            RegGetValueW(
                self.0,
                PCWSTR::null(),
                PCWSTR(name_w.as_ptr()),
                RRF_RT_REG_SZ,
                None,
                None,
                Some(&mut byte_len),
            )
        };
        if status != ERROR_SUCCESS || byte_len == 0 {
            return None;
        }

        let mut buffer = vec![0u16; (byte_len as usize).div_ceil(2)];
        let status = unsafe {
            RegGetValueW(
                self.0,
                PCWSTR::null(),
                PCWSTR(name_w.as_ptr()),
                RRF_RT_REG_SZ,
                None,
                Some(buffer.as_mut_ptr().cast()),
                Some(&mut byte_len),
            )
        };
        if status != ERROR_SUCCESS {
            return None;
        }

        let len = buffer.iter().position(|&c| c == 0).unwrap_or(buffer.len());
        Some(String::from_utf16_lossy(&buffer[..len]))
    }

    /// Names of all direct subkeys.
    pub fn subkey_names(&self) -> Vec<String> {
        let mut names = Vec::new();
        let mut buffer = [0u16; MAX_KEY_NAME_CHARS];

        for index in 0..MAX_SUBKEYS {
            let mut len = buffer.len() as u32;
            let status = unsafe {
                RegEnumKeyExW(
                    self.0,
                    index,
                    PWSTR(buffer.as_mut_ptr()),
                    &mut len,
                    None,
                    PWSTR::null(),
                    None,
                    None,
                )
            };
            if status != ERROR_SUCCESS {
                break;
            }
            names.push(String::from_utf16_lossy(&buffer[..len as usize]));
        }

        names
    }
}

impl Drop for RegistryKey {
    fn drop(&mut self) {
        unsafe {
            let _ = RegCloseKey(self.0);
        }
    }
}

/// Convenience: read `HKLM\<subkey>\<value>` as a string.
pub fn local_machine_string(subkey: &str, value: &str) -> Option<String> {
    RegistryKey::open_local_machine(subkey)?.string_value(value)
}
