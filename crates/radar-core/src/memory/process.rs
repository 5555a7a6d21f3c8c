//! Live process attachment and memory reads (Windows only).

use std::ffi::c_void;

use tracing::{debug, info};
use windows::Win32::Foundation::{BOOL, CloseHandle, HANDLE, STILL_ACTIVE};
use windows::Win32::System::Diagnostics::Debug::ReadProcessMemory;
use windows::Win32::System::Diagnostics::ToolHelp::{
    CreateToolhelp32Snapshot, MODULEENTRY32W, Module32FirstW, Module32NextW, PROCESSENTRY32W,
    Process32FirstW, Process32NextW, TH32CS_SNAPMODULE, TH32CS_SNAPMODULE32, TH32CS_SNAPPROCESS,
};
use windows::Win32::System::Threading::{
    GetExitCodeProcess, OpenProcess, PROCESS_QUERY_LIMITED_INFORMATION, PROCESS_VM_READ,
};

use crate::error::{Error, Result};
use crate::memory::ReadMemory;

/// Open handle to the target process plus its module base address.
///
/// Created once at startup; the handle is closed on drop. The base address
/// is resolved at attach time and never refreshed — the main module does
/// not relocate while the process lives.
pub struct ProcessHandle {
    pub pid: u32,
    pub base_address: u64,
    handle: HANDLE,
}

impl ProcessHandle {
    /// Attach to a running process by executable name (case-insensitive)
    /// and resolve its main module base.
    pub fn attach(process_name: &str) -> Result<Self> {
        let pid = find_process_id(process_name)?;
        let base_address = find_module_base(pid, process_name)?;

        // SAFETY: OpenProcess with read-only access rights; the returned
        // handle is owned by ProcessHandle and closed on drop.
        let handle = unsafe {
            OpenProcess(
                PROCESS_VM_READ | PROCESS_QUERY_LIMITED_INFORMATION,
                BOOL::from(false),
                pid,
            )
        }
        .map_err(|e| Error::ProcessOpenFailed(format!("{process_name} (pid {pid}): {e}")))?;

        info!(
            "Attached to {} (pid: {}, base: {:#x})",
            process_name, pid, base_address
        );

        Ok(Self {
            pid,
            base_address,
            handle,
        })
    }

    /// Whether the process is still running.
    pub fn is_alive(&self) -> bool {
        let mut exit_code = 0u32;
        // SAFETY: handle is valid for the lifetime of self.
        match unsafe { GetExitCodeProcess(self.handle, &mut exit_code) } {
            Ok(()) => exit_code == STILL_ACTIVE.0 as u32,
            Err(_) => false,
        }
    }

    fn read(&self, address: u64, size: usize) -> Result<Vec<u8>> {
        let mut buffer = vec![0u8; size];
        let mut bytes_read = 0usize;
        // SAFETY: buffer is valid for `size` bytes; ReadProcessMemory fails
        // cleanly on unmapped or protected target addresses.
        unsafe {
            ReadProcessMemory(
                self.handle,
                address as *const c_void,
                buffer.as_mut_ptr() as *mut c_void,
                size,
                Some(&mut bytes_read),
            )
        }
        .map_err(|e| Error::MemoryReadFailed {
            address,
            message: e.to_string(),
        })?;

        if bytes_read != size {
            return Err(Error::MemoryReadFailed {
                address,
                message: format!("short read: {bytes_read} of {size} bytes"),
            });
        }
        Ok(buffer)
    }
}

impl Drop for ProcessHandle {
    fn drop(&mut self) {
        // SAFETY: handle was opened by us and not closed elsewhere.
        unsafe {
            let _ = CloseHandle(self.handle);
        }
    }
}

/// [`ReadMemory`] implementation backed by a live [`ProcessHandle`].
pub struct MemoryReader {
    process: ProcessHandle,
}

impl MemoryReader {
    pub fn new(process: ProcessHandle) -> Self {
        Self { process }
    }

    /// Attach to `process_name` and wrap the handle in a reader.
    pub fn attach(process_name: &str) -> Result<Self> {
        Ok(Self::new(ProcessHandle::attach(process_name)?))
    }

    pub fn process(&self) -> &ProcessHandle {
        &self.process
    }
}

impl ReadMemory for MemoryReader {
    fn base_address(&self) -> u64 {
        self.process.base_address
    }

    fn read_bytes(&self, address: u64, size: usize) -> Result<Vec<u8>> {
        self.process.read(address, size)
    }

    fn is_alive(&self) -> bool {
        self.process.is_alive()
    }
}

fn find_process_id(process_name: &str) -> Result<u32> {
    // SAFETY: snapshot handle is closed before returning on every path.
    unsafe {
        let snapshot = CreateToolhelp32Snapshot(TH32CS_SNAPPROCESS, 0)
            .map_err(|e| Error::ProcessOpenFailed(format!("process snapshot failed: {e}")))?;

        let mut entry = PROCESSENTRY32W {
            dwSize: std::mem::size_of::<PROCESSENTRY32W>() as u32,
            ..Default::default()
        };

        let mut result = Process32FirstW(snapshot, &mut entry);
        while result.is_ok() {
            let name = wide_to_string(&entry.szExeFile);
            if name.eq_ignore_ascii_case(process_name) {
                let pid = entry.th32ProcessID;
                let _ = CloseHandle(snapshot);
                debug!("Found process {} with pid {}", name, pid);
                return Ok(pid);
            }
            result = Process32NextW(snapshot, &mut entry);
        }

        let _ = CloseHandle(snapshot);
        Err(Error::ProcessNotFound(process_name.to_string()))
    }
}

fn find_module_base(pid: u32, module_name: &str) -> Result<u64> {
    // SAFETY: snapshot handle is closed before returning on every path.
    unsafe {
        let snapshot = CreateToolhelp32Snapshot(TH32CS_SNAPMODULE | TH32CS_SNAPMODULE32, pid)
            .map_err(|e| Error::ProcessOpenFailed(format!("module snapshot failed: {e}")))?;

        let mut entry = MODULEENTRY32W {
            dwSize: std::mem::size_of::<MODULEENTRY32W>() as u32,
            ..Default::default()
        };

        let mut result = Module32FirstW(snapshot, &mut entry);
        while result.is_ok() {
            let name = wide_to_string(&entry.szModule);
            if name.eq_ignore_ascii_case(module_name) {
                let base = entry.modBaseAddr as u64;
                let _ = CloseHandle(snapshot);
                return Ok(base);
            }
            result = Module32NextW(snapshot, &mut entry);
        }

        let _ = CloseHandle(snapshot);
        Err(Error::ProcessOpenFailed(format!(
            "module {module_name} not found in pid {pid}"
        )))
    }
}

fn wide_to_string(buf: &[u16]) -> String {
    let len = buf.iter().position(|&c| c == 0).unwrap_or(buf.len());
    String::from_utf16_lossy(&buf[..len])
}
