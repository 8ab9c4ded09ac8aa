#![cfg(windows)]

//! # Windows Backend
//!
//! Concrete backend over Win32 and XInput:
//!
//! - [`XInputDevice`]: `XInputGetState` / `XInputSetState` on slots 0-3
//! - [`Win32Pointer`]: `GetCursorPos` / `SetCursorPos` / `SendInput`
//! - [`Win32Displays`]: `EnumDisplayMonitors` + `GetMonitorInfoW`
//!
//! All three are stateless handles; the OS owns the actual state.

use std::io;

use windows_sys::Win32::Foundation::{LPARAM, POINT, RECT};
use windows_sys::Win32::Graphics::Gdi::{
    EnumDisplayMonitors, GetMonitorInfoW, HDC, HMONITOR, MONITORINFO, MONITORINFOEXW,
    MONITORINFOF_PRIMARY,
};
use windows_sys::Win32::UI::Input::KeyboardAndMouse::{
    SendInput, INPUT, INPUT_0, INPUT_MOUSE, MOUSEEVENTF_LEFTDOWN, MOUSEEVENTF_LEFTUP,
    MOUSEEVENTF_MIDDLEDOWN, MOUSEEVENTF_MIDDLEUP, MOUSEEVENTF_RIGHTDOWN, MOUSEEVENTF_RIGHTUP,
    MOUSEEVENTF_WHEEL, MOUSEINPUT,
};
use windows_sys::Win32::UI::Input::XboxController::{
    XInputGetState, XInputSetState, XINPUT_STATE, XINPUT_VIBRATION,
};
use windows_sys::Win32::UI::WindowsAndMessaging::{GetCursorPos, SetCursorPos};

use crate::backend::{DeviceBackend, DisplayBackend, PointerAction, PointerBackend, RawSample};
use crate::display::{Display, Rect};

/// Controller backend over the XInput API.
pub struct XInputDevice;

impl DeviceBackend for XInputDevice {
    fn query(&self, index: u32) -> Option<RawSample> {
        let mut state: XINPUT_STATE = unsafe { std::mem::zeroed() };
        // Any nonzero result means no device in this slot
        if unsafe { XInputGetState(index, &mut state) } != 0 {
            return None;
        }

        Some(RawSample {
            packet: state.dwPacketNumber,
            buttons: state.Gamepad.wButtons,
            left_trigger: state.Gamepad.bLeftTrigger,
            right_trigger: state.Gamepad.bRightTrigger,
            thumb_lx: state.Gamepad.sThumbLX,
            thumb_ly: state.Gamepad.sThumbLY,
            thumb_rx: state.Gamepad.sThumbRX,
            thumb_ry: state.Gamepad.sThumbRY,
        })
    }

    fn set_vibration(&self, index: u32, left_motor: u16, right_motor: u16) -> io::Result<()> {
        let mut vibration = XINPUT_VIBRATION {
            wLeftMotorSpeed: left_motor,
            wRightMotorSpeed: right_motor,
        };
        let result = unsafe { XInputSetState(index, &mut vibration) };
        if result == 0 {
            Ok(())
        } else {
            Err(io::Error::new(
                io::ErrorKind::Other,
                format!("XInputSetState returned {result}"),
            ))
        }
    }
}

/// Cursor and input-injection backend over user32.
pub struct Win32Pointer;

impl Win32Pointer {
    fn send_mouse_input(&self, flags: u32, data: i32) -> io::Result<()> {
        let input = INPUT {
            r#type: INPUT_MOUSE,
            Anonymous: INPUT_0 {
                mi: MOUSEINPUT {
                    dx: 0,
                    dy: 0,
                    mouseData: data as _,
                    dwFlags: flags,
                    time: 0,
                    dwExtraInfo: 0,
                },
            },
        };

        let sent = unsafe { SendInput(1, &input, std::mem::size_of::<INPUT>() as i32) };
        if sent == 1 {
            Ok(())
        } else {
            Err(io::Error::last_os_error())
        }
    }
}

impl PointerBackend for Win32Pointer {
    fn cursor_position(&self) -> io::Result<(i32, i32)> {
        let mut point = POINT { x: 0, y: 0 };
        if unsafe { GetCursorPos(&mut point) } != 0 {
            Ok((point.x, point.y))
        } else {
            Err(io::Error::last_os_error())
        }
    }

    fn set_cursor_position(&self, x: i32, y: i32) -> io::Result<()> {
        if unsafe { SetCursorPos(x, y) } != 0 {
            Ok(())
        } else {
            Err(io::Error::last_os_error())
        }
    }

    fn inject(&self, action: PointerAction) -> io::Result<()> {
        let (flags, data) = match action {
            PointerAction::LeftDown => (MOUSEEVENTF_LEFTDOWN, 0),
            PointerAction::LeftUp => (MOUSEEVENTF_LEFTUP, 0),
            PointerAction::RightDown => (MOUSEEVENTF_RIGHTDOWN, 0),
            PointerAction::RightUp => (MOUSEEVENTF_RIGHTUP, 0),
            PointerAction::MiddleDown => (MOUSEEVENTF_MIDDLEDOWN, 0),
            PointerAction::MiddleUp => (MOUSEEVENTF_MIDDLEUP, 0),
            // Wheel ticks ride in the mouseData field
            PointerAction::Wheel(delta) => (MOUSEEVENTF_WHEEL, delta),
        };
        self.send_mouse_input(flags, data)
    }
}

/// Monitor enumeration backend.
pub struct Win32Displays;

unsafe extern "system" fn monitor_callback(
    hmonitor: HMONITOR,
    _hdc: HDC,
    _clip: *mut RECT,
    data: LPARAM,
) -> i32 {
    let displays = &mut *(data as *mut Vec<Display>);

    let mut info: MONITORINFOEXW = std::mem::zeroed();
    info.monitorInfo.cbSize = std::mem::size_of::<MONITORINFOEXW>() as u32;

    if GetMonitorInfoW(hmonitor, &mut info as *mut MONITORINFOEXW as *mut MONITORINFO) != 0 {
        let rc = info.monitorInfo.rcMonitor;
        let len = info
            .szDevice
            .iter()
            .position(|&c| c == 0)
            .unwrap_or(info.szDevice.len());
        let name = String::from_utf16_lossy(&info.szDevice[..len]);

        displays.push(Display::new(
            name,
            Rect::new(rc.left, rc.top, rc.right - rc.left, rc.bottom - rc.top),
            info.monitorInfo.dwFlags & MONITORINFOF_PRIMARY != 0,
        ));
    }

    // Nonzero continues the enumeration
    1
}

impl DisplayBackend for Win32Displays {
    fn enumerate(&self) -> io::Result<Vec<Display>> {
        let mut displays: Vec<Display> = Vec::new();
        let ok = unsafe {
            EnumDisplayMonitors(
                std::ptr::null_mut(),
                std::ptr::null(),
                Some(monitor_callback),
                &mut displays as *mut Vec<Display> as LPARAM,
            )
        };

        if ok != 0 {
            Ok(displays)
        } else {
            Err(io::Error::last_os_error())
        }
    }
}
