use core::{
    cell::{Cell, RefCell},
    ffi::c_void,
    mem,
};

use anyhow::{Context, bail};
use dx11_lab_renderer::{Extent, Renderer, RendererConfig};
use scopeguard::defer;
use tracing::{debug, trace, warn};
use windows::{
    Win32::{
        Foundation::{HINSTANCE, HWND, LPARAM, LRESULT, RECT, WPARAM},
        System::LibraryLoader::GetModuleHandleW,
        UI::WindowsAndMessaging::{
            AdjustWindowRect, CREATESTRUCTW, CS_HREDRAW, CS_VREDRAW, CW_USEDEFAULT,
            CreateWindowExW, DefWindowProcW, DestroyWindow, DispatchMessageW, GWLP_USERDATA,
            GetClientRect, GetWindowLongPtrW, IDC_ARROW, LoadCursorW, MSG, PM_REMOVE,
            PeekMessageW, PostQuitMessage, RegisterClassExW, SW_SHOW, SetWindowLongPtrW,
            ShowWindow, TranslateMessage, UnregisterClassW, WINDOW_EX_STYLE, WM_DESTROY,
            WM_NCCREATE, WM_NCDESTROY, WM_QUIT, WM_SIZE, WNDCLASSEXW, WS_OVERLAPPEDWINDOW,
        },
    },
    core::{HSTRING, PCWSTR},
};

/// Top level window settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WindowConfig {
    pub title: String,
    pub class_name: String,
    /// Requested client area, the outer window is grown to fit it.
    pub client_extent: Extent,
}

impl WindowConfig {
    pub fn new(title: impl Into<String>) -> Self {
        let title = title.into();
        Self {
            class_name: format!("dx11-lab {title}"),
            title,
            client_extent: RendererConfig::DEFAULT_EXTENT,
        }
    }
}

/// What the window drives: one frame per loop iteration and a rebuild per `WM_SIZE`.
trait FrameTarget {
    fn render(&mut self) -> anyhow::Result<()>;

    fn resize(&mut self, extent: Extent) -> anyhow::Result<()>;
}

impl FrameTarget for Renderer {
    fn render(&mut self) -> anyhow::Result<()> {
        Ok(Renderer::render(self)?)
    }

    fn resize(&mut self, extent: Extent) -> anyhow::Result<()> {
        Ok(Renderer::resize(self, extent)?)
    }
}

/// Data reachable from the window procedure through `GWLP_USERDATA`.
struct WindowState<R> {
    renderer: RefCell<Option<R>>,
    /// Size reported while the renderer was borrowed by a frame.
    pending_extent: Cell<Option<Extent>>,
    destroyed: Cell<bool>,
}

impl<R: FrameTarget> WindowState<R> {
    fn new() -> Self {
        Self {
            renderer: RefCell::new(None),
            pending_extent: Cell::new(None),
            destroyed: Cell::new(false),
        }
    }

    fn resize(&self, extent: Extent) {
        let Ok(mut renderer) = self.renderer.try_borrow_mut() else {
            trace!("renderer busy, deferring resize. extent: {extent:?}");
            self.pending_extent.set(Some(extent));
            return;
        };

        // not created yet, init reads the client size itself
        if let Some(ref mut renderer) = *renderer {
            if let Err(err) = renderer.resize(extent) {
                warn!("resize failed, presenting without a render target. err: {err}");
            }
        }
    }

    /// Applies the last size deferred by [`resize`](Self::resize), then renders a frame.
    fn render(&self) -> anyhow::Result<()> {
        if let Some(extent) = self.pending_extent.take() {
            self.resize(extent);
        }

        if let Some(ref mut renderer) = *self.renderer.borrow_mut() {
            renderer.render().context("frame submission failed")?;
        }

        Ok(())
    }

    /// Drops the renderer. Returns `false` if a frame still holds it.
    fn release_renderer(&self) -> bool {
        match self.renderer.try_borrow_mut() {
            Ok(mut renderer) => {
                if renderer.take().is_some() {
                    debug!("renderer torn down");
                }

                true
            }
            Err(_) => false,
        }
    }
}

/// Opens the window, creates the renderer with `init` and runs the message loop,
/// rendering one frame per iteration.
///
/// Returns the exit code posted with `WM_QUIT`. The renderer is torn down on
/// `WM_DESTROY`, while the window handle is still valid. When the loop ends with an
/// error it is torn down before the window is destroyed.
pub fn run(
    config: &WindowConfig,
    init: impl FnOnce(HWND, Extent) -> anyhow::Result<Renderer>,
) -> anyhow::Result<i32> {
    let instance: HINSTANCE = unsafe { GetModuleHandleW(None) }?.into();
    let class_name = HSTRING::from(config.class_name.as_str());
    let title = HSTRING::from(config.title.as_str());

    let state = Box::new(WindowState::<Renderer>::new());

    register_class::<Renderer>(instance, &class_name)?;
    defer!({
        _ = unsafe { UnregisterClassW(PCWSTR(class_name.as_ptr()), Some(instance)) };
    });

    let hwnd = create_window(instance, &class_name, &title, config.client_extent, &*state)?;
    defer!({
        if !state.destroyed.get() {
            _ = unsafe { DestroyWindow(hwnd) };
        }
    });

    unsafe {
        _ = ShowWindow(hwnd, SW_SHOW);
    }

    let res = init_and_pump(&*state, hwnd, init);
    // left over when the loop ended before WM_DESTROY
    state.release_renderer();

    res
}

fn register_class<R: FrameTarget>(
    instance: HINSTANCE,
    class_name: &HSTRING,
) -> anyhow::Result<()> {
    unsafe {
        if RegisterClassExW(&WNDCLASSEXW {
            cbSize: mem::size_of::<WNDCLASSEXW>() as _,
            style: CS_HREDRAW | CS_VREDRAW,
            lpfnWndProc: Some(window_proc::<R>),
            hInstance: instance,
            hCursor: LoadCursorW(None, IDC_ARROW)?,
            lpszClassName: PCWSTR(class_name.as_ptr()),
            ..Default::default()
        }) == 0
        {
            bail!("RegisterClassExW call failed");
        }
    }

    Ok(())
}

/// Creates a hidden window whose client area is `client_extent`.
///
/// `state` must stay at its address until the window is destroyed.
fn create_window<R: FrameTarget>(
    instance: HINSTANCE,
    class_name: &HSTRING,
    title: &HSTRING,
    client_extent: Extent,
    state: &WindowState<R>,
) -> anyhow::Result<HWND> {
    let mut rect = RECT {
        left: 0,
        top: 0,
        right: client_extent.width as _,
        bottom: client_extent.height as _,
    };
    unsafe { AdjustWindowRect(&mut rect, WS_OVERLAPPEDWINDOW, false) }?;

    let hwnd = unsafe {
        CreateWindowExW(
            WINDOW_EX_STYLE(0),
            PCWSTR(class_name.as_ptr()),
            title,
            WS_OVERLAPPEDWINDOW,
            CW_USEDEFAULT,
            CW_USEDEFAULT,
            rect.right - rect.left,
            rect.bottom - rect.top,
            None,
            None,
            Some(instance),
            Some(state as *const WindowState<R> as *const c_void),
        )
    }
    .context("cannot create window")?;

    Ok(hwnd)
}

fn init_and_pump<R: FrameTarget>(
    state: &WindowState<R>,
    hwnd: HWND,
    init: impl FnOnce(HWND, Extent) -> anyhow::Result<R>,
) -> anyhow::Result<i32> {
    let mut rect = RECT::default();
    unsafe { GetClientRect(hwnd, &mut rect) }?;
    let extent = Extent::new(rect.right as u32, rect.bottom as u32);

    let renderer = init(hwnd, extent).context("renderer initialization failed")?;
    *state.renderer.borrow_mut() = Some(renderer);

    let mut msg = MSG::default();
    loop {
        while unsafe { PeekMessageW(&mut msg, None, 0, 0, PM_REMOVE) }.as_bool() {
            if msg.message == WM_QUIT {
                debug!("quit requested. code: {}", msg.wParam.0);
                return Ok(msg.wParam.0 as i32);
            }

            unsafe {
                _ = TranslateMessage(&msg);
                DispatchMessageW(&msg);
            }
        }

        state.render()?;
    }
}

/// # Safety
/// `GWLP_USERDATA` only ever holds the `WindowState<R>` passed to `CreateWindowExW`,
/// which outlives the window.
unsafe fn window_state<'a, R>(hwnd: HWND) -> Option<&'a WindowState<R>> {
    unsafe { (GetWindowLongPtrW(hwnd, GWLP_USERDATA) as *const WindowState<R>).as_ref() }
}

extern "system" fn window_proc<R: FrameTarget>(
    hwnd: HWND,
    msg: u32,
    wparam: WPARAM,
    lparam: LPARAM,
) -> LRESULT {
    match msg {
        WM_NCCREATE => unsafe {
            let create = &*(lparam.0 as *const CREATESTRUCTW);
            SetWindowLongPtrW(hwnd, GWLP_USERDATA, create.lpCreateParams as _);
        },

        WM_SIZE => {
            if let Some(state) = unsafe { window_state::<R>(hwnd) } {
                state.resize(Extent::from_size_lparam(lparam.0));
            }

            return LRESULT(0);
        }

        WM_DESTROY => {
            if let Some(state) = unsafe { window_state::<R>(hwnd) } {
                state.destroyed.set(true);
                if !state.release_renderer() {
                    warn!("renderer busy on WM_DESTROY, releasing after the loop");
                }
            }
            unsafe { PostQuitMessage(0) };

            return LRESULT(0);
        }

        WM_NCDESTROY => unsafe {
            SetWindowLongPtrW(hwnd, GWLP_USERDATA, 0);
        },

        _ => {}
    }

    unsafe { DefWindowProcW(hwnd, msg, wparam, lparam) }
}

#[cfg(test)]
mod tests {
    use std::rc::Rc;

    use windows::Win32::UI::WindowsAndMessaging::{IsWindow, SendMessageW};

    use super::*;

    #[derive(Default)]
    struct Calls {
        resized: RefCell<Vec<Extent>>,
        /// `IsWindow` of the owning window at drop time.
        dropped_with_window: Cell<Option<bool>>,
    }

    struct Recorder {
        calls: Rc<Calls>,
        hwnd: HWND,
    }

    impl FrameTarget for Recorder {
        fn render(&mut self) -> anyhow::Result<()> {
            Ok(())
        }

        fn resize(&mut self, extent: Extent) -> anyhow::Result<()> {
            self.calls.resized.borrow_mut().push(extent);
            Ok(())
        }
    }

    impl Drop for Recorder {
        fn drop(&mut self) {
            let alive = unsafe { IsWindow(Some(self.hwnd)) }.as_bool();
            self.calls.dropped_with_window.set(Some(alive));
        }
    }

    /// Runs `f` against a hidden window of its own class with a recording renderer.
    fn with_window(name: &str, f: impl FnOnce(HWND, &WindowState<Recorder>, &Calls)) {
        let instance: HINSTANCE = unsafe { GetModuleHandleW(None) }.unwrap().into();
        let class_name = HSTRING::from(format!("dx11-lab test {name}"));
        let state = Box::new(WindowState::<Recorder>::new());

        register_class::<Recorder>(instance, &class_name).unwrap();
        let hwnd = create_window(
            instance,
            &class_name,
            &HSTRING::from(name),
            Extent::new(320, 240),
            &*state,
        )
        .unwrap();

        let calls = Rc::new(Calls::default());
        *state.renderer.borrow_mut() = Some(Recorder {
            calls: calls.clone(),
            hwnd,
        });

        f(hwnd, &state, &calls);

        if !state.destroyed.get() {
            unsafe { DestroyWindow(hwnd) }.unwrap();
        }
        // WM_QUIT posted by WM_DESTROY
        let mut msg = MSG::default();
        while unsafe { PeekMessageW(&mut msg, None, 0, 0, PM_REMOVE) }.as_bool() {}
        unsafe { UnregisterClassW(PCWSTR(class_name.as_ptr()), Some(instance)) }.unwrap();
    }

    fn size_lparam(width: u16, height: u16) -> LPARAM {
        LPARAM(((height as isize) << 16) | width as isize)
    }

    #[test]
    fn renderer_dropped_while_window_exists() {
        with_window("destroy", |hwnd, state, calls| {
            unsafe { DestroyWindow(hwnd) }.unwrap();

            assert!(state.destroyed.get());
            assert!(state.renderer.borrow().is_none());
            assert_eq!(calls.dropped_with_window.get(), Some(true));
        });
    }

    #[test]
    fn resize_forwarded_to_renderer() {
        with_window("resize", |hwnd, _, calls| {
            unsafe { SendMessageW(hwnd, WM_SIZE, None, Some(size_lparam(640, 480))) };

            assert_eq!(calls.resized.borrow().last(), Some(&Extent::new(640, 480)));
        });
    }

    #[test]
    fn resize_during_frame_applied_before_next_frame() {
        with_window("deferred", |hwnd, state, calls| {
            calls.resized.borrow_mut().clear();
            {
                let _frame = state.renderer.borrow_mut();
                unsafe { SendMessageW(hwnd, WM_SIZE, None, Some(size_lparam(800, 600))) };
                unsafe { SendMessageW(hwnd, WM_SIZE, None, Some(size_lparam(640, 480))) };
            }
            assert!(calls.resized.borrow().is_empty());

            state.render().unwrap();
            assert_eq!(*calls.resized.borrow(), [Extent::new(640, 480)]);
            assert_eq!(state.pending_extent.get(), None);
        });
    }
}
