//! Swap chain extent and render target view state.

/// Client area or back buffer size in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Extent {
    pub width: u32,
    pub height: u32,
}

impl Extent {
    #[inline]
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// A minimized window reports a zero sized client area.
    #[inline]
    pub const fn is_empty(self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Unpacks the `LOWORD` / `HIWORD` pair carried by `WM_SIZE`.
    #[inline]
    pub fn from_size_lparam(lparam: isize) -> Self {
        let [width, height] = bytemuck::cast::<u32, [u16; 2]>(lparam as u32);
        Self::new(width as _, height as _)
    }

    /// Viewport covering the whole extent as `[x, y, width, height]`.
    #[inline]
    pub fn viewport(self) -> [f32; 4] {
        [0.0, 0.0, self.width as f32, self.height as f32]
    }
}

/// Render target view slot of a swap chain.
///
/// The view has to be released before the swap chain buffers are resized, so a resize
/// takes it out with [`begin_resize`](Self::begin_resize) and puts the new one back with
/// [`finish_resize`](Self::finish_resize). If no new view could be created the slot stays
/// [`Degraded`](Self::Degraded) and frames are presented without a bound target until the
/// next successful resize.
#[derive(Debug)]
pub enum RenderTarget<V> {
    Bound(V),
    Resizing,
    Degraded,
}

impl<V> RenderTarget<V> {
    #[inline]
    pub const fn view(&self) -> Option<&V> {
        match self {
            Self::Bound(view) => Some(view),
            _ => None,
        }
    }

    #[inline]
    pub const fn is_degraded(&self) -> bool {
        matches!(self, Self::Degraded)
    }

    /// Takes the current view out. The caller drops it before touching the swap chain.
    pub fn begin_resize(&mut self) -> Option<V> {
        match core::mem::replace(self, Self::Resizing) {
            Self::Bound(view) => Some(view),
            _ => None,
        }
    }

    pub fn finish_resize<E>(&mut self, view: Result<V, E>) -> Result<(), E> {
        match view {
            Ok(view) => {
                *self = Self::Bound(view);
                Ok(())
            }
            Err(err) => {
                *self = Self::Degraded;
                Err(err)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::{cell::Cell, rc::Rc};

    use super::*;

    struct CountedView(Rc<Cell<u32>>);

    impl Drop for CountedView {
        fn drop(&mut self) {
            self.0.set(self.0.get() + 1);
        }
    }

    #[test]
    fn size_lparam_unpacks_low_and_high_words() {
        assert_eq!(
            Extent::from_size_lparam((720 << 16) | 1280),
            Extent::new(1280, 720)
        );
        assert_eq!(Extent::from_size_lparam((480 << 16) | 640), Extent::new(640, 480));
        assert!(Extent::from_size_lparam(0).is_empty());
        assert!(Extent::new(640, 0).is_empty());
    }

    #[test]
    fn viewport_covers_extent() {
        assert_eq!(Extent::new(640, 480).viewport(), [0.0, 0.0, 640.0, 480.0]);
    }

    #[test]
    fn view_released_before_resize() {
        let released = Rc::new(Cell::new(0));
        let mut target = RenderTarget::Bound(CountedView(released.clone()));

        drop(target.begin_resize());
        assert_eq!(released.get(), 1);
        assert!(target.view().is_none());
        assert!(!target.is_degraded());

        target
            .finish_resize::<()>(Ok(CountedView(released.clone())))
            .unwrap();
        assert!(target.view().is_some());
        assert_eq!(released.get(), 1);
    }

    #[test]
    fn failed_resize_degrades() {
        let mut target = RenderTarget::Bound(1);

        assert_eq!(target.begin_resize(), Some(1));
        assert_eq!(target.finish_resize(Err("GetBuffer failed")), Err("GetBuffer failed"));
        assert!(target.is_degraded());
        assert_eq!(target.view(), None);

        // nothing left to release
        assert_eq!(target.begin_resize(), None);
        target.finish_resize::<()>(Ok(2)).unwrap();
        assert_eq!(target.view(), Some(&2));
    }

    #[test]
    fn repeated_resizes_keep_one_view() {
        let released = Rc::new(Cell::new(0));
        let mut target = RenderTarget::Bound(CountedView(released.clone()));

        for round in 1..=3 {
            drop(target.begin_resize());
            assert_eq!(released.get(), round);
            target
                .finish_resize::<()>(Ok(CountedView(released.clone())))
                .unwrap();
        }

        drop(target);
        assert_eq!(released.get(), 4);
    }
}
