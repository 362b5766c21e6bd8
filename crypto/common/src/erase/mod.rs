//! Zeroing of secret material that the optimizer is not allowed to elide.
//!
//! Every write goes through [`core::ptr::write_volatile`] and is followed by a
//! compiler fence, so a buffer that is erased right before it is dropped or
//! reused really is overwritten.
#![allow(clippy::module_name_repetitions)]

use alloc::vec::Vec;

#[inline(always)]
fn atomic_fence() {
    core::sync::atomic::compiler_fence(core::sync::atomic::Ordering::SeqCst);
}

#[inline(always)]
fn volatile_write<T: Copy + Sized>(src: T, dst: &mut T) {
    unsafe { core::ptr::write_volatile(dst, src) }
}

pub trait Erase {
    fn erase(&mut self);
}

/// Marker for types whose `Drop` impl erases their contents.
pub trait EraseOnDrop {}

trait DefaultIsErased: Copy + Default + Sized {}

impl<E: DefaultIsErased> Erase for E {
    fn erase(&mut self) {
        volatile_write(E::default(), self);
        atomic_fence();
    }
}

macro_rules! impl_default_is_erased {
    ($($t:ty),*) => {
        $(
            impl DefaultIsErased for $t {}
        )*
    };
}

#[rustfmt::skip]
impl_default_is_erased! {
    bool, u8, u16, u32, u64, u128, usize
}

impl<E: Erase, const N: usize> Erase for [E; N] {
    fn erase(&mut self) {
        self.as_mut_slice().erase();
    }
}

impl<E: EraseOnDrop, const N: usize> EraseOnDrop for [E; N] {}

impl<E: Erase> Erase for [E] {
    fn erase(&mut self) {
        for elem in self {
            elem.erase();
        }
    }
}

/// Erases the initialized elements and then truncates the vector.
///
/// The allocation is kept, so a cleared cache can be refilled without
/// reallocating.
impl<E: Erase> Erase for Vec<E> {
    fn erase(&mut self) {
        self.as_mut_slice().erase();
        self.clear();
    }
}
