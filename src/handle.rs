use core::fmt;
use core::hash::Hash;
use core::hash::Hasher;
use core::marker::PhantomData;
use core::ptr::NonNull;

/// A non-null, non-owning pointer to a caller-managed value.
///
/// `Handle<T>` is the value type a [`Table`](crate::Table) is meant to hold:
/// the table moves handles around but never reads through them, clones the
/// pointee, or frees it. Keeping the pointee alive for as long as any handle
/// to it is used is entirely the caller's responsibility.
///
/// Copying a handle copies the address only. Equality and hashing compare
/// addresses, not pointees.
///
/// # Examples
///
/// ```rust
/// # use quadprobe::Handle;
/// #
/// let name = String::from("alice");
/// let handle = Handle::from_ref(&name);
/// let copy = handle;
///
/// assert_eq!(handle, copy);
/// // SAFETY: `name` outlives both uses.
/// assert_eq!(unsafe { copy.as_ref() }, "alice");
/// ```
pub struct Handle<T: ?Sized> {
    ptr: NonNull<T>,
    _marker: PhantomData<*const T>,
}

impl<T: ?Sized> Handle<T> {
    /// Wraps a raw pointer, returning `None` if it is null.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use quadprobe::Handle;
    /// #
    /// assert!(Handle::<u8>::new(core::ptr::null_mut()).is_none());
    ///
    /// let mut byte = 7u8;
    /// assert!(Handle::new(&mut byte as *mut u8).is_some());
    /// ```
    #[inline]
    pub fn new(ptr: *mut T) -> Option<Self> {
        NonNull::new(ptr).map(|ptr| Self {
            ptr,
            _marker: PhantomData,
        })
    }

    /// Creates a handle to a shared reference.
    #[inline]
    pub fn from_ref(value: &T) -> Self {
        Self {
            ptr: NonNull::from(value),
            _marker: PhantomData,
        }
    }

    /// Creates a handle to a mutable reference.
    #[inline]
    pub fn from_mut(value: &mut T) -> Self {
        Self {
            ptr: NonNull::from(value),
            _marker: PhantomData,
        }
    }

    /// Returns the wrapped pointer.
    #[inline]
    pub fn as_ptr(self) -> *mut T {
        self.ptr.as_ptr()
    }

    /// Borrows the pointee.
    ///
    /// # Safety
    ///
    /// The caller must ensure the pointee is alive for `'a` and is not
    /// mutated through another path while the borrow is held.
    #[inline]
    pub unsafe fn as_ref<'a>(self) -> &'a T {
        // SAFETY: Caller guarantees the pointee is live and not aliased mutably
        // for `'a`.
        unsafe { self.ptr.as_ref() }
    }
}

impl<T: ?Sized> Clone for Handle<T> {
    #[inline]
    fn clone(&self) -> Self {
        *self
    }
}

impl<T: ?Sized> Copy for Handle<T> {}

impl<T: ?Sized> PartialEq for Handle<T> {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        core::ptr::addr_eq(self.ptr.as_ptr(), other.ptr.as_ptr())
    }
}

impl<T: ?Sized> Eq for Handle<T> {}

impl<T: ?Sized> Hash for Handle<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.ptr.as_ptr().cast::<()>().hash(state);
    }
}

impl<T: ?Sized> fmt::Debug for Handle<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Handle({:p})", self.ptr.as_ptr().cast::<()>())
    }
}

impl<T: ?Sized> fmt::Pointer for Handle<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Pointer::fmt(&self.ptr.as_ptr().cast::<()>(), f)
    }
}
