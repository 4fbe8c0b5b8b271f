//! Scatter-payload facilities.
//!
//! A [`Bytes`] value is a payload made of potentially many discontiguous
//! byte chunks that are meant to be transmitted in a *single* gather-write,
//! without first copying them into one contiguous allocation. The traits
//! here let [`Channel::write_bytes`] build the segment vector for `writev`
//! directly from structured data such as tuples of headers and bodies.
//!
//! [`Channel::write_bytes`]: crate::Channel::write_bytes

/// A trait that represents a collection of bytes.
pub trait Bytes {
    /// Return the total amount of bytes contained in this payload.
    fn size(&self) -> usize;

    /// Return the number of byte chunks.
    fn count(&self) -> usize;

    /// Fill `dst` with the chunks in this payload, in transmission order.
    ///
    /// The implementation must call [`FillBytes::put`] exactly
    /// [`count`](Bytes::count) times.
    fn fill_bytes<'a>(&'a self, dst: &mut dyn FillBytes<'a>);
}

/// The container of scattered bytes.
pub trait FillBytes<'a> {
    /// Put a chunk of bytes into this container.
    fn put(&mut self, chunk: &'a [u8]);
}

impl FillBytes<'_> for Vec<u8> {
    fn put(&mut self, chunk: &'_ [u8]) {
        self.extend_from_slice(chunk);
    }
}

// ==== pointer types ====

macro_rules! impl_bytes_for_pointers {
    () => {
        #[inline]
        fn size(&self) -> usize {
            (**self).size()
        }

        #[inline]
        fn count(&self) -> usize {
            (**self).count()
        }

        #[inline]
        fn fill_bytes<'a>(&'a self, dst: &mut dyn FillBytes<'a>) {
            (**self).fill_bytes(dst)
        }
    };
}

impl<R: ?Sized> Bytes for &R
where
    R: Bytes,
{
    impl_bytes_for_pointers!();
}

impl<R: ?Sized> Bytes for &mut R
where
    R: Bytes,
{
    impl_bytes_for_pointers!();
}

impl<R: ?Sized> Bytes for Box<R>
where
    R: Bytes,
{
    impl_bytes_for_pointers!();
}

impl<R: ?Sized> Bytes for std::rc::Rc<R>
where
    R: Bytes,
{
    impl_bytes_for_pointers!();
}

impl<R: ?Sized> Bytes for std::sync::Arc<R>
where
    R: Bytes,
{
    impl_bytes_for_pointers!();
}

// ==== empty payload ====

impl Bytes for () {
    #[inline]
    fn size(&self) -> usize {
        0
    }

    #[inline]
    fn count(&self) -> usize {
        0
    }

    #[inline]
    fn fill_bytes<'a>(&'a self, _: &mut dyn FillBytes<'a>) {}
}

// ==== compound types ====

macro_rules! impl_bytes_for_tuple {
    ($($T:ident),+ $(,)?) => {
        impl<$($T),+> Bytes for ($($T,)+)
        where
            $( $T: Bytes, )+
        {
            #[allow(nonstandard_style)]
            #[inline]
            fn size(&self) -> usize {
                let ($($T,)+) = self;
                let mut size = 0;
                $(
                    size += $T.size();
                )+
                size
            }

            #[allow(nonstandard_style)]
            #[inline]
            fn count(&self) -> usize {
                let ($($T,)+) = self;
                let mut count = 0;
                $(
                    count += $T.count();
                )+
                count
            }

            #[allow(nonstandard_style)]
            #[inline]
            fn fill_bytes<'a>(&'a self, dst: &mut dyn FillBytes<'a>) {
                let ($($T,)+) = self;
                $(
                    $T.fill_bytes(dst);
                )+
            }
        }
    }
}

impl_bytes_for_tuple!(T1);
impl_bytes_for_tuple!(T1, T2);
impl_bytes_for_tuple!(T1, T2, T3);
impl_bytes_for_tuple!(T1, T2, T3, T4);
impl_bytes_for_tuple!(T1, T2, T3, T4, T5);

impl<R> Bytes for [R]
where
    R: Bytes,
{
    #[inline]
    fn size(&self) -> usize {
        self.iter().map(|t| t.size()).sum()
    }

    #[inline]
    fn count(&self) -> usize {
        self.iter().map(|t| t.count()).sum()
    }

    #[inline]
    fn fill_bytes<'a>(&'a self, dst: &mut dyn FillBytes<'a>) {
        for t in self {
            t.fill_bytes(dst);
        }
    }
}

impl<R> Bytes for Vec<R>
where
    R: Bytes,
{
    #[inline]
    fn size(&self) -> usize {
        self.as_slice().size()
    }

    #[inline]
    fn count(&self) -> usize {
        self.as_slice().count()
    }

    #[inline]
    fn fill_bytes<'a>(&'a self, dst: &mut dyn FillBytes<'a>) {
        self.as_slice().fill_bytes(dst)
    }
}

// ==== Option<T> ====

impl<T> Bytes for Option<T>
where
    T: Bytes,
{
    #[inline]
    fn size(&self) -> usize {
        self.as_ref().map_or(0, |b| b.size())
    }

    #[inline]
    fn count(&self) -> usize {
        self.as_ref().map_or(0, |b| b.count())
    }

    #[inline]
    fn fill_bytes<'a>(&'a self, dst: &mut dyn FillBytes<'a>) {
        if let Some(ref bytes) = self {
            bytes.fill_bytes(dst);
        }
    }
}

// ==== continuous bytes ====

mod impl_bytes_for_cont {
    use super::*;

    #[inline(always)]
    fn as_bytes(t: &(impl AsRef<[u8]> + ?Sized)) -> &[u8] {
        t.as_ref()
    }

    macro_rules! impl_bytes {
        ($($t:ty),*$(,)?) => {$(
            impl Bytes for $t {
                #[inline]
                fn size(&self) -> usize {
                    as_bytes(self).len()
                }

                #[inline]
                fn count(&self) -> usize {
                    usize::from(!as_bytes(self).is_empty())
                }

                #[inline]
                fn fill_bytes<'a>(&'a self, dst: &mut dyn FillBytes<'a>) {
                    let this = as_bytes(self);
                    if !this.is_empty() {
                        dst.put(this);
                    }
                }
            }
        )*};
    }

    impl_bytes! {
        [u8],
        str,
        String,
        Vec<u8>,
        std::borrow::Cow<'_, [u8]>,
    }
}

impl<const N: usize> Bytes for [u8; N] {
    #[inline]
    fn size(&self) -> usize {
        self.as_slice().size()
    }

    #[inline]
    fn count(&self) -> usize {
        self.as_slice().count()
    }

    #[inline]
    fn fill_bytes<'a>(&'a self, dst: &mut dyn FillBytes<'a>) {
        self.as_slice().fill_bytes(dst)
    }
}

impl Bytes for std::ffi::OsStr {
    #[inline]
    fn size(&self) -> usize {
        use std::os::unix::prelude::*;
        self.as_bytes().len()
    }

    #[inline]
    fn count(&self) -> usize {
        use std::os::unix::prelude::*;
        usize::from(!self.as_bytes().is_empty())
    }

    #[inline]
    fn fill_bytes<'a>(&'a self, dst: &mut dyn FillBytes<'a>) {
        use std::os::unix::prelude::*;
        self.as_bytes().fill_bytes(dst)
    }
}

impl Bytes for std::ffi::OsString {
    #[inline]
    fn size(&self) -> usize {
        (**self).size()
    }

    #[inline]
    fn count(&self) -> usize {
        (**self).count()
    }

    #[inline]
    fn fill_bytes<'a>(&'a self, dst: &mut dyn FillBytes<'a>) {
        (**self).fill_bytes(dst)
    }
}
