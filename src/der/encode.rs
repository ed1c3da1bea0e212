//! Encoding DER data.
//!
//! Encoding happens in two steps. First, a value describing the complete
//! encoding is assembled from the building blocks in this module. Nothing
//! is encoded at this point, the value merely refers to the data. Second,
//! this value is asked for its length and then written to a buffer. Since
//! the length of every value is known before any of it is written, this
//! produces DER’s definite length form without copying data around.
//!
//! The building blocks are the [`Values`] trait for anything that
//! produces zero or more encoded values, [`PrimitiveContent`] for types
//! that form the content of a primitive value, and the [`sequence`],
//! [`set`], and [`sequence_as`] functions for constructed values. Tuples,
//! options, slices, and vecs of `Values` are `Values` as well.

use bytes::Bytes;
use super::captured::Captured;
use super::error::EncodeError;
use super::length;
use super::tag::Tag;


//------------ encode --------------------------------------------------------

/// Encodes a single value with the given tag and content.
pub fn encode(tag: Tag, content: &[u8]) -> Result<Vec<u8>, EncodeError> {
    let mut res = Vec::with_capacity(total_encoded_len(content.len()));
    res.push(tag.to_octet());
    length::write(content.len(), &mut res)?;
    res.extend_from_slice(content);
    Ok(res)
}

/// Returns the length of a complete value with the given content length.
pub fn total_encoded_len(content_len: usize) -> usize {
    1 + length::encoded_len(content_len) + content_len
}


//------------ Values --------------------------------------------------------

/// A type that can be encoded as a sequence of DER values.
pub trait Values {
    /// Returns the length of the encoded values.
    fn encoded_len(&self) -> usize;

    /// Appends the encoded values to `target`.
    fn write_encoded(&self, target: &mut Vec<u8>) -> Result<(), EncodeError>;

    /// Returns the encoded values in a new vec.
    fn to_vec(&self) -> Result<Vec<u8>, EncodeError> {
        let mut res = Vec::with_capacity(self.encoded_len());
        self.write_encoded(&mut res)?;
        Ok(res)
    }

    /// Returns the encoded values as a `Bytes` value.
    fn to_bytes(&self) -> Result<Bytes, EncodeError> {
        self.to_vec().map(Into::into)
    }

    /// Returns the encoded values as a captured value.
    fn to_captured(&self) -> Result<Captured, EncodeError> {
        self.to_bytes().map(Captured::from_der)
    }
}

impl<'a, T: Values + ?Sized> Values for &'a T {
    fn encoded_len(&self) -> usize {
        (*self).encoded_len()
    }

    fn write_encoded(&self, target: &mut Vec<u8>) -> Result<(), EncodeError> {
        (*self).write_encoded(target)
    }
}

impl<T: Values> Values for Option<T> {
    fn encoded_len(&self) -> usize {
        match self {
            Some(inner) => inner.encoded_len(),
            None => 0
        }
    }

    fn write_encoded(&self, target: &mut Vec<u8>) -> Result<(), EncodeError> {
        match self {
            Some(inner) => inner.write_encoded(target),
            None => Ok(())
        }
    }
}

impl<T: Values> Values for [T] {
    fn encoded_len(&self) -> usize {
        self.iter().map(Values::encoded_len).sum()
    }

    fn write_encoded(&self, target: &mut Vec<u8>) -> Result<(), EncodeError> {
        for item in self {
            item.write_encoded(target)?;
        }
        Ok(())
    }
}

impl<T: Values> Values for Vec<T> {
    fn encoded_len(&self) -> usize {
        self.as_slice().encoded_len()
    }

    fn write_encoded(&self, target: &mut Vec<u8>) -> Result<(), EncodeError> {
        self.as_slice().write_encoded(target)
    }
}

macro_rules! tuple_values {
    ( $( $ty:ident: $idx:tt ),* ) => {
        impl< $( $ty: Values ),* > Values for ( $( $ty, )* ) {
            fn encoded_len(&self) -> usize {
                0 $( + self.$idx.encoded_len() )*
            }

            fn write_encoded(
                &self, target: &mut Vec<u8>
            ) -> Result<(), EncodeError> {
                $( self.$idx.write_encoded(target)?; )*
                Ok(())
            }
        }
    }
}

tuple_values!(T0: 0);
tuple_values!(T0: 0, T1: 1);
tuple_values!(T0: 0, T1: 1, T2: 2);
tuple_values!(T0: 0, T1: 1, T2: 2, T3: 3);
tuple_values!(T0: 0, T1: 1, T2: 2, T3: 3, T4: 4);
tuple_values!(T0: 0, T1: 1, T2: 2, T3: 3, T4: 4, T5: 5);
tuple_values!(T0: 0, T1: 1, T2: 2, T3: 3, T4: 4, T5: 5, T6: 6);
tuple_values!(T0: 0, T1: 1, T2: 2, T3: 3, T4: 4, T5: 5, T6: 6, T7: 7);
tuple_values!(
    T0: 0, T1: 1, T2: 2, T3: 3, T4: 4, T5: 5, T6: 6, T7: 7, T8: 8
);
tuple_values!(
    T0: 0, T1: 1, T2: 2, T3: 3, T4: 4, T5: 5, T6: 6, T7: 7, T8: 8, T9: 9
);


//------------ Choice2 -------------------------------------------------------

/// One of two possible values.
#[derive(Clone, Debug)]
pub enum Choice2<L, R> {
    One(L),
    Two(R),
}

impl<L: Values, R: Values> Values for Choice2<L, R> {
    fn encoded_len(&self) -> usize {
        match self {
            Choice2::One(inner) => inner.encoded_len(),
            Choice2::Two(inner) => inner.encoded_len(),
        }
    }

    fn write_encoded(&self, target: &mut Vec<u8>) -> Result<(), EncodeError> {
        match self {
            Choice2::One(inner) => inner.write_encoded(target),
            Choice2::Two(inner) => inner.write_encoded(target),
        }
    }
}


//------------ PrimitiveContent ----------------------------------------------

/// A type that is the content of a primitive value.
pub trait PrimitiveContent: Sized {
    /// The natural tag of the type.
    const TAG: Tag;

    /// Returns the length of the content octets.
    fn encoded_len(&self) -> usize;

    /// Appends the content octets to `target`.
    fn write_encoded(&self, target: &mut Vec<u8>);

    /// Returns a value encoder using the natural tag.
    fn encode(self) -> Primitive<Self> {
        self.encode_as(Self::TAG)
    }

    /// Returns a value encoder using the given tag.
    fn encode_as(self, tag: Tag) -> Primitive<Self> {
        Primitive { tag, prim: self }
    }

    /// Returns a value encoder for a reference using the natural tag.
    fn encode_ref(&self) -> Primitive<&Self> {
        self.encode_ref_as(Self::TAG)
    }

    /// Returns a value encoder for a reference using the given tag.
    fn encode_ref_as(&self, tag: Tag) -> Primitive<&Self> {
        Primitive { tag, prim: self }
    }
}

impl<'a, T: PrimitiveContent> PrimitiveContent for &'a T {
    const TAG: Tag = T::TAG;

    fn encoded_len(&self) -> usize {
        (*self).encoded_len()
    }

    fn write_encoded(&self, target: &mut Vec<u8>) {
        (*self).write_encoded(target)
    }
}

impl PrimitiveContent for bool {
    const TAG: Tag = Tag::BOOLEAN;

    fn encoded_len(&self) -> usize {
        1
    }

    fn write_encoded(&self, target: &mut Vec<u8>) {
        target.push(if *self { 0xFF } else { 0x00 })
    }
}

impl PrimitiveContent for () {
    const TAG: Tag = Tag::NULL;

    fn encoded_len(&self) -> usize {
        0
    }

    fn write_encoded(&self, _target: &mut Vec<u8>) { }
}

impl PrimitiveContent for u64 {
    const TAG: Tag = Tag::INTEGER;

    fn encoded_len(&self) -> usize {
        let bits = 64 - self.leading_zeros() as usize;
        // One extra bit for the sign, at least one octet.
        (bits / 8 + 1).min(9)
    }

    fn write_encoded(&self, target: &mut Vec<u8>) {
        let octets = self.to_be_bytes();
        let len = PrimitiveContent::encoded_len(self);
        if len == 9 {
            target.push(0);
            target.extend_from_slice(&octets);
        }
        else {
            target.extend_from_slice(&octets[8 - len..]);
        }
    }
}

impl PrimitiveContent for u8 {
    const TAG: Tag = Tag::INTEGER;

    fn encoded_len(&self) -> usize {
        PrimitiveContent::encoded_len(&u64::from(*self))
    }

    fn write_encoded(&self, target: &mut Vec<u8>) {
        PrimitiveContent::write_encoded(&u64::from(*self), target)
    }
}

impl PrimitiveContent for Bytes {
    const TAG: Tag = Tag::OCTET_STRING;

    fn encoded_len(&self) -> usize {
        self.len()
    }

    fn write_encoded(&self, target: &mut Vec<u8>) {
        target.extend_from_slice(self.as_ref())
    }
}


//------------ Primitive -----------------------------------------------------

/// A value encoder for primitive content.
#[derive(Clone, Debug)]
pub struct Primitive<P> {
    tag: Tag,
    prim: P,
}

impl<P: PrimitiveContent> Values for Primitive<P> {
    fn encoded_len(&self) -> usize {
        total_encoded_len(self.prim.encoded_len())
    }

    fn write_encoded(&self, target: &mut Vec<u8>) -> Result<(), EncodeError> {
        target.push(self.tag.to_octet());
        length::write(self.prim.encoded_len(), target)?;
        self.prim.write_encoded(target);
        Ok(())
    }
}


//------------ Constructed ---------------------------------------------------

/// A value encoder for a constructed value.
#[derive(Clone, Debug)]
pub struct Constructed<V> {
    tag: Tag,
    inner: V,
}

impl<V: Values> Constructed<V> {
    pub fn new(tag: Tag, inner: V) -> Self {
        Constructed { tag, inner }
    }
}

impl<V: Values> Values for Constructed<V> {
    fn encoded_len(&self) -> usize {
        total_encoded_len(self.inner.encoded_len())
    }

    fn write_encoded(&self, target: &mut Vec<u8>) -> Result<(), EncodeError> {
        target.push(self.tag.to_octet());
        length::write(self.inner.encoded_len(), target)?;
        self.inner.write_encoded(target)
    }
}

/// Returns an encoder for a SEQUENCE containing `inner`.
pub fn sequence<V: Values>(inner: V) -> Constructed<V> {
    Constructed::new(Tag::SEQUENCE, inner)
}

/// Returns an encoder for a SET containing `inner`.
///
/// The values are encoded in the order given. DER requires the elements
/// of a SET OF to be sorted by their encoding, which is up to the caller.
pub fn set<V: Values>(inner: V) -> Constructed<V> {
    Constructed::new(Tag::SET, inner)
}

/// Returns an encoder for a constructed value with the given tag.
pub fn sequence_as<V: Values>(tag: Tag, inner: V) -> Constructed<V> {
    Constructed::new(tag, inner)
}


//============ Tests =========================================================
