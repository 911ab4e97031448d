//! Little-endian field access for packet payloads.
use crate::framing::Frame;
use crate::packets::DecodeError;
use crate::Result;

/// Sequential reader over a payload. Every read is bounds checked so variable length
/// layouts can be walked without slicing by hand.
pub(crate) struct Reader<'a> {
    id: u8,
    dat: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    pub fn new(id: u8, dat: &'a [u8]) -> Self {
        Reader { id, dat, pos: 0 }
    }

    pub fn remaining(&self) -> usize {
        self.dat.len() - self.pos
    }

    /// Fails unless at least `n` more bytes can be read.
    pub fn require(&self, n: usize) -> std::result::Result<(), DecodeError> {
        if self.remaining() < n {
            return Err(DecodeError::Truncated {
                id: self.id,
                needed: self.pos + n,
                actual: self.dat.len(),
            });
        }
        Ok(())
    }

    pub fn take(&mut self, n: usize) -> std::result::Result<&'a [u8], DecodeError> {
        self.require(n)?;
        let dat = &self.dat[self.pos..self.pos + n];
        self.pos += n;
        Ok(dat)
    }

    fn array<const N: usize>(&mut self) -> std::result::Result<[u8; N], DecodeError> {
        let mut buf = [0u8; N];
        buf.copy_from_slice(self.take(N)?);
        Ok(buf)
    }

    pub fn u8(&mut self) -> std::result::Result<u8, DecodeError> {
        Ok(self.array::<1>()?[0])
    }

    pub fn bool(&mut self) -> std::result::Result<bool, DecodeError> {
        Ok(self.u8()? != 0)
    }

    pub fn u16(&mut self) -> std::result::Result<u16, DecodeError> {
        Ok(u16::from_le_bytes(self.array()?))
    }

    pub fn u32(&mut self) -> std::result::Result<u32, DecodeError> {
        Ok(u32::from_le_bytes(self.array()?))
    }

    pub fn i32(&mut self) -> std::result::Result<i32, DecodeError> {
        Ok(i32::from_le_bytes(self.array()?))
    }

    pub fn f32(&mut self) -> std::result::Result<f32, DecodeError> {
        Ok(f32::from_le_bytes(self.array()?))
    }

    pub fn f64(&mut self) -> std::result::Result<f64, DecodeError> {
        Ok(f64::from_le_bytes(self.array()?))
    }

    pub fn vec3(&mut self) -> std::result::Result<[f32; 3], DecodeError> {
        Ok([self.f32()?, self.f32()?, self.f32()?])
    }

    pub fn mat3(&mut self) -> std::result::Result<[[f32; 3]; 3], DecodeError> {
        Ok([self.vec3()?, self.vec3()?, self.vec3()?])
    }

    /// Everything not yet read.
    pub fn rest(&mut self) -> &'a [u8] {
        let dat = &self.dat[self.pos..];
        self.pos = self.dat.len();
        dat
    }
}

/// Payload builder, the mirror image of [Reader].
#[derive(Default)]
pub(crate) struct Writer {
    buf: Vec<u8>,
}

impl Writer {
    pub fn with_capacity(n: usize) -> Self {
        Writer {
            buf: Vec::with_capacity(n),
        }
    }

    pub fn u8(&mut self, v: u8) -> &mut Self {
        self.buf.push(v);
        self
    }

    pub fn bool(&mut self, v: bool) -> &mut Self {
        self.u8(u8::from(v))
    }

    pub fn u16(&mut self, v: u16) -> &mut Self {
        self.bytes(&v.to_le_bytes())
    }

    pub fn u32(&mut self, v: u32) -> &mut Self {
        self.bytes(&v.to_le_bytes())
    }

    pub fn f32(&mut self, v: f32) -> &mut Self {
        self.bytes(&v.to_le_bytes())
    }

    pub fn vec3(&mut self, v: &[f32; 3]) -> &mut Self {
        for x in v {
            self.f32(*x);
        }
        self
    }

    pub fn mat3(&mut self, m: &[[f32; 3]; 3]) -> &mut Self {
        for row in m {
            self.vec3(row);
        }
        self
    }

    /// Reserved bytes, always zero.
    pub fn zeros(&mut self, n: usize) -> &mut Self {
        self.buf.resize(self.buf.len() + n, 0);
        self
    }

    pub fn bytes(&mut self, dat: &[u8]) -> &mut Self {
        self.buf.extend_from_slice(dat);
        self
    }

    pub fn into_frame(self, id: u8) -> Result<Frame> {
        Frame::new(id, self.buf)
    }
}
