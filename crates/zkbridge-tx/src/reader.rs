use crate::TxParseError;

/// A variable-length integer as used in the transaction wire format.
///
/// Values below `0xFD` take one byte; larger values are prefixed by `0xFD`, `0xFE` or
/// `0xFF` followed by 2, 4 or 8 little-endian bytes. Only the shortest encoding is
/// accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompactSize(pub u64);

impl CompactSize {
    /// Number of bytes of the minimal encoding.
    #[must_use]
    pub const fn encoded_len(self) -> usize {
        match self.0 {
            0..=0xFC => 1,
            0xFD..=0xFFFF => 3,
            0x1_0000..=0xFFFF_FFFF => 5,
            _ => 9,
        }
    }

    /// The value as a length or count on this platform.
    fn to_usize(self, offset: usize) -> Result<usize, TxParseError> {
        usize::try_from(self.0).map_err(|_| TxParseError::malformed(offset, "length overflows"))
    }
}

/// Cursor over a raw transaction buffer.
pub(crate) struct Reader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    pub(crate) const fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    pub(crate) const fn position(&self) -> usize {
        self.pos
    }

    pub(crate) const fn is_exhausted(&self) -> bool {
        self.pos >= self.data.len()
    }

    /// The bytes in `start..end` of the underlying buffer.
    pub(crate) fn slice(&self, start: usize, end: usize) -> Result<&'a [u8], TxParseError> {
        self.data
            .get(start..end)
            .ok_or(TxParseError::malformed(start, "range out of bounds"))
    }

    pub(crate) fn peek(&self, n: usize) -> Option<&'a [u8]> {
        self.data.get(self.pos..self.pos.checked_add(n)?)
    }

    pub(crate) fn take(&mut self, n: usize) -> Result<&'a [u8], TxParseError> {
        let end = self
            .pos
            .checked_add(n)
            .ok_or(TxParseError::malformed(self.pos, "length overflows"))?;
        let bytes = self
            .data
            .get(self.pos..end)
            .ok_or(TxParseError::malformed(self.pos, "unexpected end of data"))?;
        self.pos = end;
        Ok(bytes)
    }

    pub(crate) fn skip(&mut self, n: usize) -> Result<(), TxParseError> {
        self.take(n).map(|_| ())
    }

    pub(crate) fn array<const N: usize>(&mut self) -> Result<[u8; N], TxParseError> {
        let start = self.pos;
        self.take(N)?
            .try_into()
            .map_err(|_| TxParseError::malformed(start, "unexpected end of data"))
    }

    pub(crate) fn u8(&mut self) -> Result<u8, TxParseError> {
        let [byte] = self.array::<1>()?;
        Ok(byte)
    }

    pub(crate) fn u64_le(&mut self) -> Result<u64, TxParseError> {
        Ok(u64::from_le_bytes(self.array()?))
    }

    pub(crate) fn compact_size(&mut self) -> Result<CompactSize, TxParseError> {
        let start = self.pos;
        let value = match self.u8()? {
            0xFD => u64::from(u16::from_le_bytes(self.array()?)),
            0xFE => u64::from(u32::from_le_bytes(self.array()?)),
            0xFF => u64::from_le_bytes(self.array()?),
            small => u64::from(small),
        };
        let size = CompactSize(value);
        let used = self.pos.saturating_sub(start);
        if size.encoded_len() != used {
            return Err(TxParseError::malformed(start, "non-canonical CompactSize"));
        }
        Ok(size)
    }

    /// Read a CompactSize used as a count or byte length.
    pub(crate) fn compact_len(&mut self) -> Result<usize, TxParseError> {
        let start = self.pos;
        self.compact_size()?.to_usize(start)
    }
}
