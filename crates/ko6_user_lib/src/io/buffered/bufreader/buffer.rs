use crate::alloc_crate::vec::Vec;
use crate::{error::Error, io::Read};

pub struct Buffer {
    buf: Vec<u8>,
    pos: usize,
    filled: usize,
}

impl Buffer {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buf: crate::alloc_crate::vec![0; capacity],
            pos: 0,
            filled: 0,
        }
    }

    pub fn capacity(&self) -> usize {
        self.buf.len()
    }

    pub fn pos(&self) -> usize {
        self.pos
    }

    pub fn filled(&self) -> usize {
        self.filled
    }

    pub fn discard_buffer(&mut self) {
        self.pos = 0;
        self.filled = 0;
    }

    pub fn consume(&mut self, amt: usize) {
        self.pos = (self.pos + amt).min(self.filled);
    }

    pub fn fill_buf(&mut self, reader: &mut impl Read) -> Result<&[u8], Error> {
        if self.pos >= self.filled {
            self.filled = reader.read(&mut self.buf)?;
            self.pos = 0;
        }
        Ok(&self.buf[self.pos..self.filled])
    }
}
