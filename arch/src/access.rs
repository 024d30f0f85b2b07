use crate::{bits::BitValue, error::Error, isa::Architecture, reg::Reg};
use std::ops::Range;

/// Register and memory state an instruction reads and writes.
pub trait MemoryAccess {
    fn get_register_value(&self, name: &str) -> Result<BitValue, Error>;
    fn set_register_value(&mut self, name: &str, value: BitValue) -> Result<(), Error>;
    /// Little-endian read of `bytes` cells starting at `address`.
    fn get_memory_value_at(&self, address: usize, bytes: usize) -> Result<BitValue, Error>;
    fn put_memory_value_at(&mut self, address: usize, value: &BitValue) -> Result<(), Error>;
    /// Number of addressable cells.
    fn get_memory_size(&self) -> usize;
    fn is_memory_protected_at(&self, address: usize, bytes: usize) -> bool;
}

/// Flat little-endian memory with the integer register file and `pc`.
#[derive(Debug, Clone)]
pub struct Machine {
    xlen: usize,
    regs: [u64; 33],
    memory: Vec<u8>,
    protected: Vec<Range<usize>>,
}

impl Machine {
    pub fn new(arch: &Architecture, memory_size: usize) -> Self {
        Self {
            xlen: arch.word_size(),
            regs: [0; 33],
            memory: vec![0; memory_size],
            protected: vec![],
        }
    }

    pub fn protect(mut self, range: Range<usize>) -> Self {
        self.protected.push(range);
        self
    }

    pub fn reg(&self, reg: Reg) -> u64 {
        self.regs[u8::from(reg) as usize]
    }

    pub fn set_reg(&mut self, reg: Reg, value: u64) {
        if reg != Reg::X0 {
            let mask = if self.xlen >= 64 { u64::MAX } else { (1 << self.xlen) - 1 };
            self.regs[u8::from(reg) as usize] = value & mask;
        }
    }

    pub fn pc(&self) -> u64 {
        self.reg(Reg::PC)
    }

    pub fn memory(&self) -> &[u8] {
        &self.memory
    }

    /// Copies `data` into memory at `address`, ignoring protection.
    pub fn load(&mut self, address: usize, data: &[u8]) -> Result<(), Error> {
        let range = self.span(address, data.len())?;
        self.memory[range].copy_from_slice(data);
        Ok(())
    }

    fn span(&self, address: usize, bytes: usize) -> Result<Range<usize>, Error> {
        let size = self.memory.len();
        match address.checked_add(bytes) {
            Some(end) if end <= size => Ok(address..end),
            _ => Err(Error::OutOfBounds(address, address.saturating_add(bytes), size)),
        }
    }

    fn lookup(name: &str) -> Result<Reg, Error> {
        Reg::parse(name).map_err(|_| Error::UnknownRegister(name.to_string()))
    }
}

impl MemoryAccess for Machine {
    fn get_register_value(&self, name: &str) -> Result<BitValue, Error> {
        let reg = Self::lookup(name)?;
        Ok(BitValue::from_u64(self.reg(reg), self.xlen))
    }

    fn set_register_value(&mut self, name: &str, value: BitValue) -> Result<(), Error> {
        let reg = Self::lookup(name)?;
        self.set_reg(reg, value.resize(self.xlen, false).to_u64());
        Ok(())
    }

    fn get_memory_value_at(&self, address: usize, bytes: usize) -> Result<BitValue, Error> {
        let range = self.span(address, bytes)?;
        Ok(BitValue::from_bytes_le(&self.memory[range]))
    }

    fn put_memory_value_at(&mut self, address: usize, value: &BitValue) -> Result<(), Error> {
        let bytes = value.bytes_le();
        self.load(address, bytes)
    }

    fn get_memory_size(&self) -> usize {
        self.memory.len()
    }

    fn is_memory_protected_at(&self, address: usize, bytes: usize) -> bool {
        let end = address.saturating_add(bytes);
        self.protected
            .iter()
            .any(|r| address < r.end && r.start < end)
    }
}
