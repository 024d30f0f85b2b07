use super::OperationBase;
use crate::{
    allocator::{MemoryAllocator, RelativeMemoryPosition, SectionTracker},
    error::CompileErrorList,
    expr,
    generator::SyntaxTreeGenerator,
    graph::SymbolGraph,
    position::{CodePositionInterval, PositionedString},
    replacer::SymbolReplacer,
    symbol::SymbolBehavior,
};
use rvarch::{BitValue, MemoryAccess};

fn place(
    position: CodePositionInterval,
    relative: &Option<RelativeMemoryPosition>,
    errors: &mut CompileErrorList,
    allocator: &MemoryAllocator,
) -> Option<usize> {
    let relative = relative.as_ref()?;
    match allocator.absolute_position(relative) {
        Ok(address) => Some(address),
        Err(err) => {
            errors.add_error(position, &err.to_string());
            None
        }
    }
}

fn allocate(
    position: CodePositionInterval,
    size: usize,
    errors: &mut CompileErrorList,
    allocator: &mut MemoryAllocator,
    tracker: &SectionTracker,
) -> Option<RelativeMemoryPosition> {
    match allocator.allocate_relative(&tracker.section, size) {
        Ok(relative) => Some(relative),
        Err(err) => {
            errors.add_error(position, &err.to_string());
            None
        }
    }
}

fn put(
    access: &mut dyn MemoryAccess,
    address: usize,
    value: &BitValue,
    position: CodePositionInterval,
    errors: &mut CompileErrorList,
) {
    if let Err(err) = access.put_memory_value_at(address, value) {
        errors.add_error(position, &err.to_string());
    }
}

// ----------------------------------------------------------------------------

/// `byte`/`half`/`word`/`dword`: initialised memory.
#[derive(Debug, Clone)]
pub struct MemoryDefinitionDirective {
    pub base: OperationBase,
    values: Vec<PositionedString>,
    /// Cells per value.
    cell_size: usize,
    relative: Option<RelativeMemoryPosition>,
    address: Option<usize>,
}

impl MemoryDefinitionDirective {
    pub fn new(base: OperationBase, values: &[PositionedString], cell_size: usize) -> Self {
        Self {
            base,
            values: values.to_vec(),
            cell_size,
            relative: None,
            address: None,
        }
    }

    pub fn cell_size(&self) -> usize {
        self.cell_size
    }

    pub fn address(&self) -> Option<usize> {
        self.address
    }

    pub fn allocate_memory(
        &mut self,
        errors: &mut CompileErrorList,
        allocator: &mut MemoryAllocator,
        tracker: &SectionTracker,
    ) {
        if tracker.section == "text" {
            errors.add_warning(
                self.base.position,
                "Careful, you are trying to define static memory in the text section where the \
                 program instructions are stored. This might cause unexpected behavior. Use a \
                 '.section data' directive in front of this to resolve the issue.",
            );
        }
        if self.values.is_empty() {
            errors.add_warning(self.base.position, "Empty data definition.");
        }

        let mut size = 0;
        for value in &self.values {
            let text = value.as_str().trim();
            if text.is_empty() {
                errors.add_error(value.position, "Argument is empty.");
            } else if expr::is_string_literal(text) {
                match expr::parse_string(text) {
                    Ok(chars) => size += (chars.len() + 1) * self.cell_size,
                    Err(err) => errors.add_error(value.position, &err.to_string()),
                }
            } else {
                size += self.cell_size;
            }
        }
        self.relative = allocate(self.base.position, size, errors, allocator, tracker);
    }

    pub fn enhance_symbol_table(
        &mut self,
        errors: &mut CompileErrorList,
        allocator: &MemoryAllocator,
        graph: &mut SymbolGraph,
    ) {
        self.address = place(self.base.position, &self.relative, errors, allocator);
        if let Some(address) = self.address {
            self.base.insert_labels(graph, address, SymbolBehavior::Static);
        }
    }

    /// Writes every value as little-endian cells.
    pub fn execute(
        &self,
        generator: &SyntaxTreeGenerator,
        replacer: &SymbolReplacer,
        errors: &mut CompileErrorList,
        access: &mut dyn MemoryAccess,
    ) {
        let Some(mut address) = self.address else {
            return;
        };
        let bits = self.cell_size * generator.factory().architecture().byte_size;

        for value in &self.values {
            let text = value.as_str().trim();
            if text.is_empty() {
                continue;
            }
            if expr::is_string_literal(text) {
                let Ok(chars) = expr::parse_string(text) else {
                    continue;
                };
                for c in chars.into_iter().chain([0]) {
                    put(access, address, &BitValue::from_u64(c as u64, bits), value.position, errors);
                    address += self.cell_size;
                }
                continue;
            }

            let result = replacer.replace(text).and_then(|text| expr::compile(&text));
            match result {
                Ok(v) => put(access, address, &BitValue::from_i64(v, bits), value.position, errors),
                Err(err) => errors.add_error(value.position, &err.to_string()),
            }
            address += self.cell_size;
        }
    }
}

// ----------------------------------------------------------------------------

/// `resb`/`resh`/`resw`/`resd`: zero-filled memory.
#[derive(Debug, Clone)]
pub struct MemoryReservationDirective {
    pub base: OperationBase,
    values: Vec<PositionedString>,
    cell_size: usize,
    size: usize,
    relative: Option<RelativeMemoryPosition>,
    address: Option<usize>,
}

impl MemoryReservationDirective {
    pub fn new(base: OperationBase, values: &[PositionedString], cell_size: usize) -> Self {
        Self {
            base,
            values: values.to_vec(),
            cell_size,
            size: 0,
            relative: None,
            address: None,
        }
    }

    /// Reserved cells, known after allocation.
    pub fn size(&self) -> usize {
        self.size
    }

    pub fn address(&self) -> Option<usize> {
        self.address
    }

    pub fn allocate_memory(
        &mut self,
        errors: &mut CompileErrorList,
        allocator: &mut MemoryAllocator,
        tracker: &SectionTracker,
    ) {
        if tracker.section == "text" {
            errors.add_warning(
                self.base.position,
                "Careful, you are trying to reserve memory in the text section where the program \
                 instructions are stored. This might cause unexpected behavior.",
            );
        }
        if self.values.is_empty() {
            errors.add_warning(
                self.base.position,
                "Implicit reservation of 0 bytes, missing arguments?",
            );
        }

        let mut count = 0;
        for value in &self.values {
            match expr::compile(value.as_str()) {
                Ok(n) if n <= 0 => errors.add_warning(value.position, "Reserving 0 bytes"),
                Ok(n) => {
                    count = usize::try_from(n).map_or(usize::MAX, |n| count.saturating_add(n));
                }
                Err(err) => errors.add_error(value.position, &err.to_string()),
            }
        }
        self.size = count.saturating_mul(self.cell_size);
        self.relative = allocate(self.base.position, self.size, errors, allocator, tracker);
    }

    pub fn enhance_symbol_table(
        &mut self,
        errors: &mut CompileErrorList,
        allocator: &MemoryAllocator,
        graph: &mut SymbolGraph,
    ) {
        self.address = place(self.base.position, &self.relative, errors, allocator);
        if let Some(address) = self.address {
            self.base.insert_labels(graph, address, SymbolBehavior::Static);
        }
    }

    pub fn execute(
        &self,
        generator: &SyntaxTreeGenerator,
        errors: &mut CompileErrorList,
        access: &mut dyn MemoryAccess,
    ) {
        let Some(address) = self.address else {
            return;
        };
        if self.size == 0 {
            return;
        }
        let bits = self.size * generator.factory().architecture().byte_size;
        put(access, address, &BitValue::new(bits), self.base.position, errors);
    }
}
