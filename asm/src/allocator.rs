use crate::error::Error;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::trace;

/// Offset inside a named section, before the sections are placed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelativeMemoryPosition {
    pub section: String,
    pub offset: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionDefinition {
    pub name: String,
    pub section_alignment: usize,
    pub data_alignment: usize,
}

impl SectionDefinition {
    pub fn new(name: &str, section_alignment: usize, data_alignment: usize) -> Self {
        Self {
            name: name.to_string(),
            section_alignment,
            data_alignment,
        }
    }

    pub fn validate(&self) -> Result<(), Error> {
        let Self {
            section_alignment: s,
            data_alignment: d,
            ..
        } = *self;
        if s == 0 || d == 0 || s % d != 0 {
            return Err(Error::SectionAlignment(self.name.clone(), s, d));
        }
        Ok(())
    }
}

/// Saturates at `usize::MAX`, which no memory can hold.
fn align(value: usize, alignment: usize) -> usize {
    value.div_ceil(alignment).saturating_mul(alignment)
}

#[derive(Debug, Clone)]
pub struct MemorySection {
    definition: SectionDefinition,
    current_size: usize,
    absolute_base: usize,
}

impl MemorySection {
    fn new(definition: SectionDefinition) -> Self {
        Self {
            definition,
            current_size: 0,
            absolute_base: 0,
        }
    }

    pub fn name(&self) -> &str {
        &self.definition.name
    }

    pub fn definition(&self) -> &SectionDefinition {
        &self.definition
    }

    /// Bump offset, not rounded to the data alignment.
    pub fn current_size(&self) -> usize {
        self.current_size
    }

    /// Size the section occupies once placed.
    pub fn aligned_size(&self) -> usize {
        align(self.current_size, self.definition.data_alignment)
    }

    pub fn absolute_base(&self) -> usize {
        self.absolute_base
    }

    pub fn allocate_relative(&mut self, size: usize) -> RelativeMemoryPosition {
        let offset = align(self.current_size, self.definition.data_alignment);
        self.current_size = offset.saturating_add(size);
        trace!(section = %self.definition.name, offset, size, "allocate");
        RelativeMemoryPosition {
            section: self.definition.name.clone(),
            offset,
        }
    }

}

/// Sections in definition order, bump-allocated then placed back to back.
#[derive(Debug, Clone)]
pub struct MemoryAllocator {
    sections: IndexMap<String, MemorySection>,
}

impl MemoryAllocator {
    pub fn new(definitions: &[SectionDefinition]) -> Result<Self, Error> {
        let mut sections = IndexMap::new();
        for definition in definitions {
            definition.validate()?;
            sections.insert(definition.name.clone(), MemorySection::new(definition.clone()));
        }
        Ok(Self { sections })
    }

    pub fn has_section(&self, name: &str) -> bool {
        self.sections.contains_key(name)
    }

    pub fn section(&self, name: &str) -> Result<&MemorySection, Error> {
        self.sections
            .get(name)
            .ok_or_else(|| Error::UnknownSection(name.to_string()))
    }

    pub fn section_mut(&mut self, name: &str) -> Result<&mut MemorySection, Error> {
        self.sections
            .get_mut(name)
            .ok_or_else(|| Error::UnknownSection(name.to_string()))
    }

    pub fn sections(&self) -> impl Iterator<Item = &MemorySection> {
        self.sections.values()
    }

    pub fn allocate_relative(
        &mut self,
        section: &str,
        size: usize,
    ) -> Result<RelativeMemoryPosition, Error> {
        Ok(self.section_mut(section)?.allocate_relative(size))
    }

    /// Total size if the sections were placed now. Sizes past the address
    /// space come out as `usize::MAX`.
    pub fn estimate_size(&self) -> usize {
        self.sections.values().fold(0, |position, section| {
            align(position, section.definition.section_alignment)
                .saturating_add(section.aligned_size())
        })
    }

    /// Fix every section's absolute base and return the total size.
    pub fn calculate_positions(&mut self) -> usize {
        let mut position = 0;
        for section in self.sections.values_mut() {
            section.absolute_base = align(position, section.definition.section_alignment);
            position = section.absolute_base.saturating_add(section.aligned_size());
        }
        position
    }

    pub fn absolute_position(&self, relative: &RelativeMemoryPosition) -> Result<usize, Error> {
        Ok(self
            .section(&relative.section)?
            .absolute_base
            .saturating_add(relative.offset))
    }
}

/// Section that new allocations go to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionTracker {
    pub section: String,
}

impl Default for SectionTracker {
    fn default() -> Self {
        Self {
            section: "text".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_data_alignment() {
        let mut alloc = MemoryAllocator::new(&[SectionDefinition::new("data", 8, 4)]).unwrap();
        let offsets: Vec<_> = (0..3)
            .map(|_| alloc.allocate_relative("data", 3).unwrap().offset)
            .collect();
        assert_eq!(offsets, vec![0, 4, 8]);
        assert_eq!(alloc.section("data").unwrap().current_size(), 11);
        assert_eq!(alloc.estimate_size(), 12);
        assert_eq!(alloc.calculate_positions(), 12);
    }

    #[test]
    fn test_positions() {
        let mut alloc = MemoryAllocator::new(&[
            SectionDefinition::new("data", 8, 1),
            SectionDefinition::new("text", 4, 1),
        ])
        .unwrap();
        let d = alloc.allocate_relative("data", 5).unwrap();
        let t0 = alloc.allocate_relative("text", 4).unwrap();
        let t1 = alloc.allocate_relative("text", 4).unwrap();
        assert_eq!(alloc.calculate_positions(), 16);
        assert_eq!(alloc.absolute_position(&d).unwrap(), 0);
        assert_eq!(alloc.absolute_position(&t0).unwrap(), 8);
        assert_eq!(alloc.absolute_position(&t1).unwrap(), 12);

        let ghost = RelativeMemoryPosition {
            section: "bss".to_string(),
            offset: 0,
        };
        assert!(matches!(
            alloc.absolute_position(&ghost),
            Err(Error::UnknownSection(name)) if name == "bss"
        ));
        assert!(alloc.allocate_relative("bss", 1).is_err());
    }

    #[test]
    fn test_saturation() {
        let mut alloc = MemoryAllocator::new(&[
            SectionDefinition::new("data", 8, 4),
            SectionDefinition::new("text", 4, 1),
        ])
        .unwrap();
        let half = usize::MAX / 2;
        alloc.allocate_relative("data", half).unwrap();
        let last = alloc.allocate_relative("data", half).unwrap();
        alloc.allocate_relative("data", half).unwrap();
        assert_eq!(alloc.section("data").unwrap().current_size(), usize::MAX);
        alloc.allocate_relative("text", 4).unwrap();
        assert_eq!(alloc.estimate_size(), usize::MAX);
        assert_eq!(alloc.calculate_positions(), usize::MAX);
        assert!(alloc.absolute_position(&last).unwrap() > half);
    }

    #[test]
    fn test_invalid_definition() {
        assert!(MemoryAllocator::new(&[SectionDefinition::new("data", 6, 4)]).is_err());
        assert!(MemoryAllocator::new(&[SectionDefinition::new("data", 4, 0)]).is_err());
    }
}
