use crate::{
    allocator::{MemoryAllocator, SectionDefinition},
    error::Error,
    generator::SyntaxTreeGenerator,
    replacer::DEFAULT_MAX_ROUNDS,
};
use rvarch::{Architecture, NodeFactoryCollection};
use serde::{Deserialize, Serialize};

fn default_max_rounds() -> usize {
    DEFAULT_MAX_ROUNDS
}

/// Everything a compilation needs besides the program itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransformationParameters {
    pub architecture: Architecture,
    /// Placed in this order.
    pub sections: Vec<SectionDefinition>,
    #[serde(default = "default_max_rounds")]
    pub max_replace_rounds: usize,
}

impl TransformationParameters {
    /// `data` aligned to the word size, then `text` aligned to 4.
    pub fn for_architecture(architecture: Architecture) -> Self {
        let word = architecture.word_size() / architecture.byte_size;
        let sections = vec![
            SectionDefinition::new("data", word, 1),
            SectionDefinition::new("text", 4, 1),
        ];
        Self {
            architecture,
            sections,
            max_replace_rounds: DEFAULT_MAX_ROUNDS,
        }
    }

    pub fn allocator(&self) -> Result<MemoryAllocator, Error> {
        MemoryAllocator::new(&self.sections)
    }

    pub fn generator(&self) -> SyntaxTreeGenerator {
        SyntaxTreeGenerator::new(NodeFactoryCollection::new(self.architecture.clone()))
    }

    pub fn to_json(&self) -> Result<String, Error> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self, Error> {
        let params: Self = serde_json::from_str(json)?;
        let arch = &params.architecture;
        if arch.byte_size == 0 || arch.word_size() % arch.byte_size != 0 {
            return Err(Error::Config(format!(
                "byte size {} does not divide word size {}",
                arch.byte_size,
                arch.word_size()
            )));
        }
        for section in &params.sections {
            section.validate()?;
        }
        Ok(params)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let p = TransformationParameters::for_architecture(Architecture::rv64im());
        assert_eq!(p.sections[0], SectionDefinition::new("data", 8, 1));
        assert_eq!(p.sections[1], SectionDefinition::new("text", 4, 1));
        assert_eq!(p.max_replace_rounds, 64);
        assert!(p.allocator().is_ok());
    }

    #[test]
    fn test_json() {
        let p = TransformationParameters::for_architecture(Architecture::rv32i());
        let json = p.to_json().unwrap();
        assert_eq!(TransformationParameters::from_json(&json).unwrap(), p);

        let bad = json.replace("\"data_alignment\": 1", "\"data_alignment\": 3");
        assert!(matches!(
            TransformationParameters::from_json(&bad),
            Err(Error::SectionAlignment(name, 4, 3)) if name == "data"
        ));
        assert!(TransformationParameters::from_json("{}").is_err());
    }
}
