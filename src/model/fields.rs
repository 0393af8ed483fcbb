use serde::{Deserialize, Serialize};

/// Section whose field list a condition can pick from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Section {
    Section1,
    Section2,
    Section3,
}

impl std::fmt::Display for Section {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Section::Section1 => write!(f, "Section1"),
            Section::Section2 => write!(f, "Section2"),
            Section::Section3 => write!(f, "Section3"),
        }
    }
}

impl std::str::FromStr for Section {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "section1" => Ok(Section::Section1),
            "section2" => Ok(Section::Section2),
            "section3" => Ok(Section::Section3),
            _ => Err(format!("Unknown section: {}", s)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum CaseType {
    A,
    B,
    C,
}

impl std::fmt::Display for CaseType {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            CaseType::A => write!(f, "A"),
            CaseType::B => write!(f, "B"),
            CaseType::C => write!(f, "C"),
        }
    }
}

impl std::str::FromStr for CaseType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "A" => Ok(CaseType::A),
            "B" => Ok(CaseType::B),
            "C" => Ok(CaseType::C),
            _ => Err(format!("Unknown case type: {}", s)),
        }
    }
}

/// Cache key of a field list, displayed as `Section1_A`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FieldKey {
    pub section: Section,
    pub case_type: CaseType,
}

impl FieldKey {
    pub fn new(section: Section, case_type: CaseType) -> Self {
        Self { section, case_type }
    }
}

impl std::fmt::Display for FieldKey {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}_{}", self.section, self.case_type)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_key_display() {
        let key = FieldKey::new(Section::Section2, CaseType::C);
        assert_eq!(key.to_string(), "Section2_C");
    }

    #[test]
    fn test_parse_section_and_case() {
        assert_eq!("Section3".parse::<Section>(), Ok(Section::Section3));
        assert_eq!("b".parse::<CaseType>(), Ok(CaseType::B));
        assert!("Section4".parse::<Section>().is_err());
    }
}
