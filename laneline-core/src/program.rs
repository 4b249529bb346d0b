use serde::{Deserialize, Serialize};

/// The three fixed age-banded lesson tracks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Program {
    Droplet,
    Splashlet,
    Strokelet,
}

impl Program {
    pub const ALL: [Program; 3] = [Program::Droplet, Program::Splashlet, Program::Strokelet];

    pub fn as_str(&self) -> &'static str {
        match self {
            Program::Droplet => "Droplet",
            Program::Splashlet => "Splashlet",
            Program::Strokelet => "Strokelet",
        }
    }

    pub fn parse(s: &str) -> Option<Program> {
        match s {
            "Droplet" => Some(Program::Droplet),
            "Splashlet" => Some(Program::Splashlet),
            "Strokelet" => Some(Program::Strokelet),
            _ => None,
        }
    }

    /// Three-letter prefix used in package codes (DRO-4L-...).
    pub fn code_prefix(&self) -> &'static str {
        match self {
            Program::Droplet => "DRO",
            Program::Splashlet => "SPL",
            Program::Strokelet => "STR",
        }
    }

    pub fn age_band(&self) -> &'static str {
        match self {
            Program::Droplet => "6 months - 2 years",
            Program::Splashlet => "3 - 5 years",
            Program::Strokelet => "6 - 12 years",
        }
    }
}

impl std::fmt::Display for Program {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_round_trips() {
        for program in Program::ALL {
            assert_eq!(Program::parse(program.as_str()), Some(program));
        }
        assert_eq!(Program::parse("droplet"), None);
        assert_eq!(Program::parse(""), None);
    }

    #[test]
    fn code_prefixes_are_distinct() {
        assert_eq!(Program::Droplet.code_prefix(), "DRO");
        assert_eq!(Program::Splashlet.code_prefix(), "SPL");
        assert_eq!(Program::Strokelet.code_prefix(), "STR");
    }
}
