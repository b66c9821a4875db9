//! Strongly-typed identifiers and human-readable reference labels.

use std::fmt;
use uuid::Uuid;

macro_rules! db_id {
    ($name:ident, $doc:literal) => {
        #[doc = $doc]
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize)]
        pub struct $name(pub u64);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<u64> for $name {
            fn from(v: u64) -> Self {
                Self(v)
            }
        }
    };
}

db_id!(ProgramId, "Identifies a science program.");
db_id!(ObservationId, "Identifies an observation within a program.");
db_id!(TargetId, "Identifies a target in the target environment.");
db_id!(VisitId, "Identifies a single observatory occupancy of an observation.");
db_id!(DatasetId, "Identifies a dataset produced by executing one step.");

macro_rules! uuid_id {
    ($name:ident, $doc:literal) => {
        #[doc = $doc]
        #[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize)]
        pub struct $name(pub Uuid);

        impl $name {
            /// Mint a fresh, globally unique identifier.
            ///
            /// Called once per generated atom/step; regenerating a sequence
            /// always produces new identifiers (§4.4 "Identifier policy").
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), self.0)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

uuid_id!(AtomId, "Identifies a generated atom. Minted fresh on every generation.");
uuid_id!(StepId, "Identifies a generated step. Minted fresh on every generation.");

/// The two halves of an observing semester.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum SemesterHalf {
    /// February through July.
    A,
    /// August through January.
    B,
}

impl SemesterHalf {
    fn as_char(self) -> char {
        match self {
            Self::A => 'A',
            Self::B => 'B',
        }
    }

    fn from_char(c: char) -> Option<Self> {
        match c {
            'A' => Some(Self::A),
            'B' => Some(Self::B),
            _ => None,
        }
    }
}

/// Failure parsing a reference label (§6 "Reference formats").
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReferenceParseError {
    /// The malformed input.
    pub input: String,
    /// Human-readable explanation.
    pub reason: String,
}

impl fmt::Display for ReferenceParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid reference label {:?}: {}", self.input, self.reason)
    }
}

impl std::error::Error for ReferenceParseError {}

fn parse_err(input: &str, reason: impl Into<String>) -> ReferenceParseError {
    ReferenceParseError {
        input: input.to_string(),
        reason: reason.into(),
    }
}

/// A program's human-readable reference label, `G-<year><half>-<index:4d>`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ProgramReference {
    /// Four-digit calendar year, `>= 2000`.
    pub year: u16,
    /// Semester half.
    pub half: SemesterHalf,
    /// Program index within the semester, formatted zero-padded to 4 digits.
    pub index: u32,
}

impl ProgramReference {
    /// Long form: `G-<year><half>-<index:4d>`.
    pub fn format(&self) -> String {
        format!("G-{}{}-{:04}", self.year, self.half.as_char(), self.index)
    }

    /// Short form: `<yy><half><index:4d>`.
    pub fn format_short(&self) -> String {
        format!("{:02}{}{:04}", self.year % 100, self.half.as_char(), self.index)
    }

    /// Parse either the long or short form.
    pub fn parse(s: &str) -> Result<Self, ReferenceParseError> {
        if let Some(rest) = s.strip_prefix("G-") {
            let (year_half, index) = rest
                .split_once('-')
                .ok_or_else(|| parse_err(s, "missing index separator"))?;
            if year_half.len() != 5 {
                return Err(parse_err(s, "expected 4-digit year + half"));
            }
            let (year_str, half_str) = year_half.split_at(4);
            let year: u16 = year_str
                .parse()
                .map_err(|_| parse_err(s, "non-numeric year"))?;
            let half = half_str
                .chars()
                .next()
                .and_then(SemesterHalf::from_char)
                .ok_or_else(|| parse_err(s, "half must be A or B"))?;
            let index: u32 = index.parse().map_err(|_| parse_err(s, "non-numeric index"))?;
            Self::build(year, half, index, s)
        } else {
            if s.len() != 8 {
                return Err(parse_err(s, "expected yy+half+4-digit index"));
            }
            let (yy_str, rest) = s.split_at(2);
            let (half_str, index_str) = rest.split_at(1);
            let yy: u16 = yy_str.parse().map_err(|_| parse_err(s, "non-numeric year"))?;
            let half = half_str
                .chars()
                .next()
                .and_then(SemesterHalf::from_char)
                .ok_or_else(|| parse_err(s, "half must be A or B"))?;
            let index: u32 = index_str
                .parse()
                .map_err(|_| parse_err(s, "non-numeric index"))?;
            Self::build(2000 + yy, half, index, s)
        }
    }

    fn build(year: u16, half: SemesterHalf, index: u32, original: &str) -> Result<Self, ReferenceParseError> {
        if year < 2000 {
            return Err(parse_err(original, "year must be >= 2000"));
        }
        if index > 9999 {
            return Err(parse_err(original, "index must fit in 4 digits"));
        }
        Ok(Self { year, half, index })
    }
}

/// An observation's human-readable reference label, `<programRef>-<obsIndex:4d>`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ObservationReference {
    /// The owning program's reference.
    pub program: ProgramReference,
    /// Observation index within the program, zero-padded to 4 digits.
    pub index: u32,
}

impl ObservationReference {
    /// Format as `<programRef>-<obsIndex:4d>`.
    pub fn format(&self) -> String {
        format!("{}-{:04}", self.program.format(), self.index)
    }

    /// Parse `<programRef>-<obsIndex:4d>`.
    pub fn parse(s: &str) -> Result<Self, ReferenceParseError> {
        let (prog, idx) = s
            .rsplit_once('-')
            .ok_or_else(|| parse_err(s, "missing observation index"))?;
        let program = ProgramReference::parse(prog)?;
        let index: u32 = idx.parse().map_err(|_| parse_err(s, "non-numeric observation index"))?;
        if index > 9999 {
            return Err(parse_err(s, "observation index must fit in 4 digits"));
        }
        Ok(Self { program, index })
    }
}

/// A dataset's human-readable reference label,
/// `<obsRef>-<stepIndex:4d>-<exposureIndex:4d>`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct DatasetReference {
    /// The owning observation's reference.
    pub observation: ObservationReference,
    /// Step index within the observation.
    pub step_index: u32,
    /// Exposure index within the step.
    pub exposure_index: u32,
}

impl DatasetReference {
    /// Format as `<obsRef>-<stepIndex:4d>-<exposureIndex:4d>`.
    pub fn format(&self) -> String {
        format!(
            "{}-{:04}-{:04}",
            self.observation.format(),
            self.step_index,
            self.exposure_index
        )
    }

    /// Parse `<obsRef>-<stepIndex:4d>-<exposureIndex:4d>`.
    pub fn parse(s: &str) -> Result<Self, ReferenceParseError> {
        let (rest, exposure_str) = s
            .rsplit_once('-')
            .ok_or_else(|| parse_err(s, "missing exposure index"))?;
        let (obs_str, step_str) = rest
            .rsplit_once('-')
            .ok_or_else(|| parse_err(s, "missing step index"))?;
        let observation = ObservationReference::parse(obs_str)?;
        let step_index: u32 = step_str.parse().map_err(|_| parse_err(s, "non-numeric step index"))?;
        let exposure_index: u32 = exposure_str
            .parse()
            .map_err(|_| parse_err(s, "non-numeric exposure index"))?;
        Ok(Self {
            observation,
            step_index,
            exposure_index,
        })
    }
}

/// A user invitation token, `<id:hex>.<body:96-hex>`.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct UserInvitation {
    /// Hex-encoded invitation id (at least 3 hex digits).
    pub id: String,
    /// 96 hex-digit invitation body (secret material).
    pub body: String,
}

impl UserInvitation {
    /// Parse `^([0-9a-f]{3,})\.([0-9a-f]{96})$`.
    pub fn parse(s: &str) -> Result<Self, ReferenceParseError> {
        let (id, body) = s
            .split_once('.')
            .ok_or_else(|| parse_err(s, "missing '.' separator"))?;
        if id.len() < 3 || !id.bytes().all(is_lower_hex) {
            return Err(parse_err(s, "id must be at least 3 lowercase hex digits"));
        }
        if body.len() != 96 || !body.bytes().all(is_lower_hex) {
            return Err(parse_err(s, "body must be exactly 96 lowercase hex digits"));
        }
        Ok(Self {
            id: id.to_string(),
            body: body.to_string(),
        })
    }
}

fn is_lower_hex(b: u8) -> bool {
    b.is_ascii_digit() || (b'a'..=b'f').contains(&b)
}
