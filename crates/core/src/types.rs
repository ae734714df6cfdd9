/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;

/// Which of the two product flows a generation belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenerationKind {
    /// Free-text (optionally questionnaire-assisted) coloring page.
    ColoringPlate,
    /// Mandala built from structured mood answers.
    Mandala,
}

impl GenerationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ColoringPlate => "coloring_plate",
            Self::Mandala => "mandala",
        }
    }
}

impl std::fmt::Display for GenerationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
