/// Category of a recovered soft failure.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticKind {
    /// A requested angle or value was outside the physical range and got clamped.
    OutOfRange,
    /// A missing definition was replaced by a documented default.
    Fallback,
    /// Two sources tried to bind the same name; the first binding was kept.
    Conflict,
}

/// One recovered soft failure. Never aborts compilation.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    /// What the record is about (fixture id, pose name, pattern id, ...).
    pub subject: String,
    pub message: String,
}

/// Append-only collector threaded through compile calls.
///
/// Each per-fixture compile owns its own collector so fan-out stays lock free; results are
/// merged with [`Diagnostics::extend`] afterwards.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize)]
#[serde(transparent)]
pub struct Diagnostics {
    records: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(
        &mut self,
        kind: DiagnosticKind,
        subject: impl Into<String>,
        message: impl Into<String>,
    ) {
        let subject = subject.into();
        let message = message.into();
        tracing::warn!(?kind, %subject, "{message}");
        self.records.push(Diagnostic {
            kind,
            subject,
            message,
        });
    }

    pub fn out_of_range(&mut self, subject: impl Into<String>, message: impl Into<String>) {
        self.push(DiagnosticKind::OutOfRange, subject, message);
    }

    pub fn fallback(&mut self, subject: impl Into<String>, message: impl Into<String>) {
        self.push(DiagnosticKind::Fallback, subject, message);
    }

    pub fn conflict(&mut self, subject: impl Into<String>, message: impl Into<String>) {
        self.push(DiagnosticKind::Conflict, subject, message);
    }

    pub fn extend(&mut self, other: Diagnostics) {
        self.records.extend(other.records);
    }

    pub fn records(&self) -> &[Diagnostic] {
        &self.records
    }

    pub fn count(&self, kind: DiagnosticKind) -> usize {
        self.records.iter().filter(|d| d.kind == kind).count()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn into_vec(self) -> Vec<Diagnostic> {
        self.records
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/diagnostics.rs"]
mod tests;
