use std::fmt;
use zeroize::Zeroizing;

/// Labelled output lines of a command, printed as an aligned two-column
/// listing. Values are erased on drop since they may hold private keys.
#[derive(Default)]
pub struct Report {
    lines: Vec<(&'static str, Zeroizing<String>)>,
}

impl Report {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push<T: Into<String>>(&mut self, label: &'static str, value: T) -> &mut Self {
        self.lines.push((label, Zeroizing::new(value.into())));
        self
    }

    /// Move every line of `other` to the end of this report.
    pub fn append(&mut self, other: Report) -> &mut Self {
        self.lines.extend(other.lines);
        self
    }

    /// Value of the first line labelled `label`.
    pub fn get(&self, label: &str) -> Option<&str> {
        self.lines.iter().find(|(name, _)| *name == label).map(|(_, value)| value.as_str())
    }

    pub fn labels(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.lines.iter().map(|(label, _)| *label)
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let width = self.lines.iter().map(|(label, _)| label.len()).max().unwrap_or_default();
        for (label, value) in &self.lines {
            writeln!(f, "{label:<width$}  {}", value.as_str())?;
        }
        Ok(())
    }
}
