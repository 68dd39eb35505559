//! Folded-stack sample model.

use std::collections::{BTreeMap, BTreeSet};

use super::ProfileError;

/// One distinct call stack, root frame first.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Stack {
    pub frames: Vec<String>,
    pub count: u64,
}

impl Stack {
    fn mentions(&self, pattern: &str) -> bool {
        self.frames.iter().any(|frame| frame.contains(pattern))
    }
}

/// Per-symbol sample counts.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SymbolStats {
    pub name: String,
    /// Samples where the symbol was the leaf frame.
    pub flat: u64,
    /// Samples where the symbol was anywhere on the stack.
    pub cum: u64,
}

/// A parsed sample buffer.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Profile {
    stacks: Vec<Stack>,
}

impl Profile {
    /// Parse `frame;frame;frame count` lines. Identical stacks are merged.
    pub fn parse(data: &[u8]) -> Result<Self, ProfileError> {
        let text = std::str::from_utf8(data).map_err(|_| ProfileError::Encoding)?;
        let mut merged: BTreeMap<Vec<String>, u64> = BTreeMap::new();

        for (idx, line) in text.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            let malformed = || ProfileError::MalformedLine { line: idx + 1 };

            let (stack, count) = line.rsplit_once(' ').ok_or_else(malformed)?;
            let count: u64 = count.parse().map_err(|_| malformed())?;
            let stack = stack.trim_end();
            if stack.is_empty() {
                return Err(malformed());
            }

            let frames = stack.split(';').map(str::to_string).collect();
            let total = merged.entry(frames).or_default();
            *total = total.saturating_add(count);
        }

        Ok(Self {
            stacks: merged
                .into_iter()
                .map(|(frames, count)| Stack { frames, count })
                .collect(),
        })
    }

    pub fn stacks(&self) -> &[Stack] {
        &self.stacks
    }

    /// Total number of samples.
    pub fn total(&self) -> u64 {
        self.stacks
            .iter()
            .fold(0u64, |total, s| total.saturating_add(s.count))
    }

    /// Apply symbol-name substring filters.
    ///
    /// `focus` keeps only stacks with a frame containing it; `ignore` drops
    /// every stack with a frame containing it. Empty patterns are no-ops.
    pub fn filter(self, focus: Option<&str>, ignore: Option<&str>) -> Self {
        let focus = focus.filter(|p| !p.is_empty());
        let ignore = ignore.filter(|p| !p.is_empty());

        let stacks = self
            .stacks
            .into_iter()
            .filter(|stack| focus.map_or(true, |p| stack.mentions(p)))
            .filter(|stack| ignore.map_or(true, |p| !stack.mentions(p)))
            .collect();
        Self { stacks }
    }

    /// Flat and cumulative counts per symbol, sorted by flat count
    /// (descending), then cumulative count (descending), then name.
    pub fn symbols(&self) -> Vec<SymbolStats> {
        let mut stats: BTreeMap<&str, (u64, u64)> = BTreeMap::new();

        for stack in &self.stacks {
            if let Some(leaf) = stack.frames.last() {
                let flat = &mut stats.entry(leaf.as_str()).or_default().0;
                *flat = flat.saturating_add(stack.count);
            }
            // Recursive frames count once per stack.
            let unique: BTreeSet<&str> = stack.frames.iter().map(String::as_str).collect();
            for name in unique {
                let cum = &mut stats.entry(name).or_default().1;
                *cum = cum.saturating_add(stack.count);
            }
        }

        let mut symbols: Vec<SymbolStats> = stats
            .into_iter()
            .map(|(name, (flat, cum))| SymbolStats {
                name: name.to_string(),
                flat,
                cum,
            })
            .collect();
        symbols.sort_by(|a, b| {
            b.flat
                .cmp(&a.flat)
                .then(b.cum.cmp(&a.cum))
                .then_with(|| a.name.cmp(&b.name))
        });
        symbols
    }

    /// Caller to callee sample counts.
    pub fn edges(&self) -> BTreeMap<(&str, &str), u64> {
        let mut edges = BTreeMap::new();
        for stack in &self.stacks {
            for pair in stack.frames.windows(2) {
                let weight: &mut u64 = edges
                    .entry((pair[0].as_str(), pair[1].as_str()))
                    .or_default();
                *weight = weight.saturating_add(stack.count);
            }
        }
        edges
    }
}
