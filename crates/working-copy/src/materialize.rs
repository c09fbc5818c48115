//! Placeholder substitution in the template's entry file.

use std::path::Path;

use async_trait::async_trait;
use pipeline::{ContentMaterializer, Substitutions, WorkingCopyError};
use tracing::{debug, instrument};

/// Rewrites a text file in place, replacing every placeholder occurrence.
#[derive(Debug, Clone, Copy, Default)]
pub struct FileMaterializer;

#[async_trait]
impl ContentMaterializer for FileMaterializer {
    #[instrument(skip(self, substitutions), fields(path = %entry_file.display()))]
    async fn materialize(
        &self,
        entry_file: &Path,
        substitutions: &Substitutions,
    ) -> Result<usize, WorkingCopyError> {
        let original = tokio::fs::read_to_string(entry_file)
            .await
            .map_err(|e| WorkingCopyError::io(entry_file, e))?;

        let (rewritten, replaced) = substitute(&original, substitutions);

        tokio::fs::write(entry_file, rewritten)
            .await
            .map_err(|e| WorkingCopyError::io(entry_file, e))?;
        debug!(replaced, "Entry file materialised");
        Ok(replaced)
    }
}

/// Replaces all placeholder occurrences in one left-to-right pass.
///
/// Substituted values are never rescanned, so a title that happens to contain
/// another placeholder is written verbatim. When two placeholders start at the
/// same position the longer one wins. Empty placeholders are ignored.
pub fn substitute(text: &str, substitutions: &Substitutions) -> (String, usize) {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    let mut replaced = 0;

    loop {
        let next = substitutions
            .iter()
            .filter(|(placeholder, _)| !placeholder.is_empty())
            .filter_map(|(placeholder, value)| {
                rest.find(placeholder).map(|at| (at, placeholder, value))
            })
            .min_by_key(|(at, placeholder, _)| (*at, std::cmp::Reverse(placeholder.len())));

        let Some((at, placeholder, value)) = next else {
            out.push_str(rest);
            return (out, replaced);
        };
        out.push_str(&rest[..at]);
        out.push_str(value);
        rest = &rest[at + placeholder.len()..];
        replaced += 1;
    }
}
