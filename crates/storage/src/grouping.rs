//! Distinct-value groups for legends and filters.

use std::sync::Arc;

use tracing::warn;

use layer_common::{LayerDefinition, LayerError, LayerGroup};
use layer_style::configured_icon;

use crate::domains::FIELD_ACTIONS_SLUG;
use crate::strategy::StrategyResolver;

/// Icon for field-action groups no rule assigns one to.
pub const DEFAULT_ACTION_ICON: &str = "map-pin";

/// Keyword fragments (accent-free, lowercase) and the icon they select.
/// First matching entry wins.
const ACTION_ICON_KEYWORDS: &[(&[&str], &str)] = &[
    (&["fiscaliz", "autuac", "infrac", "multa"], "shield-alert"),
    (&["incendio", "fogo", "queimada", "brigad"], "flame"),
    (&["embargo", "interdic"], "ban"),
    (&["apreens"], "package"),
    (&["vistoria", "inspec", "monitor"], "clipboard-check"),
    (&["educa", "palestra", "capacit", "oficina"], "graduation-cap"),
    (&["reuni", "audiencia", "comunidade"], "users"),
    (&["plantio", "recupera", "reflorest", "muda"], "sprout"),
    (&["denuncia"], "megaphone"),
    (&["agua", "nascente", " rio "], "droplets"),
];

/// Called with each distinct-value query that failed.
pub type FailureHook = Arc<dyn Fn(&LayerError) + Send + Sync>;

/// Computes the groups of a layer's column.
#[derive(Clone)]
pub struct GroupingCalculator {
    resolver: StrategyResolver,
    on_failure: Option<FailureHook>,
}

impl GroupingCalculator {
    pub fn new(resolver: StrategyResolver) -> Self {
        Self {
            resolver,
            on_failure: None,
        }
    }

    pub fn with_failure_hook(mut self, hook: FailureHook) -> Self {
        self.on_failure = Some(hook);
        self
    }

    /// Distinct values of `column`, sorted ascending, blank values skipped.
    ///
    /// Never fails: a query error is logged, handed to the failure hook and
    /// yields no groups.
    pub async fn groups_for(&self, definition: &LayerDefinition, column: &str) -> Vec<LayerGroup> {
        let values = match self.resolver.distinct_values(definition, column).await {
            Ok(values) => values,
            Err(e) => {
                warn!(
                    slug = %definition.slug,
                    column = %column,
                    error = %e,
                    "Group query failed"
                );
                if let Some(hook) = &self.on_failure {
                    hook(&e);
                }
                return Vec::new();
            }
        };

        let mut values: Vec<String> = values
            .into_iter()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .collect();
        values.sort();
        values.dedup();

        let heuristics = definition.slug == FIELD_ACTIONS_SLUG;
        values
            .into_iter()
            .map(|value| {
                let icon = configured_icon(&definition.visual_config, column, &value)
                    .or_else(|| heuristics.then(|| action_icon(&value).to_string()));
                LayerGroup {
                    id: value.clone(),
                    label: value,
                    icon,
                }
            })
            .collect()
    }
}

/// Pick a field-action icon from keywords in its label.
pub fn action_icon(label: &str) -> &'static str {
    let folded = fold_accents(&label.to_lowercase());
    // Padded so whole-word fragments like " rio " also match at the edges
    let haystack = format!(" {} ", folded);

    ACTION_ICON_KEYWORDS
        .iter()
        .find(|(keywords, _)| keywords.iter().any(|k| haystack.contains(k)))
        .map(|(_, icon)| *icon)
        .unwrap_or(DEFAULT_ACTION_ICON)
}

fn fold_accents(s: &str) -> String {
    s.chars()
        .map(|c| match c {
            'á' | 'à' | 'â' | 'ã' | 'ä' => 'a',
            'é' | 'è' | 'ê' | 'ë' => 'e',
            'í' | 'ì' | 'î' | 'ï' => 'i',
            'ó' | 'ò' | 'ô' | 'õ' | 'ö' => 'o',
            'ú' | 'ù' | 'û' | 'ü' => 'u',
            'ç' => 'c',
            other => other,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_action_icon_keywords() {
        assert_eq!(action_icon("Fiscalização"), "shield-alert");
        assert_eq!(action_icon("COMBATE A INCÊNDIO"), "flame");
        assert_eq!(action_icon("Apreensão de madeira"), "package");
        assert_eq!(action_icon("Educação ambiental"), "graduation-cap");
        assert_eq!(action_icon("Limpeza do rio"), "droplets");
    }

    #[test]
    fn test_action_icon_default() {
        assert_eq!(action_icon("Outros"), DEFAULT_ACTION_ICON);
        // "rio" inside another word is not a river
        assert_eq!(action_icon("Relatório"), DEFAULT_ACTION_ICON);
    }

    #[test]
    fn test_first_keyword_group_wins() {
        // Both "fiscaliz" and "queimada" present; fiscalização is listed first
        assert_eq!(action_icon("Fiscalização de queimada"), "shield-alert");
    }
}
