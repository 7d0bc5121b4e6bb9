use crate::playlist::Variant;

/// Picks the variant to play from a master playlist.
pub trait VariantSelector: Send + Sync {
    /// Returns the index of the chosen variant, or `None` when there is nothing to choose from.
    fn select(&self, variants: &[Variant]) -> Option<usize>;
}

/// Always plays the same position in the variant list, or the last variant if the list is shorter.
#[derive(Debug, Clone, Copy)]
pub struct FixedIndexSelector(pub usize);

impl VariantSelector for FixedIndexSelector {
    fn select(&self, variants: &[Variant]) -> Option<usize> {
        let last = variants.len().checked_sub(1)?;
        Some(self.0.min(last))
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct LowestBandwidthSelector;

impl VariantSelector for LowestBandwidthSelector {
    fn select(&self, variants: &[Variant]) -> Option<usize> {
        variants
            .iter()
            .enumerate()
            .min_by_key(|(_, variant)| variant.bandwidth)
            .map(|(index, _)| index)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct HighestBandwidthSelector;

impl VariantSelector for HighestBandwidthSelector {
    fn select(&self, variants: &[Variant]) -> Option<usize> {
        variants
            .iter()
            .enumerate()
            .max_by_key(|(_, variant)| variant.bandwidth)
            .map(|(index, _)| index)
    }
}
