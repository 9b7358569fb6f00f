use crate::bits::BitPosition;
use crate::error::{DecodeError, Result};

/// Default ceiling on nested sprites, function bodies and clip actions.
pub const DEFAULT_MAX_DEPTH: usize = 32;
/// Default ceiling on the total number of tags and actions decoded per parse.
pub const DEFAULT_MAX_RECORDS: usize = 1 << 20;

/// Limits and policy knobs for one parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodeOptions {
    /// Maximum nesting depth of recursive structures.
    pub max_depth: usize,
    /// Step budget: tags and actions decoded across the whole movie.
    pub max_records: usize,
    /// Treat a tag stream that ends without an `End` tag as an overrun.
    pub require_end_tag: bool,
}

impl Default for DecodeOptions {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            max_records: DEFAULT_MAX_RECORDS,
            require_end_tag: false,
        }
    }
}

/// Mutable state threaded through a single parse.
///
/// Holds nothing but counters, so independent parses never share state.
#[derive(Debug, Clone)]
pub struct DecodeContext {
    options: DecodeOptions,
    version: u8,
    depth: usize,
    records: usize,
}

impl DecodeContext {
    pub fn new(version: u8, options: DecodeOptions) -> Self {
        Self {
            options,
            version,
            depth: 0,
            records: 0,
        }
    }

    pub fn options(&self) -> &DecodeOptions {
        &self.options
    }

    /// SWF version from the movie header; some grammars depend on it.
    pub fn version(&self) -> u8 {
        self.version
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Runs `f` one nesting level deeper, failing before `f` runs if the
    /// ceiling would be crossed.
    pub fn nested<T>(
        &mut self,
        position: BitPosition,
        f: impl FnOnce(&mut Self) -> Result<T>,
    ) -> Result<T> {
        if self.depth >= self.options.max_depth {
            return Err(DecodeError::DepthExceeded {
                position,
                depth: self.depth + 1,
                limit: self.options.max_depth,
            });
        }
        self.depth += 1;
        let out = f(self);
        self.depth -= 1;
        out
    }

    /// Charges one record against the step budget.
    pub fn count_record(&mut self, position: BitPosition) -> Result<()> {
        if self.records >= self.options.max_records {
            return Err(DecodeError::BudgetExceeded {
                position,
                limit: self.options.max_records,
            });
        }
        self.records += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nesting_is_bounded_and_restored() {
        let mut ctx = DecodeContext::new(
            10,
            DecodeOptions {
                max_depth: 1,
                ..DecodeOptions::default()
            },
        );
        let inner = ctx.nested(BitPosition::default(), |ctx| {
            ctx.nested(BitPosition::at_byte(7), |_| Ok(()))
        });
        assert_eq!(
            inner.unwrap_err(),
            DecodeError::DepthExceeded {
                position: BitPosition::at_byte(7),
                depth: 2,
                limit: 1,
            }
        );
        assert_eq!(ctx.depth(), 0);
    }

    #[test]
    fn record_budget() {
        let mut ctx = DecodeContext::new(
            10,
            DecodeOptions {
                max_records: 2,
                ..DecodeOptions::default()
            },
        );
        ctx.count_record(BitPosition::default()).unwrap();
        ctx.count_record(BitPosition::default()).unwrap();
        assert!(matches!(
            ctx.count_record(BitPosition::at_byte(4)),
            Err(DecodeError::BudgetExceeded { limit: 2, .. })
        ));
    }
}
