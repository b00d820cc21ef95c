//! Scraped price records.

use compact_str::CompactString;
use serde::{Deserialize, Serialize};

/// One scraped coin price/percent-change record for a platform.
///
/// Price and percent are kept string-formatted as they appear on the ticker
/// page; the notification template forwards them verbatim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    /// Exchange/platform the quote came from.
    pub platform: CompactString,
    /// Coin identifier as shown on the ticker page.
    pub coin: CompactString,
    /// Price cell, raw.
    pub price: String,
    /// Percent-change cell, raw (may include `%` and whitespace).
    pub percent: String,
}

impl Observation {
    pub fn new(platform: &str, coin: &str, price: &str, percent: &str) -> Self {
        Self {
            platform: CompactString::new(platform),
            coin: CompactString::new(coin),
            price: price.to_string(),
            percent: percent.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_observation_new() {
        let obs = Observation::new("Bittrex", "CMT", "3.2", "5.2%");
        assert_eq!(obs.platform, "Bittrex");
        assert_eq!(obs.coin, "CMT");
        assert_eq!(obs.price, "3.2");
        assert_eq!(obs.percent, "5.2%");
    }
}
