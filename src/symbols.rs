// SYMBOLS: tradable symbol snapshot and typo correction

use crate::exec::Exchange;
use crate::types::TradableSymbol;
use tracing::{error, info};

/// Minimum similarity ratio for a candidate to be offered as a correction.
pub const SUGGESTION_CUTOFF: f64 = 0.6;

/// Fetch the symbols currently accepting orders.
///
/// Listing is advisory: a failed fetch is logged and yields an empty list,
/// which switches symbol entry to free-form acceptance.
pub async fn list_tradable_symbols<E>(exchange: &E) -> Vec<TradableSymbol>
where
    E: Exchange + ?Sized,
{
    match exchange.exchange_symbols().await {
        Ok(symbols) => {
            let tradable: Vec<TradableSymbol> =
                symbols.into_iter().filter(|s| s.is_trading()).collect();
            info!(count = tradable.len(), "SYMBOLS: fetched tradable symbols");
            tradable
        }
        Err(err) => {
            error!(error = %err, "SYMBOLS: failed to fetch exchange info");
            Vec::new()
        }
    }
}

/// Closest candidate to `input` by Ratcliff/Obershelp similarity, if any scores
/// at least [`SUGGESTION_CUTOFF`]. Equal scores go to the lexicographically
/// greatest candidate.
pub fn suggest<S: AsRef<str>>(input: &str, candidates: &[S]) -> Option<String> {
    let needle: Vec<char> = input.trim().to_uppercase().chars().collect();
    if needle.is_empty() {
        return None;
    }
    let mut best: Option<(f64, &str)> = None;
    for candidate in candidates {
        let candidate = candidate.as_ref();
        let hay: Vec<char> = candidate.to_uppercase().chars().collect();
        let score = similarity(&needle, &hay);
        if score < SUGGESTION_CUTOFF {
            continue;
        }
        match best {
            Some((top, name)) if score < top || (score == top && candidate <= name) => {}
            _ => best = Some((score, candidate)),
        }
    }
    best.map(|(_, symbol)| symbol.to_string())
}

fn similarity(a: &[char], b: &[char]) -> f64 {
    let total = a.len() + b.len();
    if total == 0 {
        return 1.0;
    }
    2.0 * matching_chars(a, b) as f64 / total as f64
}

/// Characters covered by matching blocks: longest common run, then recurse on
/// both sides of it.
fn matching_chars(a: &[char], b: &[char]) -> usize {
    let (i, j, len) = longest_match(a, b);
    if len == 0 {
        return 0;
    }
    len + matching_chars(&a[..i], &b[..j]) + matching_chars(&a[i + len..], &b[j + len..])
}

/// Longest common substring as (start in a, start in b, length); earliest wins.
fn longest_match(a: &[char], b: &[char]) -> (usize, usize, usize) {
    let mut best = (0, 0, 0);
    // run[j + 1] = length of the common run ending at a[i], b[j]
    let mut prev = vec![0usize; b.len() + 1];
    for (i, ca) in a.iter().enumerate() {
        let mut run = vec![0usize; b.len() + 1];
        for (j, cb) in b.iter().enumerate() {
            if ca == cb {
                let k = prev[j] + 1;
                run[j + 1] = k;
                if k > best.2 {
                    best = (i + 1 - k, j + 1 - k, k);
                }
            }
        }
        prev = run;
    }
    best
}

/// One snapshot of tradable symbols, shared by both order-entry paths.
#[derive(Debug, Clone, Default)]
pub struct SymbolResolver {
    symbols: Vec<String>,
}

impl SymbolResolver {
    pub fn new(symbols: Vec<TradableSymbol>) -> Self {
        Self {
            symbols: symbols.into_iter().map(|s| s.symbol.to_uppercase()).collect(),
        }
    }

    pub async fn fetch<E>(exchange: &E) -> Self
    where
        E: Exchange + ?Sized,
    {
        Self::new(list_tradable_symbols(exchange).await)
    }

    /// True when the fetch failed or returned nothing.
    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_known(&self, symbol: &str) -> bool {
        let symbol = symbol.trim().to_uppercase();
        self.symbols.iter().any(|s| *s == symbol)
    }

    /// Membership check, or a loose shape check when no snapshot is available.
    pub fn accepts(&self, symbol: &str) -> bool {
        if self.symbols.is_empty() {
            let symbol = symbol.trim();
            symbol.len() >= 3 && symbol.chars().all(|c| c.is_ascii_alphanumeric())
        } else {
            self.is_known(symbol)
        }
    }

    pub fn examples(&self, n: usize) -> &[String] {
        &self.symbols[..n.min(self.symbols.len())]
    }

    pub fn suggest(&self, input: &str) -> Option<String> {
        suggest(input, self.symbols.as_slice())
    }

    /// Text shown after a rejected symbol.
    pub fn correction_hint(&self, input: &str) -> String {
        if self.symbols.is_empty() {
            return "Enter a valid pair: letters and digits, at least 3 characters.".to_string();
        }
        match self.suggest(input) {
            Some(candidate) => format!(
                "Invalid symbol '{}'. Did you mean {}?",
                input.trim().to_uppercase(),
                candidate
            ),
            None => format!(
                "Invalid symbol '{}'. Enter a symbol from the list above.",
                input.trim().to_uppercase()
            ),
        }
    }
}
