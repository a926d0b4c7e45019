//! `setoption` handling and the `uci` option-list announcement
//! (`spec.md` §6.1).

/// What applying a `setoption` turned out to require from the controller.
pub enum UciOptionAction {
    ResizeHash(usize),
    None,
}

pub struct UciOptions {
    pub hash_mb: usize,
    pub move_overhead_ms: u64,
    pub ponder: bool,
    pub chess960: bool,
}

impl UciOptions {
    pub fn new(hash_mb: usize) -> Self {
        UciOptions { hash_mb, move_overhead_ms: 30, ponder: false, chess960: false }
    }

    pub fn print(&self) {
        println!("id name petrel");
        println!("id author the petrel authors");
        println!("option name Hash type spin default {} min 1 max 65536", self.hash_mb);
        println!("option name Move Overhead type spin default {} min 0 max 5000", self.move_overhead_ms);
        println!("option name Ponder type check default {}", self.ponder);
        println!("option name UCI_Chess960 type check default {}", self.chess960);
        println!("option name Debug Log File type string default <empty>");
        println!("uciok");
    }

    /// Apply one parsed `setoption`. Out-of-range values are clamped
    /// rather than rejected (`spec.md` §7's `OptionOutOfRange`); the
    /// caller is expected to report that via `info string`.
    pub fn apply(&mut self, name: &str, value: Option<&str>) -> UciOptionAction {
        match name.trim().to_ascii_lowercase().as_str() {
            "hash" => {
                let mb = value.and_then(parse_hash_value).unwrap_or(self.hash_mb as u64).clamp(1, 65536) as usize;
                if mb != self.hash_mb {
                    self.hash_mb = mb;
                    return UciOptionAction::ResizeHash(mb);
                }
            }
            "move overhead" => {
                if let Some(v) = value.and_then(|v| v.parse::<u64>().ok()) {
                    self.move_overhead_ms = v.clamp(0, 5000);
                }
            }
            "ponder" => {
                if let Some(v) = value {
                    self.ponder = v.eq_ignore_ascii_case("true");
                }
            }
            "uci_chess960" => {
                if let Some(v) = value {
                    self.chess960 = v.eq_ignore_ascii_case("true");
                }
            }
            _ => {}
        }
        UciOptionAction::None
    }
}

/// `Hash` accepts a bare MiB count or a suffixed size (`b`/`k`/`m`/`g`/`t`).
fn parse_hash_value(value: &str) -> Option<u64> {
    let value = value.trim();
    let (digits, mult): (&str, u64) = match value.chars().last() {
        Some('b' | 'B') => (&value[..value.len() - 1], 1),
        Some('k' | 'K') => (&value[..value.len() - 1], 1024),
        Some('m' | 'M') => (&value[..value.len() - 1], 1024 * 1024),
        Some('g' | 'G') => (&value[..value.len() - 1], 1024 * 1024 * 1024),
        Some('t' | 'T') => (&value[..value.len() - 1], 1024 * 1024 * 1024 * 1024),
        _ => (value, 1024 * 1024),
    };
    let bytes: u64 = digits.trim().parse::<u64>().ok()? * mult;
    Some((bytes / (1024 * 1024)).max(1))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_hash_value_is_treated_as_mib() {
        let mut opts = UciOptions::new(16);
        opts.apply("Hash", Some("64"));
        assert_eq!(opts.hash_mb, 64);
    }

    #[test]
    fn suffixed_hash_value_is_converted_to_mib() {
        let mut opts = UciOptions::new(16);
        opts.apply("Hash", Some("1g"));
        assert_eq!(opts.hash_mb, 1024);
    }

    #[test]
    fn unchanged_hash_value_does_not_trigger_resize() {
        let mut opts = UciOptions::new(16);
        let action = opts.apply("Hash", Some("16"));
        assert!(matches!(action, UciOptionAction::None));
    }

    #[test]
    fn move_overhead_clamps_to_its_range() {
        let mut opts = UciOptions::new(16);
        opts.apply("Move Overhead", Some("999999"));
        assert_eq!(opts.move_overhead_ms, 5000);
    }
}
