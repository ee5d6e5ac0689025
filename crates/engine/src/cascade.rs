use std::collections::HashMap;

use serde::Serialize;

use crate::model::MatchPass;

/// One matching pass: a label plus explicit key extractors for each side.
///
/// A strategy that cannot produce a key for a row returns the empty string;
/// empty keys never participate in a join, on either side. This is how
/// synonym passes exclude rows with no synonym entry, and how unparseable
/// names are kept from spuriously matching each other.
pub struct Strategy<'a, L, R> {
    pub pass: MatchPass,
    pub left_key: Box<dyn Fn(&L) -> String + 'a>,
    pub right_key: Box<dyn Fn(&R) -> String + 'a>,
}

impl<'a, L, R> Strategy<'a, L, R> {
    pub fn new(
        pass: MatchPass,
        left_key: impl Fn(&L) -> String + 'a,
        right_key: impl Fn(&R) -> String + 'a,
    ) -> Self {
        Self {
            pass,
            left_key: Box::new(left_key),
            right_key: Box::new(right_key),
        }
    }
}

/// One matched output row. Fan-out is accepted: a left row whose key hits
/// several right rows yields one `Matched` per right row, all on the same
/// pass.
#[derive(Debug)]
pub struct Matched<'a, L, R> {
    pub left: &'a L,
    pub right: &'a R,
    pub pass: MatchPass,
}

#[derive(Debug, Clone, Serialize)]
pub struct PassCount {
    pub pass: MatchPass,
    /// Output rows produced by this pass, fan-out included.
    pub matched_rows: usize,
    /// Distinct left rows this pass resolved.
    pub resolved: usize,
}

#[derive(Debug)]
pub struct CascadeOutcome<'a, L, R> {
    /// All matched rows, in pass order, left-table order within a pass.
    pub matched: Vec<Matched<'a, L, R>>,
    /// Left rows no pass resolved, in left-table order.
    pub residue: Vec<&'a L>,
    pub passes: Vec<PassCount>,
    /// Left rows that matched more than one right row in their pass.
    pub fan_out_rows: usize,
}

/// Plain snapshot of an outcome's counts, for summaries.
#[derive(Debug, Clone, Serialize)]
pub struct JoinStats {
    pub passes: Vec<PassCount>,
    pub matched_rows: usize,
    pub resolved: usize,
    pub residue: usize,
    pub fan_out_rows: usize,
}

impl<L, R> CascadeOutcome<'_, L, R> {
    pub fn stats(&self) -> JoinStats {
        JoinStats {
            passes: self.passes.clone(),
            matched_rows: self.matched.len(),
            resolved: self.passes.iter().map(|p| p.resolved).sum(),
            residue: self.residue.len(),
            fan_out_rows: self.fan_out_rows,
        }
    }
}

/// Resolve each left row against the right table through an ordered list of
/// strategies. A fold over the unresolved set: each pass joins only rows no
/// earlier pass resolved, so no left row is ever credited to two strategies.
///
/// Join semantics are exact string equality on the extracted keys. Right
/// keys are not assumed unique; every right row sharing the key is emitted.
/// A pass with zero matches still appears in `passes`, and an empty right
/// table trivially sends every left row to the residue.
pub fn run_cascade<'a, L, R>(
    left: &'a [L],
    right: &'a [R],
    strategies: &[Strategy<'_, L, R>],
) -> CascadeOutcome<'a, L, R> {
    let mut unresolved: Vec<&'a L> = left.iter().collect();
    let mut matched = Vec::new();
    let mut passes = Vec::with_capacity(strategies.len());
    let mut fan_out_rows = 0;

    for strategy in strategies {
        // Key index over the right table. Buckets keep right-table order,
        // so fan-out output is deterministic.
        let mut index: HashMap<String, Vec<&'a R>> = HashMap::new();
        for r in right {
            let key = (strategy.right_key)(r);
            if key.is_empty() {
                continue;
            }
            index.entry(key).or_default().push(r);
        }

        let mut still_unresolved = Vec::new();
        let mut matched_rows = 0;
        let mut resolved = 0;

        for l in unresolved {
            let key = (strategy.left_key)(l);
            let hits = if key.is_empty() { None } else { index.get(&key) };
            match hits {
                Some(rs) => {
                    resolved += 1;
                    matched_rows += rs.len();
                    if rs.len() > 1 {
                        fan_out_rows += 1;
                    }
                    for &r in rs {
                        matched.push(Matched { left: l, right: r, pass: strategy.pass });
                    }
                }
                None => still_unresolved.push(l),
            }
        }

        passes.push(PassCount { pass: strategy.pass, matched_rows, resolved });
        unresolved = still_unresolved;
    }

    CascadeOutcome { matched, residue: unresolved, passes, fan_out_rows }
}
