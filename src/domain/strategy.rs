//! Strategy synthesis.
//!
//! A strategy is three conditions from pairwise-distinct categories; it buys
//! when all three buy predicates hold and sells when all three sell
//! predicates hold. Its identity is the text
//! `"(Cat) NAME + (Cat) NAME + (Cat) NAME"`, which [`parse_id`] reads back.

use crate::domain::condition::{Category, Condition, ConditionKind, ConditionSet};
use crate::domain::error::{DayTraderError, ParseError};
use crate::domain::frame::Row;
use std::fmt;
use tracing::warn;

pub const CONDITIONS_PER_STRATEGY: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Strategy {
    conditions: [Condition; CONDITIONS_PER_STRATEGY],
}

impl Strategy {
    pub fn new(conditions: [Condition; CONDITIONS_PER_STRATEGY]) -> Result<Self, DayTraderError> {
        let [a, b, c] = conditions.map(|c| c.category());
        if a == b || a == c || b == c {
            return Err(DayTraderError::InvalidStrategy {
                reason: format!(
                    "categories must be distinct: {} + {} + {}",
                    conditions[0], conditions[1], conditions[2]
                ),
            });
        }
        Ok(Self { conditions })
    }

    pub fn conditions(&self) -> &[Condition; CONDITIONS_PER_STRATEGY] {
        &self.conditions
    }

    pub fn kinds(&self) -> [ConditionKind; CONDITIONS_PER_STRATEGY] {
        self.conditions.map(|c| c.kind())
    }

    pub fn buy(&self, row: &Row<'_>) -> bool {
        self.conditions.iter().all(|c| c.buy(row))
    }

    pub fn sell(&self, row: &Row<'_>) -> bool {
        self.conditions.iter().all(|c| c.sell(row))
    }

    pub fn id(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [a, b, c] = &self.conditions;
        write!(f, "{a} + {b} + {c}")
    }
}

/// Every unordered triple of `set` with pairwise-distinct categories, in
/// catalog order.
pub fn enumerate_all(set: &ConditionSet) -> Vec<Strategy> {
    let conditions = set.as_slice();
    let mut strategies = Vec::new();
    for (i, a) in conditions.iter().enumerate() {
        for (j, b) in conditions.iter().enumerate().skip(i + 1) {
            if a.category() == b.category() {
                continue;
            }
            for c in conditions.iter().skip(j + 1) {
                if c.category() == a.category() || c.category() == b.category() {
                    continue;
                }
                strategies.push(Strategy {
                    conditions: [*a, *b, *c],
                });
            }
        }
    }
    strategies
}

/// A `(Category) NAME` reference read from a strategy identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConditionRef {
    pub category: Category,
    pub name: String,
}

struct IdParser<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> IdParser<'a> {
    fn new(input: &'a str) -> Self {
        Self { input, pos: 0 }
    }

    fn remaining(&self) -> &'a str {
        &self.input[self.pos..]
    }

    fn peek(&self) -> Option<char> {
        self.remaining().chars().next()
    }

    fn skip_whitespace(&mut self) {
        let trimmed = self.remaining().trim_start();
        self.pos = self.input.len() - trimmed.len();
    }

    fn expect_char(&mut self, expected: char) -> Result<(), ParseError> {
        self.skip_whitespace();
        match self.peek() {
            Some(ch) if ch == expected => {
                self.pos += ch.len_utf8();
                Ok(())
            }
            Some(ch) => Err(ParseError {
                message: format!("expected '{}', found '{}'", expected, ch),
                position: self.pos,
            }),
            None => Err(ParseError {
                message: format!("expected '{}', found end of input", expected),
                position: self.pos,
            }),
        }
    }

    /// Consume characters up to (not including) `stop` or end of input.
    fn take_until(&mut self, stop: char) -> &'a str {
        let rest = self.remaining();
        let len = rest.find(stop).unwrap_or(rest.len());
        self.pos += len;
        &rest[..len]
    }

    fn parse_condition(&mut self) -> Result<ConditionRef, ParseError> {
        self.expect_char('(')?;
        let category_pos = self.pos;
        let category = self.take_until(')');
        let category = category.trim().parse::<Category>().map_err(|message| ParseError {
            message,
            position: category_pos,
        })?;
        self.expect_char(')')?;

        self.skip_whitespace();
        let name_pos = self.pos;
        let name = self.take_until('+').trim_end();
        if name.is_empty() || !name.chars().all(|c| c.is_alphanumeric() || c == '_') {
            return Err(ParseError {
                message: format!("invalid condition name '{}'", name),
                position: name_pos,
            });
        }
        Ok(ConditionRef {
            category,
            name: name.to_string(),
        })
    }

    fn parse(&mut self) -> Result<Vec<ConditionRef>, ParseError> {
        let mut refs = vec![self.parse_condition()?];
        while refs.len() < CONDITIONS_PER_STRATEGY {
            self.expect_char('+')?;
            refs.push(self.parse_condition()?);
        }
        self.skip_whitespace();
        if self.pos < self.input.len() {
            return Err(ParseError {
                message: format!("unexpected input after strategy: '{}'", self.remaining()),
                position: self.pos,
            });
        }
        Ok(refs)
    }
}

/// Split an identifier into its three condition references.
pub fn parse_id(input: &str) -> Result<Vec<ConditionRef>, ParseError> {
    IdParser::new(input).parse()
}

/// Rebuild one strategy from its identifier against the conditions
/// available in `set`.
pub fn reconstruct(id: &str, set: &ConditionSet) -> Result<Strategy, DayTraderError> {
    let refs = parse_id(id)?;
    let mut conditions = Vec::with_capacity(CONDITIONS_PER_STRATEGY);
    for r in refs {
        let condition = set
            .get(r.category, &r.name)
            .ok_or_else(|| DayTraderError::UnknownCondition {
                category: r.category.to_string(),
                name: r.name.clone(),
            })?;
        conditions.push(condition);
    }
    let conditions: [Condition; CONDITIONS_PER_STRATEGY] =
        conditions
            .try_into()
            .map_err(|_| DayTraderError::InvalidStrategy {
                reason: format!("expected {} conditions in '{}'", CONDITIONS_PER_STRATEGY, id),
            })?;
    Strategy::new(conditions)
}

/// Rebuild every identifier that still resolves; the rest are logged and
/// dropped.
pub fn from_ids<S: AsRef<str>>(ids: &[S], set: &ConditionSet) -> Vec<Strategy> {
    ids.iter()
        .filter_map(|id| match reconstruct(id.as_ref(), set) {
            Ok(strategy) => Some(strategy),
            Err(err) => {
                warn!(strategy = id.as_ref(), error = %err, "dropping strategy");
                None
            }
        })
        .collect()
}

/// Kinds named by any parseable identifier in `ids`, in catalog order.
pub fn referenced_kinds<S: AsRef<str>>(ids: &[S]) -> Vec<ConditionKind> {
    let refs: Vec<ConditionRef> = ids
        .iter()
        .filter_map(|id| parse_id(id.as_ref()).ok())
        .flatten()
        .collect();
    ConditionKind::ALL
        .into_iter()
        .filter(|kind| {
            refs.iter()
                .any(|r| r.category == kind.category() && r.name == kind.name())
        })
        .collect()
}
