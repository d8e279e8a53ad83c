//! Format ordering.
//!
//! Two comparators are used and neither is the reverse of the other:
//!
//! - [`natural_cmp`] is the canonical registry order (and `Ord` for
//!   [`FormatRule`]). Archived formats of the same subtype run oldest to
//!   newest: dates ascending, then higher order index first.
//! - [`inverse_date_cmp`] drives "most recent applicable format" scans.
//!   Dates still compare ascending, but the order index is compared
//!   ascending, so among formats that can't be told apart by date the most
//!   recent one (lowest index) comes first.
//!
//! Both compare type, then subtype, in declaration order, and both fall
//! back to the name. Within an archived subtype, undated formats form their
//! own tier ahead of the dated ones; the index tie-break applies inside each
//! tier.

use std::cmp::Ordering;
use std::hash::{Hash, Hasher};

use chrono::NaiveDate;

use crate::format::{FormatRule, FormatSubType, FormatType};

/// Undated first, then dates ascending. Keeping undated formats in a tier
/// of their own keeps both orders transitive.
fn dates_cmp(a: &FormatRule, b: &FormatRule) -> Ordering {
    let key = |rule: &FormatRule| rule.is_dated().then(|| rule.effective_date());
    key(a).cmp(&key(b))
}

/// Canonical registry order.
pub fn natural_cmp(this: &FormatRule, other: &FormatRule) -> Ordering {
    this.format_type()
        .cmp(&other.format_type())
        .then_with(|| this.format_subtype().cmp(&other.format_subtype()))
        .then_with(|| {
            if this.format_type() != FormatType::Archived {
                return Ordering::Equal;
            }
            dates_cmp(this, other).then_with(|| other.order_index().cmp(&this.order_index()))
        })
        .then_with(|| this.name().cmp(other.name()))
}

/// Order used for recency scans.
pub fn inverse_date_cmp(a: &FormatRule, b: &FormatRule) -> Ordering {
    a.format_type()
        .cmp(&b.format_type())
        .then_with(|| a.format_subtype().cmp(&b.format_subtype()))
        .then_with(|| {
            if a.format_type() != FormatType::Archived {
                return Ordering::Equal;
            }
            dates_cmp(a, b).then_with(|| a.order_index().cmp(&b.order_index()))
        })
        .then_with(|| a.name().cmp(b.name()))
}

impl Ord for FormatRule {
    fn cmp(&self, other: &Self) -> Ordering {
        natural_cmp(self, other)
    }
}

impl PartialOrd for FormatRule {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for FormatRule {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for FormatRule {}

// Equal rules always share a name, so hashing the name agrees with `Eq`.
impl Hash for FormatRule {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name().hash(state);
    }
}

/// Sort key over the fields [`natural_cmp`] looks at, for callers that want
/// to sort or bucket without holding on to the rules themselves.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FormatSortKey {
    pub format_type: FormatType,
    pub format_subtype: FormatSubType,
    pub effective_date: Option<NaiveDate>,
    pub order_index: i32,
    pub name: String,
}

impl FormatSortKey {
    pub fn of(rule: &FormatRule) -> Self {
        Self {
            format_type: rule.format_type(),
            format_subtype: rule.format_subtype(),
            effective_date: rule.is_dated().then(|| rule.effective_date()),
            order_index: rule.order_index(),
            name: rule.name().to_string(),
        }
    }
}

impl Ord for FormatSortKey {
    fn cmp(&self, other: &Self) -> Ordering {
        self.format_type
            .cmp(&other.format_type)
            .then_with(|| self.format_subtype.cmp(&other.format_subtype))
            .then_with(|| {
                if self.format_type != FormatType::Archived {
                    return Ordering::Equal;
                }
                self.effective_date
                    .cmp(&other.effective_date)
                    .then_with(|| other.order_index.cmp(&self.order_index))
            })
            .then_with(|| self.name.cmp(&other.name))
    }
}

impl PartialOrd for FormatSortKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Wrapper ordering a rule by [`inverse_date_cmp`], for use in sorted
/// collections.
#[derive(Debug, Clone, Copy)]
pub struct InverseDate<'a>(pub &'a FormatRule);

impl Ord for InverseDate<'_> {
    fn cmp(&self, other: &Self) -> Ordering {
        inverse_date_cmp(self.0, other.0)
    }
}

impl PartialOrd for InverseDate<'_> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for InverseDate<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for InverseDate<'_> {}
