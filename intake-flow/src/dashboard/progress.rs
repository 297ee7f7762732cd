//! Progress photo gallery and before/after comparison

use serde::Serialize;

use crate::photos::{Angle, ImageRef, ProgressRecord};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ProgressView {
    #[default]
    Gallery,
    Comparison,
}

/// First and latest photo for one angle
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ComparisonPair<'a> {
    pub angle: Angle,
    pub label: &'static str,
    pub before: &'a ImageRef,
    pub after: &'a ImageRef,
}

/// Read model over the archived progress records
#[derive(Debug, Clone)]
pub struct ProgressBoard<'a> {
    records: &'a [ProgressRecord],
    view: ProgressView,
    selected: Angle,
}

impl<'a> ProgressBoard<'a> {
    pub fn new(records: &'a [ProgressRecord]) -> Self {
        Self {
            records,
            view: ProgressView::Gallery,
            selected: Angle::Front,
        }
    }

    pub fn has_records(&self) -> bool {
        !self.records.is_empty()
    }

    /// Comparison needs a before and an after
    pub fn can_compare(&self) -> bool {
        self.records.len() >= 2
    }

    pub fn view(&self) -> ProgressView {
        self.view
    }

    /// Switch views; comparison is refused until it is possible
    pub fn set_view(&mut self, view: ProgressView) -> bool {
        if view == ProgressView::Comparison && !self.can_compare() {
            return false;
        }
        self.view = view;
        true
    }

    pub fn selected_angle(&self) -> Angle {
        self.selected
    }

    pub fn select_angle(&mut self, angle: Angle) {
        self.selected = angle;
    }

    /// Gallery: every record, oldest first
    pub fn gallery(&self) -> &'a [ProgressRecord] {
        self.records
    }

    pub fn initial(&self) -> Option<&'a ProgressRecord> {
        self.records.first()
    }

    pub fn latest(&self) -> Option<&'a ProgressRecord> {
        self.records.last()
    }

    /// First-vs-latest pairs for every angle
    pub fn comparison(&self) -> Option<Vec<ComparisonPair<'a>>> {
        if !self.can_compare() {
            return None;
        }
        let before = self.initial()?;
        let after = self.latest()?;
        Some(
            Angle::ALL
                .iter()
                .map(|&angle| ComparisonPair {
                    angle,
                    label: angle.label(),
                    before: before.photos.get(angle),
                    after: after.photos.get(angle),
                })
                .collect(),
        )
    }

    /// Pair for the selected angle only
    pub fn selected_pair(&self) -> Option<ComparisonPair<'a>> {
        self.comparison()?
            .into_iter()
            .find(|pair| pair.angle == self.selected)
    }
}
