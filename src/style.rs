//! Deterministic plot-style assignment for the renderers.
//!
//! No shared cycling state: the full set of borehole identifiers is mapped to
//! styles in one call, so the same set always gets the same assignment no
//! matter how many renders ran before.

use std::collections::BTreeMap;

/// Line colors, cycled in order (hex RGB).
pub const COLOR_CYCLE: [&str; 10] = [
    "#1f77b4", "#ff7f0e", "#2ca02c", "#d62728", "#9467bd", "#8c564b", "#e377c2", "#7f7f7f",
    "#bcbd22", "#17becf",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Marker {
    Circle,
    Square,
    Triangle,
    Diamond,
    Cross,
}

pub const MARKER_CYCLE: [Marker; 5] = [
    Marker::Circle,
    Marker::Square,
    Marker::Triangle,
    Marker::Diamond,
    Marker::Cross,
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeriesStyle {
    pub color: &'static str,
    pub marker: Marker,
}

/// Assign a style per identifier, keyed on the sorted unique identifiers.
///
/// Colors cycle first; the marker advances each time the color cycle wraps,
/// so identifier 0 and identifier 10 differ in marker.
pub fn assign_styles<'a, I>(identifiers: I) -> BTreeMap<String, SeriesStyle>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut sorted: Vec<&str> = identifiers.into_iter().collect();
    sorted.sort_unstable();
    sorted.dedup();

    sorted
        .into_iter()
        .enumerate()
        .map(|(i, id)| {
            let style = SeriesStyle {
                color: COLOR_CYCLE[i % COLOR_CYCLE.len()],
                marker: MARKER_CYCLE[(i / COLOR_CYCLE.len()) % MARKER_CYCLE.len()],
            };
            (id.to_string(), style)
        })
        .collect()
}
