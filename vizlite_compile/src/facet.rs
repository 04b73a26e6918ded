// Copyright 2025 the VizIR Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Facet partitioning.

extern crate alloc;

use alloc::vec::Vec;

use hashbrown::{HashMap, HashSet};
use vizlite_data::{DataType, Dataset, Value, ValueKey};

use crate::classify::{check_compatible, classify};
use crate::error::CompileError;
use crate::scale::explicit_order;
use crate::spec::{FieldBinding, SortSpec};

/// One cell of a facet grid.
#[derive(Clone, Debug, PartialEq)]
pub struct FacetCell {
    /// Column facet value, when faceting by column.
    pub column: Option<Value>,
    /// Row facet value, when faceting by row.
    pub row: Option<Value>,
    /// Grid column, left to right.
    pub column_index: usize,
    /// Grid row, top to bottom.
    pub row_index: usize,
    /// Dataset row indices in the cell, in dataset order.
    pub rows: Vec<usize>,
}

/// Distinct values of one facet field, in display order, with each row's slot.
struct Axis {
    values: Vec<Value>,
    slots: Vec<usize>,
}

impl Axis {
    fn single(rows: usize) -> Self {
        Self {
            values: Vec::new(),
            slots: alloc::vec![0; rows],
        }
    }

    fn len(&self) -> usize {
        self.values.len().max(1)
    }

    fn value(&self, index: usize) -> Option<Value> {
        self.values.get(index).cloned()
    }
}

fn facet_axis(
    data: &Dataset,
    rows: &[usize],
    binding: &FieldBinding,
) -> Result<Axis, CompileError> {
    let channel = binding.channel;
    let column = data
        .column_index(&binding.field)
        .ok_or_else(|| CompileError::UnknownField {
            channel,
            field: binding.field.clone(),
        })?;
    let read = |r: usize| data.value(r, column).cloned().unwrap_or_default();
    let data_type = classify(
        &data.fields[column],
        rows.iter().filter_map(|&r| data.value(r, column)),
        binding.data_type,
    );
    check_compatible(channel, data_type)?;

    // Nulls form their own facet so no row is dropped.
    let mut seen: Vec<Value> = Vec::new();
    let mut keys: HashSet<ValueKey> = HashSet::new();
    for &r in rows {
        let v = read(r);
        if keys.insert(v.key()) {
            seen.push(v);
        }
    }
    let values = match &binding.sort {
        Some(SortSpec::Ascending) => {
            seen.sort_by(Value::natural_cmp);
            seen
        }
        Some(SortSpec::Descending) => {
            seen.sort_by(|a, b| b.natural_cmp(a));
            seen
        }
        Some(SortSpec::Explicit(order)) if data_type == DataType::Ordinal => {
            explicit_order(seen, order)
        }
        _ => seen,
    };
    let index: HashMap<ValueKey, usize> = values
        .iter()
        .enumerate()
        .map(|(i, v)| (v.key(), i))
        .collect();
    let slots = rows
        .iter()
        .map(|&r| index.get(&read(r).key()).copied().unwrap_or(0))
        .collect();
    Ok(Axis { values, slots })
}

/// Partitions `rows` of `data` by the distinct values of the facet fields.
///
/// The result is the full grid in row-major order, including empty cells. Every row lands in
/// exactly one cell.
pub fn partition(
    data: &Dataset,
    rows: &[usize],
    column: Option<&FieldBinding>,
    row: Option<&FieldBinding>,
) -> Result<Vec<FacetCell>, CompileError> {
    let columns = match column {
        Some(b) => facet_axis(data, rows, b)?,
        None => Axis::single(rows.len()),
    };
    let grid_rows = match row {
        Some(b) => facet_axis(data, rows, b)?,
        None => Axis::single(rows.len()),
    };

    let (nc, nr) = (columns.len(), grid_rows.len());
    let mut cells: Vec<FacetCell> = Vec::with_capacity(nc * nr);
    for ri in 0..nr {
        for ci in 0..nc {
            cells.push(FacetCell {
                column: columns.value(ci),
                row: grid_rows.value(ri),
                column_index: ci,
                row_index: ri,
                rows: Vec::new(),
            });
        }
    }
    for (i, &r) in rows.iter().enumerate() {
        cells[grid_rows.slots[i] * nc + columns.slots[i]].rows.push(r);
    }
    log::debug!("facet: {nc}x{nr} cells over {} rows", rows.len());
    Ok(cells)
}

#[cfg(test)]
mod tests {
    extern crate std;

    use alloc::vec;

    use serde_json::json;

    use super::*;
    use crate::channel::Channel;

    fn data() -> Dataset {
        Dataset::from_json_values(
            json!([
                {"site": "Morris", "half": "early", "v": 1},
                {"site": "Crookston", "half": "early", "v": 2},
                {"site": "Morris", "half": "late", "v": 3},
                {"site": null, "half": "late", "v": 4},
                {"site": "Waseca", "half": "early", "v": 5}
            ])
            .as_array()
            .unwrap(),
        )
        .unwrap()
    }

    #[test]
    fn cells_conserve_rows() {
        let d = data();
        let rows: Vec<usize> = (0..d.row_count()).collect();
        let cells = partition(
            &d,
            &rows,
            Some(&FieldBinding::new(Channel::Column, "site")),
            Some(&FieldBinding::new(Channel::Row, "half")),
        )
        .unwrap();
        // Morris, Crookston, null, Waseca by two halves.
        assert_eq!(cells.len(), 8);
        let total: usize = cells.iter().map(|c| c.rows.len()).sum();
        assert_eq!(total, d.row_count());
        let mut all: Vec<usize> = cells.iter().flat_map(|c| c.rows.iter().copied()).collect();
        all.sort_unstable();
        assert_eq!(all, rows);
        assert_eq!(cells[0].column, Some(Value::from("Morris")));
        assert_eq!(cells[0].row, Some(Value::from("early")));
        assert_eq!(cells[0].rows, vec![0]);
        assert_eq!(cells[4].rows, vec![2]);
    }

    #[test]
    fn explicit_order_applies_to_ordinal_facets() {
        let d = data();
        let rows: Vec<usize> = (0..d.row_count()).collect();
        let binding = FieldBinding::new(Channel::Column, "site")
            .with_type(DataType::Ordinal)
            .with_sort(SortSpec::Explicit(vec![Value::from("Waseca")]));
        let cells = partition(&d, &rows, Some(&binding), None).unwrap();
        let order: Vec<Option<Value>> = cells.iter().map(|c| c.column.clone()).collect();
        assert_eq!(
            order,
            vec![
                Some(Value::from("Waseca")),
                Some(Value::from("Morris")),
                Some(Value::from("Crookston")),
                Some(Value::Null),
            ]
        );
    }

    #[test]
    fn quantitative_facets_are_rejected() {
        let d = data();
        let rows: Vec<usize> = (0..d.row_count()).collect();
        let err = partition(&d, &rows, Some(&FieldBinding::new(Channel::Row, "v")), None);
        assert_eq!(
            err,
            Err(CompileError::IncompatibleType {
                channel: Channel::Row,
                data_type: DataType::Quantitative,
            })
        );
    }

    #[test]
    fn no_facets_is_one_cell() {
        let d = data();
        let cells = partition(&d, &[1, 3], None, None).unwrap();
        assert_eq!(cells.len(), 1);
        assert_eq!(cells[0].rows, vec![1, 3]);
        assert_eq!(cells[0].column, None);
    }
}
