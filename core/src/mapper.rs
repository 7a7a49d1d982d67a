//! Result mapper.
//!
//! Converts a positional row plus its selected fields into a nested record.
//! A nested object whose columns all come from one nullable joined table and
//! are all null is replaced by a single null: the join matched nothing.

use crate::error::MapResult;
use crate::field::{JoinNullability, SelectedField};
use crate::record::{Record, RecordMap};
use crate::value::Value;

/// Column group tracked for one top-level nested object.
struct NullGroup {
    key: String,
    table: Option<String>,
    single_table: bool,
    all_null: bool,
}

/// Map one positional row into a record shaped by `fields`.
///
/// Columns missing from a short row read as null. Nullification only applies
/// when `joins` is given and only to objects one level deep.
pub fn map_result_row(
    fields: &[SelectedField],
    row: &[Value],
    joins: Option<&JoinNullability>,
) -> MapResult<RecordMap> {
    let mut result = RecordMap::new();
    let mut groups: Vec<NullGroup> = Vec::new();

    for (index, field) in fields.iter().enumerate() {
        let Some((_, parents)) = field.path.split_last() else {
            continue;
        };

        let raw = row.get(index).cloned().unwrap_or(Value::Null);
        let value = if raw.is_null() {
            Value::Null
        } else {
            field.decoder.decode(&field.display_path(), raw)?
        };

        if joins.is_some() && parents.len() == 1 {
            track_group(&mut groups, &parents[0], field.table.as_deref(), &value);
        }

        result.insert_path(&field.path, Record::Value(value));
    }

    if let Some(joins) = joins {
        for group in groups {
            let nullable = match &group.table {
                Some(table) => group.single_table && joins.is_nullable(table),
                None => false,
            };
            if group.all_null && nullable {
                result.insert(group.key, Record::Value(Value::Null));
            }
        }
    }

    Ok(result)
}

/// Map every row with the same fields.
pub fn map_result_rows(
    fields: &[SelectedField],
    rows: &[Vec<Value>],
    joins: Option<&JoinNullability>,
) -> MapResult<Vec<RecordMap>> {
    rows.iter()
        .map(|row| map_result_row(fields, row, joins))
        .collect()
}

fn track_group(groups: &mut Vec<NullGroup>, key: &str, table: Option<&str>, value: &Value) {
    let idx = match groups.iter().position(|g| g.key == key) {
        Some(idx) => idx,
        None => {
            groups.push(NullGroup {
                key: key.to_string(),
                table: None,
                single_table: true,
                all_null: true,
            });
            groups.len() - 1
        }
    };
    let group = &mut groups[idx];

    group.all_null &= value.is_null();
    if let Some(table) = table {
        match &group.table {
            None => group.table = Some(table.to_string()),
            Some(existing) if existing != table => group.single_table = false,
            Some(_) => {}
        }
    }
}
